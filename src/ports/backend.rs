//! Backend port for the recipe assistant HTTP API.
//!
//! The three endpoints (`barcode-lookup`, `chat`, `shopping-list`) are treated
//! as fixed request/response contracts. The types below mirror their JSON
//! bodies field for field.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Boxed future type alias used by [`Backend`] to keep the trait dyn-compatible.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

/// Body of `POST /api/barcode-lookup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    /// The decoded UPC/EAN symbol.
    pub upc: String,
}

/// Response of `POST /api/barcode-lookup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    /// Whether the backend found the product.
    #[serde(default)]
    pub success: bool,
    /// Product name, present when the lookup succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Name the backend suggests when the product is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_name: Option<String>,
}

/// Conversation mode sent with a chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Build a recipe from the scanned ingredients.
    Recipe,
    /// Free-form question answering.
    Normal,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's prompt.
    pub prompt: String,
    /// Model identifier forwarded to the backend.
    pub model: String,
    /// Conversation mode.
    pub mode: ChatMode,
    /// Names of scanned ingredients, only sent in recipe mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_ingredients: Option<Vec<String>>,
}

/// Response of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's answer.
    pub response: String,
    /// Dish the answer is about, if the backend recognised one.
    #[serde(default)]
    pub dish_name: Option<String>,
}

/// Body of `POST /api/shopping-list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListRequest {
    /// Free text listing the ingredients (usually a recipe answer).
    pub ingredients: String,
    /// Dish the list is for.
    pub dish_name: Option<String>,
}

/// A purchasable product offered for an ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store product identifier; the cart is keyed on it.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Price as formatted by the store, e.g. `"$3.50"` or `"$1,299.00"`.
    pub price: String,
    /// Free-text availability, e.g. `"In stock"`.
    #[serde(default)]
    pub availability: String,
    /// Brand, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Promotion text, when the product is on offer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
    /// Link to the product page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
    /// Any other fields the backend sends; carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Products matched for a single ingredient, best match first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    /// The ingredient as named in the recipe.
    pub ingredient: String,
    /// Candidate products; index 0 is the best match.
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Response of `POST /api/shopping-list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListResponse {
    /// Number of ingredients with at least one product.
    #[serde(default)]
    pub matched_ingredients: u32,
    /// Number of ingredients extracted from the request.
    #[serde(default)]
    pub total_ingredients: u32,
    /// Dish the list was generated for.
    #[serde(default)]
    pub dish_name: String,
    /// Matched ingredients and their products.
    #[serde(default)]
    pub shopping_list: Vec<ShoppingListEntry>,
    /// Ingredients the store had nothing for.
    #[serde(default)]
    pub unmatched_ingredients: Vec<String>,
    /// Clarifying question; when present only the question is shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

/// Sends requests to the recipe assistant backend.
pub trait Backend: Send + Sync {
    /// Resolves a barcode to a product name.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// undecodable body.
    fn lookup_barcode(&self, upc: &str) -> BackendFuture<'_, LookupResponse>;

    /// Sends a chat prompt.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// undecodable body.
    fn chat(&self, request: &ChatRequest) -> BackendFuture<'_, ChatResponse>;

    /// Asks the backend to match ingredients against store products.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// undecodable body.
    fn shopping_list(&self, request: &ShoppingListRequest)
        -> BackendFuture<'_, ShoppingListResponse>;
}
