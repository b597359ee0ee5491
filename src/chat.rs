//! Chat requests and replies for the recipe assistant.

use crate::ports::backend::{ChatMode, ChatRequest, ChatResponse};

/// Display mode. Dark mode turns chat into recipe generation seeded with the
/// scanned ingredients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// General chat.
    #[default]
    Light,
    /// Recipe mode.
    Dark,
}

impl Mode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Wire mode sent to the backend.
    #[must_use]
    pub fn chat_mode(self) -> ChatMode {
        match self {
            Self::Light => ChatMode::Normal,
            Self::Dark => ChatMode::Recipe,
        }
    }
}

/// Builds a chat request. Ingredient names are only sent in dark mode.
#[must_use]
pub fn build_chat_request(
    prompt: &str,
    model: &str,
    mode: Mode,
    ingredients: Vec<String>,
) -> ChatRequest {
    let scanned_ingredients = match mode {
        Mode::Dark => Some(ingredients),
        Mode::Light => None,
    };
    ChatRequest {
        prompt: prompt.to_string(),
        model: model.to_string(),
        mode: mode.chat_mode(),
        scanned_ingredients,
    }
}

/// A chat response with the follow-ups it allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Assistant text.
    pub text: String,
    /// Dish the reply describes, if the backend named one.
    pub dish_name: Option<String>,
    /// Whether a shopping list may be generated from this reply.
    pub offers_shopping_list: bool,
    /// Scanned ingredients the recipe was built from (dark mode only).
    pub used_ingredients: Vec<String>,
}

impl ChatReply {
    /// Interprets a response received in `mode`. A reply that asks a
    /// question never offers a shopping list.
    #[must_use]
    pub fn from_response(response: ChatResponse, mode: Mode, ingredients: Vec<String>) -> Self {
        let offers_shopping_list = mode == Mode::Light && !response.response.contains('?');
        let used_ingredients = match mode {
            Mode::Dark => ingredients,
            Mode::Light => Vec::new(),
        };
        Self {
            text: response.response,
            dish_name: response.dish_name,
            offers_shopping_list,
            used_ingredients,
        }
    }
}
