//! View that records every refresh.

use std::sync::{Arc, Mutex};

use crate::ledger::CartSummary;
use crate::ports::backend::ShoppingListResponse;
use crate::ports::view::View;
use crate::register::ScannedIngredient;

/// One recorded display refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    /// Status line text.
    Status(String),
    /// Ingredient list contents.
    Ingredients(Vec<ScannedIngredient>),
    /// Cart state.
    Cart(CartSummary),
    /// A shopping list was shown.
    ShoppingList(ShoppingListResponse),
}

/// Records updates in order. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    updates: Arc<Mutex<Vec<ViewUpdate>>>,
}

impl RecordingView {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update so far.
    #[must_use]
    pub fn updates(&self) -> Vec<ViewUpdate> {
        self.updates.lock().expect("view lock poisoned").clone()
    }

    /// Status lines in order.
    #[must_use]
    pub fn statuses(&self) -> Vec<String> {
        self.updates()
            .into_iter()
            .filter_map(|update| match update {
                ViewUpdate::Status(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// The current status line.
    #[must_use]
    pub fn last_status(&self) -> Option<String> {
        self.statuses().pop()
    }

    /// The most recent cart refresh.
    #[must_use]
    pub fn last_cart(&self) -> Option<CartSummary> {
        self.updates().into_iter().rev().find_map(|update| match update {
            ViewUpdate::Cart(summary) => Some(summary),
            _ => None,
        })
    }

    /// The most recent ingredient list refresh.
    #[must_use]
    pub fn last_ingredients(&self) -> Option<Vec<ScannedIngredient>> {
        self.updates().into_iter().rev().find_map(|update| match update {
            ViewUpdate::Ingredients(items) => Some(items),
            _ => None,
        })
    }

    fn push(&self, update: ViewUpdate) {
        self.updates.lock().expect("view lock poisoned").push(update);
    }
}

impl View for RecordingView {
    fn status(&self, message: &str) {
        self.push(ViewUpdate::Status(message.to_string()));
    }

    fn ingredients(&self, items: &[ScannedIngredient]) {
        self.push(ViewUpdate::Ingredients(items.to_vec()));
    }

    fn cart(&self, summary: &CartSummary) {
        self.push(ViewUpdate::Cart(summary.clone()));
    }

    fn shopping_list(&self, list: &ShoppingListResponse) {
        self.push(ViewUpdate::ShoppingList(list.clone()));
    }
}
