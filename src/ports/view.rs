//! View port for pushing display state to the user.

use crate::ledger::CartSummary;
use crate::ports::backend::ShoppingListResponse;
use crate::register::ScannedIngredient;

/// Receives display refreshes from the controller.
///
/// Each call carries the full, freshly computed state; implementations never
/// patch previous output.
pub trait View: Send + Sync {
    /// Replaces the status line.
    fn status(&self, message: &str);

    /// Redraws the scanned-ingredient list.
    fn ingredients(&self, items: &[ScannedIngredient]);

    /// Redraws the cart badge, lines and total.
    fn cart(&self, summary: &CartSummary);

    /// Shows a freshly generated shopping list.
    fn shopping_list(&self, list: &ShoppingListResponse);
}
