//! Terminal rendering of the session state.

use crate::ledger::CartSummary;
use crate::ports::backend::ShoppingListResponse;
use crate::ports::view::View;
use crate::register::ScannedIngredient;
use crate::shopping::Availability;

/// Prints status lines, lists and the cart to stdout.
pub struct TerminalView;

impl View for TerminalView {
    fn status(&self, message: &str) {
        println!("» {message}");
    }

    fn ingredients(&self, items: &[ScannedIngredient]) {
        if items.is_empty() {
            println!("  (no ingredients scanned)");
            return;
        }
        println!("  Ingredients ({}):", items.len());
        for item in items {
            println!("    {}  [{}]", item.name, item.barcode);
        }
    }

    fn cart(&self, summary: &CartSummary) {
        if summary.lines.is_empty() {
            println!("  Cart is empty");
            return;
        }
        println!("  Cart ({} items):", summary.item_count);
        for line in &summary.lines {
            println!(
                "    {} x{} @ {} = {}  ({})",
                line.name, line.quantity, line.unit_price, line.line_total, line.id
            );
        }
        println!("  Total: {}", summary.total);
    }

    fn shopping_list(&self, list: &ShoppingListResponse) {
        println!(
            "  Shopping list for {}: {}/{} ingredients matched",
            list.dish_name, list.matched_ingredients, list.total_ingredients
        );
        for entry in &list.shopping_list {
            println!("    {}:", entry.ingredient);
            for (rank, product) in entry.products.iter().enumerate() {
                let best = if rank == 0 { " (best match)" } else { "" };
                println!(
                    "      [{}] {} {} - {}{best}",
                    product.id,
                    product.name,
                    product.price,
                    Availability::classify(&product.availability).label()
                );
            }
        }
        if !list.unmatched_ingredients.is_empty() {
            println!("    Not found: {}", list.unmatched_ingredients.join(", "));
        }
    }
}
