//! `pantry lookup` command.

use crate::context::ServiceContext;
use crate::controller::product_name;

/// Execute the `lookup` command.
///
/// # Errors
///
/// Returns an error string if the barcode is empty. Backend failures fall
/// back to a barcode-derived name rather than failing.
pub async fn run(ctx: &ServiceContext, upc: &str) -> Result<(), String> {
    let upc = upc.trim();
    if upc.is_empty() {
        return Err("Barcode must not be empty".to_string());
    }
    let lookup = ctx.backend.lookup_barcode(upc).await;
    println!("{upc}\t{}", product_name(upc, lookup));
    Ok(())
}
