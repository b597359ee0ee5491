//! `pantry scan` command.

use std::time::Duration;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::controller::Controller;
use crate::session::ScanOutcome;

/// Execute the `scan` command: one scan, then print the ingredient list.
///
/// # Errors
///
/// Returns an error string if the scan fails or times out.
pub async fn run(
    ctx: ServiceContext,
    config: &Config,
    test_mode: bool,
    timeout: Duration,
) -> Result<(), String> {
    let mut controller = Controller::new(ctx, config);
    if test_mode {
        controller.test_scan().await;
        return Ok(());
    }

    match controller.scan(tokio::time::sleep(timeout)).await {
        ScanOutcome::Detected(_) => Ok(()),
        ScanOutcome::Stopped => {
            Err(format!("No barcode found within {} seconds", timeout.as_secs()))
        }
        ScanOutcome::Failed(reason) => Err(format!("Scan failed: {reason}")),
    }
}
