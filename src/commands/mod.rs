//! Command dispatch and handlers.

pub mod lookup;
pub mod scan;
pub mod shell;

use std::time::Duration;

use crate::cli::Command;
use crate::config::Config;
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// Configuration comes from the environment (and `.env`). Handlers run on a
/// single-threaded tokio runtime.
///
/// # Errors
///
/// Returns an error string if configuration is invalid, the runtime cannot
/// start, or the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let config = Config::from_env().map_err(|e| e.to_string())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;

    runtime.block_on(dispatch_with_config(command, &config))
}

/// Dispatch a command with the given configuration.
async fn dispatch_with_config(command: &Command, config: &Config) -> Result<(), String> {
    match command {
        Command::Lookup { upc } => {
            let ctx = ServiceContext::live(config, None);
            lookup::run(&ctx, upc).await
        }
        Command::Scan { test, image, timeout } => {
            let ctx = ServiceContext::live(config, image.as_deref());
            scan::run(ctx, config, *test, Duration::from_secs(*timeout)).await
        }
        Command::Shell { image, timeout } => {
            let ctx = ServiceContext::live(config, image.as_deref());
            shell::run(ctx, config, Duration::from_secs(*timeout)).await
        }
    }
}
