//! Core library entry for the `pantry` CLI.
//!
//! Scans grocery barcodes into an ingredient list, asks a recipe assistant
//! about them, and keeps a priced shopping cart.

pub mod adapters;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod controller;
pub mod decoder;
pub mod error;
pub mod ledger;
pub mod ports;
pub mod register;
pub mod sampler;
pub mod session;
pub mod shopping;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}
