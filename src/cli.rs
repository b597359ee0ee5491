//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `pantry`.
#[derive(Debug, Parser)]
#[command(name = "pantry", version, about = "Scan groceries, plan recipes and fill a cart")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a barcode to a product name through the backend.
    Lookup {
        /// UPC/EAN digits to look up.
        upc: String,
    },
    /// Scan one barcode and add it to the ingredient list.
    Scan {
        /// Skip the camera and use the sample barcode.
        #[arg(long, conflicts_with = "image", required_unless_present = "image")]
        test: bool,
        /// Image file served as the camera feed.
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
        /// Give up scanning after this many seconds.
        #[arg(long, value_name = "SECS", default_value_t = 10)]
        timeout: u64,
    },
    /// Interactive shell over ingredients, chat and the cart.
    Shell {
        /// Image file served as the camera feed for `scan`.
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
        /// Give up scanning after this many seconds.
        #[arg(long, value_name = "SECS", default_value_t = 10)]
        timeout: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_lookup_subcommand() {
        let cli = Cli::parse_from(["pantry", "lookup", "049000028911"]);
        assert!(matches!(cli.command, Command::Lookup { ref upc } if upc == "049000028911"));
    }

    #[test]
    fn parses_scan_in_test_mode() {
        let cli = Cli::parse_from(["pantry", "scan", "--test"]);
        assert!(matches!(cli.command, Command::Scan { test: true, image: None, timeout: 10 }));
    }

    #[test]
    fn scan_needs_a_source() {
        assert!(Cli::try_parse_from(["pantry", "scan"]).is_err());
        assert!(Cli::try_parse_from(["pantry", "scan", "--test", "--image", "a.png"]).is_err());
    }

    #[test]
    fn parses_shell_with_image() {
        let cli = Cli::parse_from(["pantry", "shell", "--image", "code.png", "--timeout", "3"]);
        assert!(matches!(cli.command, Command::Shell { image: Some(_), timeout: 3 }));
    }
}
