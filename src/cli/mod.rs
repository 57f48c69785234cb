use crate::constants::{APP_DESCRIPTION, APP_NAME, DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use clap::{Parser, Subcommand};

/// Seal and unseal strings the way persisted members are sealed
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Encryption key; defaults to NATIVE_STORE_ENCRYPTION_KEY or the built-in default
    #[clap(short = 'k', long, global = true)]
    pub key: Option<String>,

    /// Log output format
    #[clap(long, global = true, default_value = LOG_FORMAT_TEXT, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: String,

    /// Log level filter, overridden by RUST_LOG
    #[clap(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Seals TEXT and prints the sealed value
    Seal {
        /// Plain text to seal
        text: String,
    },
    /// Opens a sealed TEXT and prints the plain text
    Unseal {
        /// Value previously printed by `seal`
        text: String,
    },
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        <CliArgs as Parser>::parse_from(std::env::args())
    }
}
