use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ridge-Dialer: trigger outbound voice-agent calls from the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "ridge-dialer")]
#[command(author = "RidgetopAI")]
#[command(version)]
#[command(about = "Terminal call-request console for a voice-agent backend", long_about = None)]
pub struct Cli {
    /// Base URL of the voice-agent backend. Overrides config.
    #[arg(long, env = "RIDGE_DIALER_API_URL", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error). Overrides config.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Place one call without opening the interface. Exits non-zero on failure.
    Call {
        /// Number to dial, in international format (e.g. +18005551234)
        phone_number: String,

        /// Return as soon as the call is dialed instead of waiting for an answer
        #[arg(long, default_value_t = false)]
        no_wait: bool,
    },
    /// Check that the backend is reachable
    Health,
    /// Write a default config file if none exists and print its path
    InitConfig,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
