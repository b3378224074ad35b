//! CLI definitions for TrafficLens.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// TrafficLens CLI.
#[derive(Parser)]
#[command(name = "trafficlens")]
#[command(about = "Per-tab web traffic observation with tracking detection and AI summaries")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the command server in foreground (default)
    Serve {
        /// Server host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Split a URL into clean URL and tracking parameters
    Classify {
        url: String,
    },

    /// Render the analysis report for a saved tab snapshot
    Summarize {
        /// JSON file holding a tab session snapshot
        session: PathBuf,
    },

    /// Show the tracking log for an origin, most recent first
    Tracking {
        /// Destination origin, e.g. https://shop.example
        origin: String,

        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// API key management
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum KeyAction {
    /// Store an API key
    Set {
        api_key: String,
    },

    /// Remove the stored API key
    Clear,

    /// Show whether a key is available and where it comes from
    Status,
}
