//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_analysis;
mod schema_capture;

pub use schema_analysis::*;
pub use schema_capture::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub summary: SummaryConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// HTTP command surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8765
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
