//! Capture, tracking and summary settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::default_true;

/// Per-tab capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Maximum events kept per tab (oldest evicted first).
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// How many of the most recent events a response is matched against.
    #[serde(default = "default_correlation_window")]
    pub correlation_window: usize,

    /// Whether the host exposes the network observation hook.
    #[serde(default = "default_true")]
    pub network_observation: bool,

    /// URL prefixes never captured (browser/extension internals).
    #[serde(default = "default_excluded_schemes")]
    pub excluded_schemes: Vec<String>,

    /// Form values longer than this are truncated.
    #[serde(default = "default_field_value_limit")]
    pub field_value_limit: usize,

    /// Replacement for sensitive form values.
    #[serde(default = "default_redaction_marker")]
    pub redaction_marker: String,

    /// Case-insensitive substrings marking a form field as sensitive.
    #[serde(default = "default_sensitive_field_markers")]
    pub sensitive_field_markers: Vec<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            correlation_window: default_correlation_window(),
            network_observation: true,
            excluded_schemes: default_excluded_schemes(),
            field_value_limit: default_field_value_limit(),
            redaction_marker: default_redaction_marker(),
            sensitive_field_markers: default_sensitive_field_markers(),
        }
    }
}

fn default_buffer_capacity() -> usize {
    200
}

fn default_correlation_window() -> usize {
    10
}

fn default_excluded_schemes() -> Vec<String> {
    ["chrome://", "chrome-extension://", "edge://", "moz-extension://"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_field_value_limit() -> usize {
    100
}

fn default_redaction_marker() -> String {
    "<redacted>".to_string()
}

fn default_sensitive_field_markers() -> Vec<String> {
    ["password", "ssn", "card", "secret"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// How the global tracking log enforces its capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// `capacity` entries in total, oldest evicted first.
    #[default]
    Global,
    /// `capacity` entries per destination origin.
    PerOrigin,
}

/// Tracking-parameter log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_tracking_capacity")]
    pub capacity: usize,

    #[serde(default)]
    pub policy: CapacityPolicy,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            capacity: default_tracking_capacity(),
            policy: CapacityPolicy::default(),
        }
    }
}

fn default_tracking_capacity() -> usize {
    200
}

/// Report rendering limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_recent_events")]
    pub recent_events: usize,

    #[serde(default = "default_endpoints_per_kind")]
    pub endpoints_per_kind: usize,

    #[serde(default = "default_domains_in_report")]
    pub domains_in_report: usize,

    /// Events included as context for `ask`.
    #[serde(default = "default_chat_context_events")]
    pub chat_context_events: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            recent_events: default_recent_events(),
            endpoints_per_kind: default_endpoints_per_kind(),
            domains_in_report: default_domains_in_report(),
            chat_context_events: default_chat_context_events(),
        }
    }
}

fn default_recent_events() -> usize {
    20
}

fn default_endpoints_per_kind() -> usize {
    10
}

fn default_domains_in_report() -> usize {
    15
}

fn default_chat_context_events() -> usize {
    10
}

/// Where persisted state lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".trafficlens"))
        .unwrap_or_else(|| PathBuf::from("/tmp/trafficlens"))
}
