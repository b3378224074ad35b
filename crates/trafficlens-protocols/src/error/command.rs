//! Command boundary errors.

use thiserror::Error;

use super::{ProviderError, StoreError};

/// Everything a command can report back to its caller.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Nothing has been captured for the tab, or the session ended mid-call.
    #[error("{0}")]
    NoData(String),

    /// No API credential is available.
    #[error("API key not configured. Set one with `set_api_key` or in the config file.")]
    NotConfigured,

    /// The external analysis service failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The request itself was malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Persisted state could not be read or written.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The command service is no longer running.
    #[error("Command service unavailable")]
    Unavailable,
}

impl CommandError {
    /// Machine-readable error kind for the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::NoData(_) => "no_data",
            CommandError::NotConfigured => "not_configured",
            CommandError::Provider(e) if e.is_timeout() => "timeout",
            CommandError::Provider(_) => "provider",
            CommandError::InvalidRequest(_) => "invalid_request",
            CommandError::Storage(_) => "storage",
            CommandError::Unavailable => "unavailable",
        }
    }

    /// Human-readable message for the UI.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Provider(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
