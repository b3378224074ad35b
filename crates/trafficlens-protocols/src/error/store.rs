//! Persistence errors.

use thiserror::Error;

/// Errors from the persisted stores (tracking log, credentials).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::from(io_err);
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_serde_error_from() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StoreError::from(serde_err);
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
