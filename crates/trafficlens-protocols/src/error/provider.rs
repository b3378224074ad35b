//! Analysis provider errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Access forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

impl ProviderError {
    /// Map a non-2xx provider response to an error.
    pub fn from_api_response(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => ProviderError::AuthenticationFailed(message),
            403 => ProviderError::Forbidden(message),
            429 => ProviderError::RateLimited(message),
            _ => ProviderError::ApiError { status, message },
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout(_))
    }

    /// Message suitable for showing to the person who configured the key.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::RateLimited(_) => "API quota exceeded. Check the provider's billing \
                 and usage limits; the account may need more credits."
                .to_string(),
            ProviderError::AuthenticationFailed(_) => {
                "Invalid API key. Check the key in the settings.".to_string()
            }
            ProviderError::Forbidden(_) => "API access forbidden. The key may lack permission \
                 or the account may be restricted."
                .to_string(),
            ProviderError::Timeout(secs) => {
                format!("The analysis service did not answer within {} seconds.", secs)
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
