//! Semantic checks that TOML parsing cannot express.

use std::fmt;

use crate::error::ConfigError;
use crate::schema::Config;

/// One problem found in a config, keyed by its dotted TOML path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors block startup; warnings are only logged.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: &str, message: &str) {
        self.errors.push(Finding {
            path: path.to_string(),
            message: message.to_string(),
        });
    }

    fn warn(&mut self, path: &str, message: &str) {
        self.warnings.push(Finding {
            path: path.to_string(),
            message: message.to_string(),
        });
    }

    /// The first error, if any, becomes [`ConfigError::InvalidValue`].
    pub fn into_result(self) -> Result<Vec<Finding>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(Finding { path, message }) => Err(ConfigError::InvalidValue {
                field: path,
                message,
            }),
            None => Ok(self.warnings),
        }
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let checks: [fn(&Config, &mut ValidationResult); 5] = [
            Self::check_server,
            Self::check_capture,
            Self::check_tracking,
            Self::check_summary,
            Self::check_analysis,
        ];
        let mut result = ValidationResult::default();
        for check in checks {
            check(config, &mut result);
        }
        result
    }

    fn check_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.error("server.port", "Port cannot be 0");
        }

        if config.server.host.is_empty() {
            result.error("server.host", "Host cannot be empty");
        }
    }

    fn check_capture(config: &Config, result: &mut ValidationResult) {
        let capture = &config.capture;

        if capture.buffer_capacity == 0 {
            result.error("capture.buffer_capacity", "Buffer capacity must be greater than 0");
        }

        if capture.correlation_window == 0 {
            result.error("capture.correlation_window", "Correlation window must be greater than 0");
        } else if capture.correlation_window > capture.buffer_capacity {
            result.warn(
                "capture.correlation_window",
                "Correlation window is larger than the buffer; the whole buffer will be scanned",
            );
        }

        if capture.redaction_marker.is_empty() {
            result.error("capture.redaction_marker", "Redaction marker cannot be empty");
        }

        if capture.sensitive_field_markers.is_empty() {
            result.warn(
                "capture.sensitive_field_markers",
                "No sensitive field markers; form values will only be truncated",
            );
        }
    }

    fn check_tracking(config: &Config, result: &mut ValidationResult) {
        if config.tracking.capacity == 0 {
            result.error("tracking.capacity", "Tracking log capacity must be greater than 0");
        }
    }

    fn check_summary(config: &Config, result: &mut ValidationResult) {
        if config.summary.recent_events == 0 {
            result.warn("summary.recent_events", "Reports will contain no recent-event detail");
        }
    }

    fn check_analysis(config: &Config, result: &mut ValidationResult) {
        let analysis = &config.analysis;

        if analysis.timeout_secs == 0 {
            result.error("analysis.timeout_secs", "Timeout must be greater than 0");
        }

        if !(0.0..=2.0).contains(&analysis.temperature) {
            result.error("analysis.temperature", "Temperature must be between 0.0 and 2.0");
        }

        if let Some(url) = &analysis.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.error("analysis.api_url", "API URL must start with http:// or https://");
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
