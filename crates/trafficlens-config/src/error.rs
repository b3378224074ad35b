//! Errors raised while reading or checking a configuration file.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("unresolved placeholder ${{{0}}}")]
    EnvVarNotSet(String),

    #[error("{field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("bad config syntax: {0}")]
    InvalidFormat(String),
}
