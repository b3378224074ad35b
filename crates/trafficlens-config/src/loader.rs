//! Reads `config/*.toml` into [`Config`].
//!
//! `${NAME}` placeholders are replaced from the process environment before
//! parsing, and a leading `~` in `storage.data_dir` is expanded afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};

use crate::error::ConfigError;
use crate::schema::Config;

const PLACEHOLDER: &str = r"\$\{([^}]+)\}";

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_str(&raw)
    }

    /// Like [`ConfigLoader::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match path.try_exists() {
            Ok(true) => Self::load(path),
            _ => Ok(Config::default()),
        }
    }

    pub fn load_str(raw: &str) -> Result<Config, ConfigError> {
        let substituted = Self::expand_env_vars(raw)?;
        let mut config: Config = toml::from_str(&substituted)?;
        config.storage.data_dir = Self::expand_path_buf(&config.storage.data_dir);
        Ok(config)
    }

    /// Replace every `${NAME}` with the value of `NAME`; the first unset
    /// variable aborts the load.
    fn expand_env_vars(raw: &str) -> Result<String, ConfigError> {
        let pattern =
            Regex::new(PLACEHOLDER).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        let mut missing: Option<String> = None;
        let substituted = pattern.replace_all(raw, |caps: &Captures| {
            let name = &caps[1];
            match std::env::var(name) {
                Ok(value) => value,
                Err(_) => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(ConfigError::EnvVarNotSet(name)),
            None => Ok(substituted.into_owned()),
        }
    }

    /// `~/.trafficlens` -> `/home/<user>/.trafficlens`.
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).into_owned()
    }

    fn expand_path_buf(path: &Path) -> PathBuf {
        path.to_str()
            .map(|s| PathBuf::from(Self::expand_path(s)))
            .unwrap_or_else(|| path.to_path_buf())
    }
}
