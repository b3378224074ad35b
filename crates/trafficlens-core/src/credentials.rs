//! Persisted API credential.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use trafficlens_protocols::StoreError;

/// File name of the credential file inside the data directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

/// Where the effective API key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    Config,
    Stored,
}

/// Opaque bearer token kept across restarts.
pub struct CredentialStore {
    path: Option<PathBuf>,
    api_key: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Open the store in `data_dir`, loading any saved key.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).await?;
        let path = data_dir.join(CREDENTIALS_FILE);

        let api_key = match fs::read_to_string(&path).await {
            Ok(content) if !content.trim().is_empty() => {
                serde_json::from_str::<CredentialFile>(&content)?.api_key
            }
            Ok(_) => None,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        debug!(path = ?path, has_key = api_key.is_some(), "Credential store opened");

        Ok(Self {
            path: Some(path),
            api_key: RwLock::new(api_key),
        })
    }

    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            api_key: RwLock::new(None),
        }
    }

    pub async fn get(&self) -> Option<String> {
        self.api_key.read().await.clone()
    }

    pub async fn is_set(&self) -> bool {
        self.api_key.read().await.is_some()
    }

    /// Save a key. Surrounding whitespace is trimmed.
    pub async fn set(&self, api_key: &str) -> Result<(), StoreError> {
        let api_key = api_key.trim().to_string();
        let mut guard = self.api_key.write().await;
        self.persist(Some(api_key.clone())).await?;
        *guard = Some(api_key);
        info!("API key saved");
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.api_key.write().await;
        self.persist(None).await?;
        *guard = None;
        info!("API key cleared");
        Ok(())
    }

    /// The key to use: a configured key wins over the stored one.
    pub async fn resolve(&self, configured: Option<&str>) -> Option<(String, KeySource)> {
        if let Some(key) = configured.map(str::trim).filter(|k| !k.is_empty()) {
            return Some((key.to_string(), KeySource::Config));
        }
        self.get()
            .await
            .filter(|k| !k.is_empty())
            .map(|k| (k, KeySource::Stored))
    }

    async fn persist(&self, api_key: Option<String>) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&CredentialFile { api_key })?;
        fs::write(path, json).await?;
        Ok(())
    }
}

/// Show only the last four characters of a key.
pub fn mask_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len().min(12) - 4), tail)
}
