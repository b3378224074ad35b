//! Persistence for the tracking log.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use trafficlens_protocols::{StoreError, TrackingLogEntry};

/// File name of the persisted log inside the data directory.
pub const TRACKING_LOG_FILE: &str = "tracking_log.json";

/// Backing storage for [`TrackingLog`](crate::tracking_log::TrackingLog).
///
/// The log is small and bounded, so stores read and write it whole.
#[async_trait]
pub trait TrackingLogStore: Send + Sync {
    /// Load all entries, oldest first. A store that was never written
    /// yields an empty list.
    async fn load(&self) -> Result<Vec<TrackingLogEntry>, StoreError>;

    /// Replace the stored entries.
    async fn save(&self, entries: &[TrackingLogEntry]) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral runs.
pub struct MemoryTrackingStore {
    entries: tokio::sync::RwLock<Vec<TrackingLogEntry>>,
}

impl MemoryTrackingStore {
    pub fn new() -> Self {
        Self {
            entries: tokio::sync::RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryTrackingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackingLogStore for MemoryTrackingStore {
    async fn load(&self) -> Result<Vec<TrackingLogEntry>, StoreError> {
        Ok(self.entries.read().await.clone())
    }

    async fn save(&self, entries: &[TrackingLogEntry]) -> Result<(), StoreError> {
        *self.entries.write().await = entries.to_vec();
        Ok(())
    }
}

/// JSON file store.
///
/// ```text
/// {data_dir}/
/// └── tracking_log.json
/// ```
pub struct FileTrackingStore {
    path: PathBuf,
}

impl FileTrackingStore {
    /// Open a store inside `data_dir`, creating the directory if needed.
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).await?;
        let path = data_dir.join(TRACKING_LOG_FILE);
        debug!("FileTrackingStore initialized at {:?}", path);
        Ok(Self { path })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl TrackingLogStore for FileTrackingStore {
    async fn load(&self) -> Result<Vec<TrackingLogEntry>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, entries: &[TrackingLogEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)?;
        // Replace atomically.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
