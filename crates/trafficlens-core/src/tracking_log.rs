//! Global, bounded log of detected tracking parameters.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use trafficlens_config::{CapacityPolicy, TrackingConfig};
use trafficlens_protocols::{StoreError, TrackingLogEntry};

use crate::classifier::{classify, origin_of};
use crate::tracking_store::{MemoryTrackingStore, TrackingLogStore};

/// Append-only tracking evidence shared by every tab.
///
/// Appends are serialized by an async mutex held across persistence, so the
/// stored order always matches the in-memory order.
pub struct TrackingLog {
    entries: Mutex<VecDeque<TrackingLogEntry>>,
    capacity: usize,
    policy: CapacityPolicy,
    store: Arc<dyn TrackingLogStore>,
}

impl TrackingLog {
    /// Open the log, loading previously persisted entries.
    pub async fn open(
        store: Arc<dyn TrackingLogStore>,
        config: &TrackingConfig,
    ) -> Result<Self, StoreError> {
        let loaded = store.load().await?;
        let log = Self {
            entries: Mutex::new(VecDeque::with_capacity(config.capacity)),
            capacity: config.capacity,
            policy: config.policy,
            store,
        };
        {
            let mut entries = log.entries.lock().await;
            for entry in loaded {
                entries.push_back(entry);
                log.enforce_capacity(&mut entries);
            }
            info!(
                entries = entries.len(),
                policy = ?log.policy,
                "Tracking log loaded"
            );
        }
        Ok(log)
    }

    /// Log without persistence.
    pub fn in_memory(config: &TrackingConfig) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: config.capacity,
            policy: config.policy,
            store: Arc::new(MemoryTrackingStore::new()),
        }
    }

    /// Classify `raw_url` and log it if it carries tracking parameters.
    ///
    /// Unparseable URLs and URLs without tracking parameters are ignored.
    /// On a store error the log is left unchanged.
    pub async fn record(&self, raw_url: &str) -> Result<Option<TrackingLogEntry>, StoreError> {
        self.record_at(raw_url, Utc::now()).await
    }

    pub async fn record_at(
        &self,
        raw_url: &str,
        time: DateTime<Utc>,
    ) -> Result<Option<TrackingLogEntry>, StoreError> {
        let Some(info) = classify(raw_url) else {
            return Ok(None);
        };
        if !info.has_tracking() {
            return Ok(None);
        }

        let entry = TrackingLogEntry::new(info, time);
        debug!(
            origin = %entry.destination_origin,
            params = ?entry.tracking_params.keys().collect::<Vec<_>>(),
            "Tracking parameters detected"
        );

        // The append only takes effect once the store accepted it.
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.push_back(entry.clone());
        self.enforce_capacity(&mut next);
        self.store.save(next.make_contiguous()).await?;
        *entries = next;
        Ok(Some(entry))
    }

    /// Entries for `origin`, oldest first.
    ///
    /// `origin` may also be a full URL; it is reduced to its origin.
    pub async fn query(&self, origin: &str) -> Vec<TrackingLogEntry> {
        let origin = origin_of(origin).unwrap_or_else(|| origin.to_string());
        self.entries
            .lock()
            .await
            .iter()
            .filter(|e| e.destination_origin == origin)
            .cloned()
            .collect()
    }

    /// Entries for `origin`, most recent first.
    pub async fn query_recent_first(&self, origin: &str) -> Vec<TrackingLogEntry> {
        let mut entries = self.query(origin).await;
        entries.reverse();
        entries
    }

    /// Every entry, oldest first.
    pub async fn entries(&self) -> Vec<TrackingLogEntry> {
        self.entries.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> CapacityPolicy {
        self.policy
    }

    /// Evict after a push to the back.
    fn enforce_capacity(&self, entries: &mut VecDeque<TrackingLogEntry>) {
        match self.policy {
            CapacityPolicy::Global => {
                while entries.len() > self.capacity {
                    entries.pop_front();
                }
            }
            CapacityPolicy::PerOrigin => {
                let Some(origin) = entries.back().map(|e| e.destination_origin.clone()) else {
                    return;
                };
                let mut count = entries
                    .iter()
                    .filter(|e| e.destination_origin == origin)
                    .count();
                while count > self.capacity {
                    if let Some(pos) = entries.iter().position(|e| e.destination_origin == origin) {
                        entries.remove(pos);
                    }
                    count -= 1;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tracking_log_tests.rs"]
mod tests;
