//! Per-tab traffic buffer.
//!
//! [`TrafficStore`] is the only owner of tab sessions. Callers get clones
//! (snapshots); every mutation goes through the store's methods, each of
//! which holds the write lock for its whole duration.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use trafficlens_config::CaptureConfig;
use trafficlens_protocols::{RawEvent, TabId, TabSession, TrafficEvent};

use crate::correlator::{self, DEFAULT_CORRELATION_WINDOW};

/// Default per-tab event capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 200;

const NOTIFY_CHANNEL_CAPACITY: usize = 256;

/// Change notification published after each store mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    EventRecorded {
        tab_id: TabId,
        session_id: Uuid,
        total: usize,
    },
    ResponseAttached {
        tab_id: TabId,
        session_id: Uuid,
        url: String,
        status_code: u16,
    },
    SessionReset {
        tab_id: TabId,
        session_id: Uuid,
    },
    SessionRemoved {
        tab_id: TabId,
    },
}

impl StoreEvent {
    pub fn tab_id(&self) -> TabId {
        match self {
            StoreEvent::EventRecorded { tab_id, .. }
            | StoreEvent::ResponseAttached { tab_id, .. }
            | StoreEvent::SessionReset { tab_id, .. }
            | StoreEvent::SessionRemoved { tab_id } => *tab_id,
        }
    }
}

/// Owned store of all live tab sessions.
pub struct TrafficStore {
    sessions: RwLock<HashMap<TabId, TabSession>>,
    capacity: usize,
    correlation_window: usize,
    notify: broadcast::Sender<StoreEvent>,
}

impl TrafficStore {
    pub fn new(capacity: usize, correlation_window: usize) -> Self {
        let (notify, _) = broadcast::channel(NOTIFY_CHANNEL_CAPACITY);
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            correlation_window,
            notify,
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.buffer_capacity, config.correlation_window)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.notify.subscribe()
    }

    /// Return the tab's session, creating an empty one if needed.
    pub fn ensure(&self, tab_id: TabId, initial_url: Option<String>) -> TabSession {
        self.ensure_at(tab_id, initial_url, Utc::now())
    }

    pub fn ensure_at(
        &self,
        tab_id: TabId,
        initial_url: Option<String>,
        now: DateTime<Utc>,
    ) -> TabSession {
        let mut sessions = self.sessions.write();
        sessions
            .entry(tab_id)
            .or_insert_with(|| {
                debug!(tab_id, "Creating tab session");
                TabSession::new(tab_id, initial_url, now)
            })
            .clone()
    }

    /// Append an event, creating the session if needed, and evict the
    /// oldest events beyond capacity.
    pub fn record(&self, tab_id: TabId, event: RawEvent) -> TrafficEvent {
        self.record_at(tab_id, event, Utc::now())
    }

    pub fn record_at(&self, tab_id: TabId, event: RawEvent, now: DateTime<Utc>) -> TrafficEvent {
        let (stamped, session_id, total) = {
            let mut sessions = self.sessions.write();
            let session = sessions
                .entry(tab_id)
                .or_insert_with(|| TabSession::new(tab_id, None, now));

            // Keep timestamps non-decreasing even if the wall clock steps back.
            let timestamp = match session.last_event() {
                Some(last) if last.timestamp > now => last.timestamp,
                _ => now,
            };
            let stamped = TrafficEvent::from_raw(event, timestamp);
            session.events.push_back(stamped.clone());
            while session.events.len() > self.capacity {
                session.events.pop_front();
            }
            (stamped, session.session_id, session.events.len())
        };

        debug!(
            tab_id,
            kind = %stamped.kind,
            method = %stamped.method,
            url = stamped.url.as_deref().unwrap_or(""),
            "Event recorded"
        );
        let _ = self.notify.send(StoreEvent::EventRecorded {
            tab_id,
            session_id,
            total,
        });
        stamped
    }

    /// Replace the tab's session with a fresh empty one.
    pub fn reset(&self, tab_id: TabId, url: Option<String>) -> Uuid {
        self.reset_at(tab_id, url, Utc::now())
    }

    pub fn reset_at(&self, tab_id: TabId, url: Option<String>, now: DateTime<Utc>) -> Uuid {
        let session = TabSession::new(tab_id, url, now);
        let session_id = session.session_id;
        let dropped = self
            .sessions
            .write()
            .insert(tab_id, session)
            .map(|old| old.len())
            .unwrap_or(0);

        info!(tab_id, dropped, "Tab session reset");
        let _ = self.notify.send(StoreEvent::SessionReset { tab_id, session_id });
        session_id
    }

    /// Delete the tab's session. Returns whether one existed.
    pub fn remove(&self, tab_id: TabId) -> bool {
        let removed = self.sessions.write().remove(&tab_id).is_some();
        if removed {
            info!(tab_id, "Tab session removed");
            let _ = self.notify.send(StoreEvent::SessionRemoved { tab_id });
        }
        removed
    }

    /// Snapshot of the tab's session.
    pub fn get(&self, tab_id: TabId) -> Option<TabSession> {
        self.sessions.read().get(&tab_id).cloned()
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.sessions.read().contains_key(&tab_id)
    }

    /// Current session id of the tab, if it has a session.
    pub fn session_id(&self, tab_id: TabId) -> Option<Uuid> {
        self.sessions.read().get(&tab_id).map(|s| s.session_id)
    }

    /// Record the tab's latest top-level URL without touching its events.
    pub fn update_url(&self, tab_id: TabId, url: &str) {
        if let Some(session) = self.sessions.write().get_mut(&tab_id) {
            if session.url.as_deref() != Some(url) {
                session.url = Some(url.to_string());
            }
        }
    }

    pub fn tab_ids(&self) -> Vec<TabId> {
        let mut ids: Vec<_> = self.sessions.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Attach response status to the tab's most recent matching event.
    ///
    /// Returns `false` when the tab has no session or no event in the
    /// correlation window has this URL.
    pub fn attach_response(
        &self,
        tab_id: TabId,
        url: &str,
        status_code: u16,
        status_line: Option<String>,
    ) -> bool {
        let session_id = {
            let mut sessions = self.sessions.write();
            let Some(session) = sessions.get_mut(&tab_id) else {
                return false;
            };
            if !correlator::attach_response(
                &mut session.events,
                url,
                status_code,
                status_line,
                self.correlation_window,
            ) {
                debug!(tab_id, url, status = status_code, "Response not correlated");
                return false;
            }
            session.session_id
        };

        debug!(tab_id, url, status = status_code, "Response attached");
        let _ = self.notify.send(StoreEvent::ResponseAttached {
            tab_id,
            session_id,
            url: url.to_string(),
            status_code,
        });
        true
    }
}

impl Default for TrafficStore {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY, DEFAULT_CORRELATION_WINDOW)
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
