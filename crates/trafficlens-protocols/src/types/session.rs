//! Per-tab traffic session.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{TabId, TrafficEvent};

/// The event buffer of one browser tab for the current page load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSession {
    pub tab_id: TabId,
    /// Regenerated on every reset, so holders of an old snapshot can tell
    /// that the session they summarized is gone.
    pub session_id: Uuid,
    /// Last known top-level URL of the tab.
    #[serde(default)]
    pub url: Option<String>,
    pub start_time: DateTime<Utc>,
    /// Oldest first.
    #[serde(default)]
    pub events: VecDeque<TrafficEvent>,
}

impl TabSession {
    pub fn new(tab_id: TabId, url: Option<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            tab_id,
            session_id: Uuid::new_v4(),
            url,
            start_time,
            events: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first_event(&self) -> Option<&TrafficEvent> {
        self.events.front()
    }

    pub fn last_event(&self) -> Option<&TrafficEvent> {
        self.events.back()
    }

    /// The last `n` events, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &TrafficEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip)
    }
}
