//! Aggregate statistics over a tab session.
//!
//! Summaries are computed from a snapshot and never fail: events whose URL
//! does not parse are counted but left out of domain and endpoint views.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, TimeDelta, Utc};
use url::Url;
use uuid::Uuid;

use trafficlens_config::SummaryConfig;
use trafficlens_protocols::{AnalysisMetadata, EventKind, TabId, TabSession, TrafficEvent};

/// Time from session start to `now`. Negative spans clamp to zero.
pub fn elapsed_since_start(session: &TabSession, now: DateTime<Utc>) -> TimeDelta {
    (now - session.start_time).max(TimeDelta::zero())
}

/// Time between the first and last buffered event; zero with fewer than
/// two events.
pub fn observed_span(session: &TabSession) -> TimeDelta {
    match (session.first_event(), session.last_event()) {
        (Some(first), Some(last)) => (last.timestamp - first.timestamp).max(TimeDelta::zero()),
        _ => TimeDelta::zero(),
    }
}

/// Compact human duration: `0s`, `45s`, `3m 5s`, `2h 4m`.
pub fn format_duration(duration: TimeDelta) -> String {
    let total_seconds = duration.num_seconds();
    if total_seconds <= 0 {
        return "0s".to_string();
    }
    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    if minutes < 60 {
        return format!("{}m {}s", minutes, seconds);
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Aggregates for one session at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub tab_id: TabId,
    pub session_id: Uuid,
    pub url: Option<String>,
    pub start_time: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub total_events: usize,
    pub kind_counts: BTreeMap<EventKind, usize>,
    /// Unique hostnames in first-seen order.
    pub domains: Vec<String>,
    /// Unique `hostname + path` per kind in first-seen order, capped.
    pub endpoints_by_kind: BTreeMap<EventKind, Vec<String>>,
    /// The most recent events, oldest first.
    pub recent: Vec<TrafficEvent>,
    /// Position of `recent[0]` in the session buffer.
    pub recent_offset: usize,
    pub elapsed: TimeDelta,
    pub observed_span: TimeDelta,
}

impl Summary {
    /// No events were captured.
    pub fn is_empty(&self) -> bool {
        self.total_events == 0
    }

    /// Events per minute over `elapsed`; `None` when no time has passed.
    pub fn events_per_minute(&self) -> Option<f64> {
        let millis = self.elapsed.num_milliseconds();
        if millis <= 0 {
            return None;
        }
        Some(self.total_events as f64 / (millis as f64 / 60_000.0))
    }

    /// Share of `kind` in percent.
    pub fn percentage(&self, kind: EventKind) -> f64 {
        if self.total_events == 0 {
            return 0.0;
        }
        let count = self.kind_counts.get(&kind).copied().unwrap_or(0);
        count as f64 * 100.0 / self.total_events as f64
    }

    pub fn to_metadata(&self) -> AnalysisMetadata {
        AnalysisMetadata {
            total_events: self.total_events,
            event_types: self.kind_counts.clone(),
            domains: self.domains.clone(),
            timestamp: self.generated_at,
        }
    }
}

/// Builds [`Summary`] values with configured limits.
#[derive(Debug, Clone, Default)]
pub struct Summarizer {
    config: SummaryConfig,
}

impl Summarizer {
    pub fn new(config: SummaryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    pub fn summarize(&self, session: &TabSession, now: DateTime<Utc>) -> Summary {
        let mut kind_counts: BTreeMap<EventKind, usize> = BTreeMap::new();
        let mut domains = Vec::new();
        let mut seen_domains = HashSet::new();
        let mut endpoints_by_kind: BTreeMap<EventKind, Vec<String>> = BTreeMap::new();
        let mut seen_endpoints: HashSet<(EventKind, String)> = HashSet::new();

        for event in &session.events {
            *kind_counts.entry(event.kind).or_default() += 1;

            let Some(url) = event.url.as_deref().and_then(|u| Url::parse(u).ok()) else {
                continue;
            };
            let Some(host) = url.host_str().filter(|h| !h.is_empty()) else {
                continue;
            };

            if seen_domains.insert(host.to_string()) {
                domains.push(host.to_string());
            }

            let endpoint = format!("{}{}", host, url.path());
            if seen_endpoints.insert((event.kind, endpoint.clone())) {
                let list = endpoints_by_kind.entry(event.kind).or_default();
                if list.len() < self.config.endpoints_per_kind {
                    list.push(endpoint);
                }
            }
        }

        let recent_offset = session.len().saturating_sub(self.config.recent_events);
        let recent = session.events.iter().skip(recent_offset).cloned().collect();

        Summary {
            tab_id: session.tab_id,
            session_id: session.session_id,
            url: session.url.clone(),
            start_time: session.start_time,
            generated_at: now,
            total_events: session.len(),
            kind_counts,
            domains,
            endpoints_by_kind,
            recent,
            recent_offset,
            elapsed: elapsed_since_start(session, now),
            observed_span: observed_span(session),
        }
    }
}

#[cfg(test)]
#[path = "summarizer_tests.rs"]
mod tests;
