//! Ingestion of host notifications.
//!
//! [`CaptureHooks`] is the single path by which network, tab lifecycle and
//! page notifications reach the traffic buffer and the tracking log. It
//! only observes: nothing here can block or alter the traffic it sees.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use trafficlens_config::CaptureConfig;
use trafficlens_protocols::{EventKind, RawEvent, TabId, TrafficEvent};

use crate::buffer::TrafficStore;
use crate::redaction::Redactor;
use crate::tracking_log::TrackingLog;

/// Outgoing request seen by the network observation hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestNotice {
    /// Owning tab; absent or negative for requests not tied to a tab.
    #[serde(default)]
    pub tab_id: Option<TabId>,
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    /// Host timestamp in milliseconds.
    #[serde(default, rename = "timeStamp", alias = "time")]
    pub time: Option<f64>,
}

impl RequestNotice {
    pub fn new(tab_id: TabId, url: impl Into<String>) -> Self {
        Self {
            tab_id: Some(tab_id),
            url: url.into(),
            method: None,
            resource_type: None,
            time: None,
        }
    }
}

/// Completed response seen by the network observation hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseNotice {
    #[serde(default)]
    pub tab_id: Option<TabId>,
    pub url: String,
    pub status_code: u16,
    #[serde(default)]
    pub status_line: Option<String>,
}

/// DOM form submission before redaction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormSubmission {
    /// Form action; the page URL is used when absent.
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub time: Option<f64>,
}

fn valid_tab(tab_id: Option<TabId>) -> Option<TabId> {
    tab_id.filter(|id| *id >= 0)
}

/// Host hook handlers feeding the traffic buffer and tracking log.
pub struct CaptureHooks {
    store: Arc<TrafficStore>,
    tracking: Arc<TrackingLog>,
    redactor: Redactor,
    excluded_prefixes: Vec<String>,
    network_observation: bool,
}

impl CaptureHooks {
    pub fn new(store: Arc<TrafficStore>, tracking: Arc<TrackingLog>, config: &CaptureConfig) -> Self {
        if !config.network_observation {
            warn!("Network observation unavailable; only page events will be captured");
        }
        Self {
            store,
            tracking,
            redactor: Redactor::from_config(config),
            excluded_prefixes: config.excluded_schemes.clone(),
            network_observation: config.network_observation,
        }
    }

    pub fn store(&self) -> &Arc<TrafficStore> {
        &self.store
    }

    pub fn tracking(&self) -> &Arc<TrackingLog> {
        &self.tracking
    }

    /// Whether network notices are being captured.
    pub fn network_observation_available(&self) -> bool {
        self.network_observation
    }

    /// False for browser and extension internal URLs.
    pub fn is_capturable_url(&self, url: &str) -> bool {
        !self
            .excluded_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()))
    }

    /// Handle an outgoing request.
    ///
    /// Every captured request URL is also offered to the tracking log.
    pub async fn on_before_request(&self, notice: RequestNotice) -> Option<TrafficEvent> {
        if !self.network_observation {
            return None;
        }
        let tab_id = valid_tab(notice.tab_id)?;
        if !self.is_capturable_url(&notice.url) {
            return None;
        }

        if let Err(e) = self.tracking.record(&notice.url).await {
            warn!(url = %notice.url, "Failed to persist tracking log: {}", e);
        }

        // A tab first seen through a request starts its session at that URL.
        self.store.ensure(tab_id, Some(notice.url.clone()));

        let mut raw = RawEvent::new(EventKind::WebRequest).with_url(notice.url);
        raw.method = notice.method;
        raw.resource_type = notice.resource_type;
        raw.host_time = notice.time;
        Some(self.store.record(tab_id, raw))
    }

    /// Handle a completed response. Returns whether it was correlated.
    pub fn on_completed(&self, notice: ResponseNotice) -> bool {
        if !self.network_observation {
            return false;
        }
        let Some(tab_id) = valid_tab(notice.tab_id) else {
            return false;
        };
        debug!(
            tab_id,
            url = %notice.url,
            status = notice.status_code,
            "Response completed"
        );
        self.store
            .attach_response(tab_id, &notice.url, notice.status_code, notice.status_line)
    }

    /// Start a fresh session for a completed navigation.
    pub fn on_navigation_complete(&self, tab_id: TabId, url: &str) -> Option<Uuid> {
        if tab_id < 0 || url.is_empty() {
            return None;
        }
        Some(self.store.reset(tab_id, Some(url.to_string())))
    }

    pub fn on_tab_removed(&self, tab_id: TabId) -> bool {
        self.store.remove(tab_id)
    }

    /// Handle an event reported from inside the page.
    ///
    /// Any fields carried by the payload are redacted again here.
    pub fn on_page_event(
        &self,
        tab_id: Option<TabId>,
        tab_url: Option<&str>,
        mut payload: RawEvent,
    ) -> Option<TrafficEvent> {
        let Some(tab_id) = valid_tab(tab_id) else {
            warn!("Page event received without a tab id");
            return None;
        };
        if let Some(url) = payload.url.as_deref() {
            if !self.is_capturable_url(url) {
                return None;
            }
        }

        self.store.ensure(tab_id, tab_url.map(str::to_string));
        if let Some(url) = tab_url {
            self.store.update_url(tab_id, url);
        }

        if let Some(fields) = payload.fields.take() {
            payload.fields = Some(self.redactor.redact_fields(fields));
        }
        if payload.kind == EventKind::FormSubmit {
            payload.method = payload.method.map(|m| m.to_uppercase());
        }
        Some(self.store.record(tab_id, payload))
    }

    /// Handle a DOM form submission.
    pub fn on_form_submit(
        &self,
        tab_id: Option<TabId>,
        tab_url: Option<&str>,
        form: FormSubmission,
    ) -> Option<TrafficEvent> {
        let action = form.action.or_else(|| tab_url.map(str::to_string));
        let method = form
            .method
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "GET".to_string())
            .to_uppercase();

        let mut raw = RawEvent::new(EventKind::FormSubmit)
            .with_method(method)
            .with_fields(self.redactor.redact_fields(form.fields));
        raw.url = action;
        raw.host_time = form.time;
        self.on_page_event(tab_id, tab_url, raw)
    }
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
