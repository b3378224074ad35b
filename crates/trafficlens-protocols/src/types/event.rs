//! Observed traffic events.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Browser tab identifier as reported by the host runtime.
pub type TabId = i64;

/// Method recorded when the host does not report one.
pub const DEFAULT_METHOD: &str = "GET";

/// Resource type recorded when the host does not report one.
pub const DEFAULT_RESOURCE_TYPE: &str = "other";

/// Kind of observed network or page action.
///
/// Declaration order is the order used by every aggregate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Request seen by the network observation hook.
    #[serde(rename = "webrequest")]
    WebRequest,
    /// Resource timing entry reported from inside the page.
    #[serde(rename = "resource")]
    Resource,
    /// DOM form submission.
    #[serde(rename = "form_submit")]
    FormSubmit,
    /// `fetch()` call intercepted in the page.
    #[serde(rename = "fetch")]
    Fetch,
    /// `XMLHttpRequest` intercepted in the page.
    #[serde(rename = "xhr")]
    Xhr,
    /// Any other page-level event.
    #[serde(rename = "page_event")]
    PageEvent,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub const ALL: [EventKind; 6] = [
        EventKind::WebRequest,
        EventKind::Resource,
        EventKind::FormSubmit,
        EventKind::Fetch,
        EventKind::Xhr,
        EventKind::PageEvent,
    ];

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::WebRequest => "webrequest",
            EventKind::Resource => "resource",
            EventKind::FormSubmit => "form_submit",
            EventKind::Fetch => "fetch",
            EventKind::Xhr => "xhr",
            EventKind::PageEvent => "page_event",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event as delivered by a hook, before the buffer stamps it.
///
/// Also the shape of the `payload` in a content-script `page_event` message,
/// so form payloads that carry `action` instead of `url` deserialize too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: EventKind,
    #[serde(default, alias = "action", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
    /// Host-reported time (milliseconds, host clock).
    #[serde(default, rename = "time", skip_serializing_if = "Option::is_none")]
    pub host_time: Option<f64>,
}

impl RawEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            url: None,
            method: None,
            resource_type: None,
            fields: None,
            host_time: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_host_time(mut self, time: f64) -> Self {
        self.host_time = Some(time);
        self
    }
}

/// One observed network or page action held in a tab buffer.
///
/// Only the status fields change after creation, and only through
/// the correlator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficEvent {
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub method: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_line: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_time: Option<f64>,
}

impl TrafficEvent {
    /// Stamp a raw event, filling method and type defaults.
    pub fn from_raw(raw: RawEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: raw.kind,
            url: raw.url,
            method: raw
                .method
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_METHOD.to_string()),
            timestamp,
            status_code: None,
            status_line: None,
            resource_type: raw
                .resource_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_RESOURCE_TYPE.to_string()),
            fields: raw.fields,
            host_time: raw.host_time,
        }
    }

    /// Attach response status metadata.
    pub fn attach_status(&mut self, status_code: u16, status_line: Option<String>) {
        self.status_code = Some(status_code);
        self.status_line = status_line;
    }

    pub fn has_status(&self) -> bool {
        self.status_code.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_wire_names() {
        for kind in EventKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
        let parsed: EventKind = serde_json::from_str("\"form_submit\"").unwrap();
        assert_eq!(parsed, EventKind::FormSubmit);
    }

    #[test]
    fn test_from_raw_fills_defaults() {
        let now = Utc::now();
        let event = TrafficEvent::from_raw(RawEvent::new(EventKind::Resource), now);
        assert_eq!(event.method, "GET");
        assert_eq!(event.resource_type, "other");
        assert_eq!(event.timestamp, now);
        assert!(event.url.is_none());
        assert!(!event.has_status());
    }

    #[test]
    fn test_from_raw_empty_method_defaults() {
        let raw = RawEvent::new(EventKind::Fetch).with_method("");
        let event = TrafficEvent::from_raw(raw, Utc::now());
        assert_eq!(event.method, "GET");
    }

    #[test]
    fn test_page_payload_with_action_alias() {
        let json = serde_json::json!({
            "kind": "form_submit",
            "action": "https://shop.example/checkout",
            "method": "POST",
            "fields": {"email": "a@b.c"},
            "time": 1700000000000.0
        });
        let raw: RawEvent = serde_json::from_value(json).unwrap();
        assert_eq!(raw.kind, EventKind::FormSubmit);
        assert_eq!(raw.url.as_deref(), Some("https://shop.example/checkout"));
        assert_eq!(raw.fields.unwrap()["email"], "a@b.c");
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let mut event = TrafficEvent::from_raw(
            RawEvent::new(EventKind::WebRequest).with_url("https://a.com/"),
            Utc::now(),
        );
        event.attach_status(204, Some("HTTP/1.1 204 No Content".to_string()));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "webrequest");
        assert_eq!(json["statusCode"], 204);
        assert_eq!(json["type"], "other");
        assert!(json.get("fields").is_none());
    }
}
