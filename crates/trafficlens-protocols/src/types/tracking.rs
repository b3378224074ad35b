//! Tracking-parameter evidence.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of classifying one URL's query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    pub original_url: String,
    /// Origin + path + every non-tracking parameter, in original order.
    pub clean_url: String,
    /// Only the matched tracking keys, with their raw values.
    pub tracking_params: BTreeMap<String, String>,
    /// scheme://host[:port] of the clean URL.
    pub destination_origin: String,
}

impl TrackingInfo {
    pub fn has_tracking(&self) -> bool {
        !self.tracking_params.is_empty()
    }
}

/// One detected tracking hit in the global log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingLogEntry {
    pub time: DateTime<Utc>,
    pub original_url: String,
    pub clean_url: String,
    pub tracking_params: BTreeMap<String, String>,
    pub destination_origin: String,
}

impl TrackingLogEntry {
    pub fn new(info: TrackingInfo, time: DateTime<Utc>) -> Self {
        Self {
            time,
            original_url: info.original_url,
            clean_url: info.clean_url,
            tracking_params: info.tracking_params,
            destination_origin: info.destination_origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_from_info() {
        let mut params = BTreeMap::new();
        params.insert("gclid".to_string(), "abc".to_string());
        let info = TrackingInfo {
            original_url: "https://a.com/?gclid=abc".to_string(),
            clean_url: "https://a.com/".to_string(),
            tracking_params: params,
            destination_origin: "https://a.com".to_string(),
        };
        assert!(info.has_tracking());

        let entry = TrackingLogEntry::new(info, Utc::now());
        assert_eq!(entry.destination_origin, "https://a.com");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["trackingParams"]["gclid"], "abc");
        assert_eq!(json["cleanUrl"], "https://a.com/");
    }
}
