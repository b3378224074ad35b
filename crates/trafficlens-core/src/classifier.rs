//! Tracking-parameter classification.
//!
//! Pure functions: the result depends only on the URL string and the fixed
//! key set below.

use std::collections::BTreeMap;

use trafficlens_protocols::TrackingInfo;
use url::Url;

/// Click and campaign identifiers used by major ad and analytics platforms.
pub const KNOWN_TRACKING_KEYS: &[&str] = &[
    // Google Ads
    "gclid",
    "gbraid",
    "wbraid",
    // Facebook
    "fbclid",
    // TikTok
    "ttclid",
    // Instagram
    "igshid",
    // Mailchimp
    "mc_cid",
    "mc_eid",
    // Yandex
    "yclid",
    "vero_id",
    // Microsoft Ads
    "msclkid",
];

/// Prefix of Google Analytics campaign parameters.
pub const UTM_PREFIX: &str = "utm_";

/// Whether a query key is a known tracking identifier.
///
/// Both the fixed key set and the `utm_` prefix match case-insensitively.
pub fn is_tracking_param(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    lower.starts_with(UTM_PREFIX) || KNOWN_TRACKING_KEYS.contains(&lower.as_str())
}

/// Split a URL into its tracking parameters and a clean URL.
///
/// Returns `None` when `raw_url` is not an absolute URL with a
/// scheme/host origin.
pub fn classify(raw_url: &str) -> Option<TrackingInfo> {
    let url = Url::parse(raw_url).ok()?;
    if !url.origin().is_tuple() {
        return None;
    }

    let mut tracking_params = BTreeMap::new();
    let mut kept: Vec<(String, String)> = Vec::new();
    for (key, value) in url.query_pairs() {
        if is_tracking_param(&key) {
            tracking_params.insert(key.into_owned(), value.into_owned());
        } else {
            kept.push((key.into_owned(), value.into_owned()));
        }
    }

    let mut clean = url.clone();
    clean.set_fragment(None);
    clean.set_query(None);
    // Origin + path only; credentials never survive into the clean URL.
    let _ = clean.set_username("");
    let _ = clean.set_password(None);
    if !kept.is_empty() {
        clean.query_pairs_mut().extend_pairs(kept.iter());
    }

    let destination_origin = clean.origin().ascii_serialization();

    Some(TrackingInfo {
        original_url: raw_url.to_string(),
        clean_url: clean.to_string(),
        tracking_params,
        destination_origin,
    })
}

/// Origin (scheme://host[:port]) of a URL, if it has one.
pub fn origin_of(raw_url: &str) -> Option<String> {
    let url = Url::parse(raw_url).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
