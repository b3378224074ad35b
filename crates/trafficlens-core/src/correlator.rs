//! Matching response completions back to buffered request events.

use std::collections::VecDeque;

use trafficlens_protocols::TrafficEvent;

/// Default number of most recent events a response is matched against.
pub const DEFAULT_CORRELATION_WINDOW: usize = 10;

/// Attach response status to the most recent event with exactly `url`.
///
/// Only the last `window` events are examined, newest first, and only the
/// first match is updated. Returns `false` when nothing in the window
/// matches; the response is then dropped.
pub fn attach_response(
    events: &mut VecDeque<TrafficEvent>,
    url: &str,
    status_code: u16,
    status_line: Option<String>,
    window: usize,
) -> bool {
    let start = events.len().saturating_sub(window);
    match events
        .range_mut(start..)
        .rev()
        .find(|event| event.url.as_deref() == Some(url))
    {
        Some(event) => {
            event.attach_status(status_code, status_line);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use trafficlens_protocols::{EventKind, RawEvent};

    fn buffer(urls: &[&str]) -> VecDeque<TrafficEvent> {
        urls.iter()
            .map(|u| {
                TrafficEvent::from_raw(RawEvent::new(EventKind::WebRequest).with_url(*u), Utc::now())
            })
            .collect()
    }

    #[test]
    fn test_last_match_wins() {
        let mut events = buffer(&["https://u.com/", "https://v.com/", "https://u.com/"]);
        assert!(attach_response(
            &mut events,
            "https://u.com/",
            200,
            Some("OK".to_string()),
            DEFAULT_CORRELATION_WINDOW
        ));
        assert!(events[0].status_code.is_none());
        assert!(events[1].status_code.is_none());
        assert_eq!(events[2].status_code, Some(200));
        assert_eq!(events[2].status_line.as_deref(), Some("OK"));
    }

    #[test]
    fn test_match_outside_window_is_dropped() {
        let mut urls = vec!["https://old.com/"];
        urls.extend(std::iter::repeat_n("https://new.com/", 10));
        let mut events = buffer(&urls);
        assert!(!attach_response(&mut events, "https://old.com/", 404, None, 10));
        assert!(events[0].status_code.is_none());
    }

    #[test]
    fn test_match_at_window_edge() {
        let mut urls = vec!["https://edge.com/"];
        urls.extend(std::iter::repeat_n("https://new.com/", 9));
        let mut events = buffer(&urls);
        assert!(attach_response(&mut events, "https://edge.com/", 301, None, 10));
        assert_eq!(events[0].status_code, Some(301));
    }

    #[test]
    fn test_exact_url_match_only() {
        let mut events = buffer(&["https://u.com/path?x=1"]);
        assert!(!attach_response(&mut events, "https://u.com/path", 200, None, 10));
        assert!(!attach_response(&mut events, "https://U.com/path?x=1", 200, None, 10));
    }

    #[test]
    fn test_second_response_overwrites_latest_match() {
        let mut events = buffer(&["https://u.com/"]);
        attach_response(&mut events, "https://u.com/", 302, None, 10);
        attach_response(&mut events, "https://u.com/", 200, None, 10);
        assert_eq!(events[0].status_code, Some(200));
    }

    #[test]
    fn test_empty_buffer() {
        let mut events = VecDeque::new();
        assert!(!attach_response(&mut events, "https://u.com/", 200, None, 10));
    }
}
