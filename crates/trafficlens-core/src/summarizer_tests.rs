use super::*;
use chrono::Duration;
use trafficlens_protocols::RawEvent;

fn session_with(events: &[(EventKind, Option<&str>)]) -> TabSession {
    let start = Utc::now() - Duration::minutes(2);
    let mut session = TabSession::new(1, Some("https://x.com/".to_string()), start);
    for (i, (kind, url)) in events.iter().enumerate() {
        let mut raw = RawEvent::new(*kind);
        if let Some(url) = url {
            raw = raw.with_url(*url);
        }
        session
            .events
            .push_back(TrafficEvent::from_raw(raw, start + Duration::seconds(i as i64)));
    }
    session
}

#[test]
fn test_empty_session() {
    let session = TabSession::new(1, None, Utc::now());
    let summary = Summarizer::default().summarize(&session, Utc::now());
    assert!(summary.is_empty());
    assert_eq!(summary.total_events, 0);
    assert!(summary.domains.is_empty());
    assert!(summary.kind_counts.is_empty());
    assert!(summary.recent.is_empty());
}

#[test]
fn test_three_webrequests() {
    let session = session_with(&[
        (EventKind::WebRequest, Some("https://x.com/a")),
        (EventKind::WebRequest, Some("https://y.com/b")),
        (EventKind::WebRequest, Some("https://x.com/c")),
    ]);
    let summary = Summarizer::default().summarize(&session, Utc::now());
    assert_eq!(summary.total_events, 3);
    assert_eq!(summary.domains, vec!["x.com", "y.com"]);
    assert_eq!(summary.kind_counts.len(), 1);
    assert_eq!(summary.kind_counts[&EventKind::WebRequest], 3);
    assert_eq!(
        summary.endpoints_by_kind[&EventKind::WebRequest],
        vec!["x.com/a", "y.com/b", "x.com/c"]
    );
    assert!((summary.percentage(EventKind::WebRequest) - 100.0).abs() < f64::EPSILON);
}

#[test]
fn test_bad_urls_are_counted_but_not_aggregated() {
    let session = session_with(&[
        (EventKind::Fetch, Some("N/A")),
        (EventKind::Fetch, Some("::::")),
        (EventKind::PageEvent, None),
        (EventKind::Xhr, Some("https://api.x.com/v1?q=1")),
    ]);
    let summary = Summarizer::default().summarize(&session, Utc::now());
    assert_eq!(summary.total_events, 4);
    assert_eq!(summary.kind_counts[&EventKind::Fetch], 2);
    assert_eq!(summary.domains, vec!["api.x.com"]);
    assert!(!summary.endpoints_by_kind.contains_key(&EventKind::Fetch));
    assert_eq!(summary.endpoints_by_kind[&EventKind::Xhr], vec!["api.x.com/v1"]);
}

#[test]
fn test_endpoints_deduplicated_and_capped() {
    let mut events = Vec::new();
    let urls: Vec<String> = (0..15).map(|i| format!("https://x.com/{i}")).collect();
    events.push((EventKind::Resource, Some("https://x.com/0")));
    for url in &urls {
        events.push((EventKind::Resource, Some(url.as_str())));
    }
    let session = session_with(&events);
    let summary = Summarizer::default().summarize(&session, Utc::now());
    let endpoints = &summary.endpoints_by_kind[&EventKind::Resource];
    assert_eq!(endpoints.len(), 10);
    assert_eq!(endpoints[0], "x.com/0");
    assert_eq!(endpoints[1], "x.com/1");
}

#[test]
fn test_recent_slice_and_offset() {
    let urls: Vec<String> = (0..25).map(|i| format!("https://x.com/{i}")).collect();
    let events: Vec<_> = urls
        .iter()
        .map(|u| (EventKind::WebRequest, Some(u.as_str())))
        .collect();
    let session = session_with(&events);
    let summary = Summarizer::default().summarize(&session, Utc::now());
    assert_eq!(summary.recent.len(), 20);
    assert_eq!(summary.recent_offset, 5);
    assert_eq!(summary.recent[0].url.as_deref(), Some("https://x.com/5"));
}

#[test]
fn test_durations() {
    let session = session_with(&[
        (EventKind::WebRequest, Some("https://x.com/a")),
        (EventKind::WebRequest, Some("https://x.com/b")),
        (EventKind::WebRequest, Some("https://x.com/c")),
    ]);
    let now = session.start_time + Duration::seconds(90);
    assert_eq!(elapsed_since_start(&session, now), Duration::seconds(90));
    assert_eq!(observed_span(&session), Duration::seconds(2));

    let before_start = session.start_time - Duration::seconds(5);
    assert_eq!(elapsed_since_start(&session, before_start), TimeDelta::zero());

    let single = session_with(&[(EventKind::Xhr, None)]);
    assert_eq!(observed_span(&single), TimeDelta::zero());
}

#[test]
fn test_events_per_minute() {
    let session = session_with(&[
        (EventKind::WebRequest, Some("https://x.com/a")),
        (EventKind::WebRequest, Some("https://x.com/b")),
    ]);
    let summary = Summarizer::default().summarize(&session, session.start_time + Duration::seconds(30));
    let rate = summary.events_per_minute().unwrap();
    assert!((rate - 4.0).abs() < 1e-9);

    let summary = Summarizer::default().summarize(&session, session.start_time);
    assert!(summary.events_per_minute().is_none());
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(TimeDelta::zero()), "0s");
    assert_eq!(format_duration(Duration::seconds(-3)), "0s");
    assert_eq!(format_duration(Duration::milliseconds(999)), "0s");
    assert_eq!(format_duration(Duration::seconds(45)), "45s");
    assert_eq!(format_duration(Duration::seconds(185)), "3m 5s");
    assert_eq!(format_duration(Duration::seconds(2 * 3600 + 4 * 60 + 59)), "2h 4m");
}

#[test]
fn test_metadata() {
    let session = session_with(&[
        (EventKind::FormSubmit, Some("https://x.com/login")),
        (EventKind::Xhr, Some("https://y.com/track")),
    ]);
    let now = Utc::now();
    let metadata = Summarizer::default().summarize(&session, now).to_metadata();
    assert_eq!(metadata.total_events, 2);
    assert_eq!(metadata.event_types[&EventKind::FormSubmit], 1);
    assert_eq!(metadata.domains, vec!["x.com", "y.com"]);
    assert_eq!(metadata.timestamp, now);
}
