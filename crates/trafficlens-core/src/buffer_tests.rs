use super::*;
use chrono::Duration;
use trafficlens_protocols::EventKind;

fn request(url: &str) -> RawEvent {
    RawEvent::new(EventKind::WebRequest).with_url(url)
}

#[test]
fn test_record_creates_session() {
    let store = TrafficStore::default();
    assert!(store.get(1).is_none());

    let event = store.record(1, request("https://a.com/"));
    assert_eq!(event.method, "GET");

    let session = store.get(1).unwrap();
    assert_eq!(session.tab_id, 1);
    assert_eq!(session.len(), 1);
}

#[test]
fn test_ensure_returns_existing() {
    let store = TrafficStore::default();
    let created = store.ensure(4, Some("https://a.com/".to_string()));
    assert!(created.is_empty());
    store.record(4, request("https://a.com/x"));

    let again = store.ensure(4, Some("https://ignored.com/".to_string()));
    assert_eq!(again.session_id, created.session_id);
    assert_eq!(again.url.as_deref(), Some("https://a.com/"));
    assert_eq!(again.len(), 1);
}

#[test]
fn test_capacity_keeps_most_recent_in_order() {
    let store = TrafficStore::default();
    for i in 0..250 {
        store.record(1, request(&format!("https://a.com/{i}")));
    }
    let session = store.get(1).unwrap();
    assert_eq!(session.len(), 200);
    for (offset, event) in session.events.iter().enumerate() {
        let expected = format!("https://a.com/{}", offset + 50);
        assert_eq!(event.url.as_deref(), Some(expected.as_str()));
    }
}

#[test]
fn test_reset_empties_session_and_moves_start_time() {
    let store = TrafficStore::default();
    let before = Utc::now() - Duration::seconds(30);
    store.ensure_at(1, None, before);
    store.record(1, request("https://a.com/"));
    let old_id = store.session_id(1).unwrap();

    let reset_call = Utc::now();
    let new_id = store.reset(1, Some("https://b.com/".to_string()));

    let session = store.get(1).unwrap();
    assert!(session.is_empty());
    assert!(session.start_time >= reset_call);
    assert_eq!(session.url.as_deref(), Some("https://b.com/"));
    assert_ne!(new_id, old_id);
    assert_eq!(session.session_id, new_id);
}

#[test]
fn test_remove() {
    let store = TrafficStore::default();
    store.record(1, request("https://a.com/"));
    assert!(store.remove(1));
    assert!(store.get(1).is_none());
    assert!(!store.remove(1));
}

#[test]
fn test_tabs_are_isolated() {
    let store = TrafficStore::default();
    store.record(1, request("https://a.com/"));
    store.record(2, request("https://b.com/"));
    store.reset(1, None);
    assert!(store.get(1).unwrap().is_empty());
    assert_eq!(store.get(2).unwrap().len(), 1);
    assert_eq!(store.tab_ids(), vec![1, 2]);
}

#[test]
fn test_timestamps_never_go_backwards() {
    let store = TrafficStore::default();
    let now = Utc::now();
    store.record_at(1, request("https://a.com/1"), now);
    store.record_at(1, request("https://a.com/2"), now - Duration::seconds(5));
    let session = store.get(1).unwrap();
    assert_eq!(session.events[1].timestamp, now);
}

#[test]
fn test_snapshot_is_detached() {
    let store = TrafficStore::default();
    store.record(1, request("https://a.com/"));
    let mut snapshot = store.get(1).unwrap();
    snapshot.events.clear();
    assert_eq!(store.get(1).unwrap().len(), 1);
}

#[test]
fn test_attach_response_through_store() {
    let store = TrafficStore::default();
    store.record(1, request("https://u.com/"));
    store.record(1, request("https://v.com/"));
    store.record(1, request("https://u.com/"));

    assert!(store.attach_response(1, "https://u.com/", 200, Some("OK".to_string())));
    let session = store.get(1).unwrap();
    assert!(session.events[0].status_code.is_none());
    assert_eq!(session.events[2].status_code, Some(200));

    assert!(!store.attach_response(9, "https://u.com/", 200, None));
}

#[test]
fn test_update_url() {
    let store = TrafficStore::default();
    store.ensure(1, None);
    store.update_url(1, "https://a.com/page");
    assert_eq!(store.get(1).unwrap().url.as_deref(), Some("https://a.com/page"));
    store.update_url(2, "https://ignored.com/");
    assert!(!store.contains(2));
}

#[tokio::test]
async fn test_notifications() {
    let store = TrafficStore::default();
    let mut rx = store.subscribe();

    store.record(3, request("https://a.com/"));
    store.attach_response(3, "https://a.com/", 204, None);
    let session_id = store.reset(3, None);
    store.remove(3);

    assert!(matches!(
        rx.recv().await.unwrap(),
        StoreEvent::EventRecorded { tab_id: 3, total: 1, .. }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        StoreEvent::ResponseAttached { status_code: 204, .. }
    ));
    assert_eq!(
        rx.recv().await.unwrap(),
        StoreEvent::SessionReset { tab_id: 3, session_id }
    );
    let removed = rx.recv().await.unwrap();
    assert_eq!(removed, StoreEvent::SessionRemoved { tab_id: 3 });
    assert_eq!(removed.tab_id(), 3);
}
