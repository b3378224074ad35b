//! Live view of one tab session.
//!
//! Consumers that used to re-query a tab on a timer subscribe here instead.
//! Push mode follows the store's change notifications; poll mode is the
//! fallback for hosts that cannot deliver them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::debug;

use trafficlens_protocols::{TabId, TabSession};

use crate::buffer::{StoreEvent, TrafficStore};

/// A change observed on the followed tab.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    Snapshot(TabSession),
    Removed,
}

enum FeedSource {
    Push(broadcast::Receiver<StoreEvent>),
    Poll(Interval),
}

/// Stream of snapshots for one tab.
pub struct SessionFeed {
    store: Arc<TrafficStore>,
    tab_id: TabId,
    source: FeedSource,
    last: Option<TabSession>,
}

impl SessionFeed {
    /// Follow change notifications.
    pub fn push(store: Arc<TrafficStore>, tab_id: TabId) -> Self {
        let rx = store.subscribe();
        let last = store.get(tab_id);
        Self {
            store,
            tab_id,
            source: FeedSource::Push(rx),
            last,
        }
    }

    /// Re-snapshot every `period`, yielding only when something changed.
    pub fn poll(store: Arc<TrafficStore>, tab_id: TabId, period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let last = store.get(tab_id);
        Self {
            store,
            tab_id,
            source: FeedSource::Poll(interval),
            last,
        }
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    /// Snapshot as of the last yielded update (or creation).
    pub fn current(&self) -> Option<&TabSession> {
        self.last.as_ref()
    }

    /// Wait for the next change to the tab.
    ///
    /// Returns `None` once the store stops publishing.
    pub async fn next(&mut self) -> Option<FeedUpdate> {
        loop {
            match &mut self.source {
                FeedSource::Push(rx) => match rx.recv().await {
                    Ok(event) if event.tab_id() == self.tab_id => {
                        return Some(self.refresh());
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(tab_id = self.tab_id, skipped, "Feed lagged; re-snapshotting");
                        return Some(self.refresh());
                    }
                    Err(RecvError::Closed) => return None,
                },
                FeedSource::Poll(interval) => {
                    interval.tick().await;
                    let current = self.store.get(self.tab_id);
                    if current != self.last {
                        return Some(self.update(current));
                    }
                }
            }
        }
    }

    fn refresh(&mut self) -> FeedUpdate {
        let current = self.store.get(self.tab_id);
        self.update(current)
    }

    fn update(&mut self, current: Option<TabSession>) -> FeedUpdate {
        self.last = current.clone();
        match current {
            Some(session) => FeedUpdate::Snapshot(session),
            None => FeedUpdate::Removed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trafficlens_protocols::{EventKind, RawEvent};

    fn request(url: &str) -> RawEvent {
        RawEvent::new(EventKind::WebRequest).with_url(url)
    }

    #[tokio::test]
    async fn test_push_feed_follows_one_tab() {
        let store = Arc::new(TrafficStore::default());
        let mut feed = SessionFeed::push(store.clone(), 1);
        assert!(feed.current().is_none());

        store.record(2, request("https://other.com/"));
        store.record(1, request("https://x.com/a"));

        match feed.next().await.unwrap() {
            FeedUpdate::Snapshot(session) => {
                assert_eq!(session.tab_id, 1);
                assert_eq!(session.len(), 1);
            }
            other => panic!("Expected snapshot, got {:?}", other),
        }

        store.remove(1);
        assert_eq!(feed.next().await.unwrap(), FeedUpdate::Removed);
        assert!(feed.current().is_none());
    }

    #[tokio::test]
    async fn test_push_feed_reset_yields_empty_session() {
        let store = Arc::new(TrafficStore::default());
        store.record(1, request("https://x.com/a"));
        let mut feed = SessionFeed::push(store.clone(), 1);
        let new_id = store.reset(1, Some("https://x.com/".to_string()));

        match feed.next().await.unwrap() {
            FeedUpdate::Snapshot(session) => {
                assert!(session.is_empty());
                assert_eq!(session.session_id, new_id);
            }
            other => panic!("Expected snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_push_feed_recovers_from_lag() {
        let store = Arc::new(TrafficStore::default());
        let mut feed = SessionFeed::push(store.clone(), 1);
        for i in 0..400 {
            store.record(1, request(&format!("https://x.com/{i}")));
        }
        match feed.next().await.unwrap() {
            FeedUpdate::Snapshot(session) => assert_eq!(session.len(), 200),
            other => panic!("Expected snapshot, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_feed_yields_only_on_change() {
        let store = Arc::new(TrafficStore::default());
        let mut feed = SessionFeed::poll(store.clone(), 1, Duration::from_secs(1));

        let waiter = tokio::spawn(async move {
            let update = feed.next().await;
            (update, feed)
        });
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!waiter.is_finished());

        store.record(1, request("https://x.com/a"));
        let (update, _feed) = waiter.await.unwrap();
        match update.unwrap() {
            FeedUpdate::Snapshot(session) => assert_eq!(session.len(), 1),
            other => panic!("Expected snapshot, got {:?}", other),
        }
    }
}
