//! End-to-end capture → buffer → summary → report.

use std::sync::Arc;

use chrono::{Duration, Utc};
use trafficlens_config::{CaptureConfig, SummaryConfig, TrackingConfig};
use trafficlens_core::{
    CaptureHooks, RequestNotice, ResponseNotice, Summarizer, TrackingLog, TrafficStore,
    render_report,
};
use trafficlens_protocols::EventKind;

fn pipeline() -> CaptureHooks {
    let config = CaptureConfig::default();
    CaptureHooks::new(
        Arc::new(TrafficStore::from_config(&config)),
        Arc::new(TrackingLog::in_memory(&TrackingConfig::default())),
        &config,
    )
}

#[tokio::test]
async fn test_three_requests_summarized() {
    let hooks = pipeline();
    hooks.on_navigation_complete(7, "https://x.com/").unwrap();
    for url in ["https://x.com/a", "https://y.com/b", "https://x.com/c"] {
        hooks.on_before_request(RequestNotice::new(7, url)).await.unwrap();
    }
    hooks.on_completed(ResponseNotice {
        tab_id: Some(7),
        url: "https://y.com/b".to_string(),
        status_code: 204,
        status_line: Some("HTTP/1.1 204 No Content".to_string()),
    });

    let session = hooks.store().get(7).unwrap();
    let summarizer = Summarizer::new(SummaryConfig::default());
    let summary = summarizer.summarize(&session, Utc::now() + Duration::seconds(60));

    assert_eq!(summary.total_events, 3);
    assert_eq!(summary.domains.len(), 2);
    assert_eq!(summary.kind_counts.len(), 1);
    assert_eq!(summary.kind_counts[&EventKind::WebRequest], 3);
    assert_eq!(
        summary.endpoints_by_kind[&EventKind::WebRequest],
        vec!["x.com/a", "y.com/b", "x.com/c"]
    );

    let report = render_report(&summary, summarizer.config().domains_in_report);
    let text = report.text().unwrap();
    assert!(text.contains("- **Website URL**: https://x.com/"));
    assert!(text.contains("- **webrequest**: 3 events (100.0%)"));
    assert!(text.contains("- **Response**: 204 HTTP/1.1 204 No Content"));
}

#[tokio::test]
async fn test_reload_keeps_tracking_evidence() {
    let hooks = pipeline();
    hooks
        .on_before_request(RequestNotice::new(1, "https://shop.com/?utm_source=ad&gclid=9"))
        .await
        .unwrap();
    hooks.on_navigation_complete(1, "https://shop.com/").unwrap();

    assert!(hooks.store().get(1).unwrap().is_empty());
    let hits = hooks.tracking().query("https://shop.com").await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].tracking_params.len(), 2);

    hooks.on_tab_removed(1);
    assert_eq!(hooks.tracking().query("https://shop.com").await.len(), 1);
}

#[tokio::test]
async fn test_closed_tab_summarizes_to_no_data() {
    let hooks = pipeline();
    hooks.on_before_request(RequestNotice::new(2, "https://x.com/")).await;
    hooks.on_navigation_complete(2, "https://x.com/next").unwrap();

    let session = hooks.store().get(2).unwrap();
    let summary = Summarizer::default().summarize(&session, Utc::now());
    assert!(summary.is_empty());
    assert!(render_report(&summary, 15).is_no_data());
}
