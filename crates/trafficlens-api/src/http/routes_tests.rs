use super::*;
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use trafficlens_config::Config;
use trafficlens_core::{ProviderFactory, RequestNotice};
use trafficlens_protocols::AnalysisProvider;

use crate::service::CommandService;

fn no_provider() -> ProviderFactory {
    Arc::new(|_: &str| -> Arc<dyn AnalysisProvider> { panic!("no provider in route tests") })
}

fn test_state(config: Config) -> Arc<HttpState> {
    let app = Arc::new(AppState::in_memory(config, no_provider()));
    let commands = CommandService::spawn(app.clone());
    Arc::new(HttpState::new(app, commands))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_command(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/command")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_command_endpoint() {
    let app = create_router(test_state(Config::default()));
    let response = app
        .oneshot(post_command(r#"{"type":"test_webrequest"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["data"]["hasWebRequest"], true);
}

#[tokio::test]
async fn test_malformed_command_is_invalid_request() {
    let app = create_router(test_state(Config::default()));
    let response = app
        .oneshot(post_command(r#"{"type":"format_disk"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["kind"], "invalid_request");
}

#[tokio::test]
async fn test_sender_headers_become_context() {
    let state = test_state(Config::default());
    let app = create_router(state.clone());
    let request = Request::builder()
        .method("POST")
        .uri("/api/command")
        .header("content-type", "application/json")
        .header(handlers::TAB_ID_HEADER, "12")
        .header(handlers::TAB_URL_HEADER, "https://x.com/page")
        .body(Body::from(
            json!({"type": "page_event", "payload": {"kind": "fetch", "url": "https://api.x.com/"}})
                .to_string(),
        ))
        .unwrap();
    let json = body_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(json["data"]["recorded"], true);

    let session = state.app.store.get(12).unwrap();
    assert_eq!(session.url.as_deref(), Some("https://x.com/page"));
}

#[tokio::test]
async fn test_tab_snapshot() {
    let state = test_state(Config::default());
    state
        .app
        .hooks
        .on_before_request(RequestNotice::new(5, "https://x.com/a"))
        .await;
    let app = create_router(state);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/tabs/5").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["events"][0]["url"], "https://x.com/a");

    let response = app
        .oneshot(Request::builder().uri("/api/tabs/6").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_next_change_times_out_without_traffic() {
    let app = create_router(test_state(Config::default()));
    let response = app
        .oneshot(get("/api/tabs/4/next?timeout_ms=20"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_next_change_returns_new_snapshot() {
    let state = test_state(Config::default());
    let app = create_router(state.clone());
    let pending = tokio::spawn(app.oneshot(get("/api/tabs/4/next?timeout_ms=5000")));

    // Keep producing traffic until the waiting request has subscribed and answered.
    for i in 0..200 {
        if pending.is_finished() {
            break;
        }
        state
            .app
            .hooks
            .on_before_request(RequestNotice::new(4, format!("https://x.com/{i}")))
            .await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let response = pending.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["tabId"], 4);
    assert!(!json["events"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_next_change_reports_closed_tab() {
    let state = test_state(Config::default());
    state
        .app
        .hooks
        .on_before_request(RequestNotice::new(9, "https://x.com/"))
        .await;
    let app = create_router(state.clone());
    let pending = tokio::spawn(app.oneshot(get("/api/tabs/9/next?timeout_ms=5000")));

    for _ in 0..200 {
        if pending.is_finished() {
            break;
        }
        // Re-create and close the tab until the waiting request sees a removal.
        state.app.store.ensure(9, None);
        state.app.hooks.on_tab_removed(9);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let response = pending.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tracking_endpoint() {
    let state = test_state(Config::default());
    state
        .app
        .hooks
        .on_before_request(RequestNotice::new(1, "https://shop.com/?fbclid=z"))
        .await;
    let app = create_router(state);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tracking?origin=https://shop.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["entries"][0]["trackingParams"]["fbclid"], "z");
}

#[tokio::test]
async fn test_health_reports_missing_key() {
    let app = create_router(test_state(Config::default()));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    let analysis = json["components"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "analysis")
        .unwrap()
        .clone();
    assert_eq!(analysis["status"], "degraded");
}

#[tokio::test]
async fn test_health_with_configured_key() {
    let mut config = Config::default();
    config.analysis.api_key = Some("sk-test".to_string());
    let app = create_router(test_state(config));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["components"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_livez() {
    let app = create_router(test_state(Config::default()));
    let response = app
        .oneshot(Request::builder().uri("/livez").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await["status"], "alive");
}
