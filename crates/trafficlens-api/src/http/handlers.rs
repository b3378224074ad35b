//! Command and read-only query handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use trafficlens_core::{FeedUpdate, SessionFeed};
use trafficlens_protocols::{CommandError, TabId};

use crate::command::{Command, CommandContext, CommandResponse, TrafficSnapshot};
use crate::http::routes::HttpState;

/// Header carrying the sender's tab id.
pub const TAB_ID_HEADER: &str = "x-tab-id";
/// Header carrying the sender's page URL.
pub const TAB_URL_HEADER: &str = "x-tab-url";

/// Execute one command.
///
/// POST /api/command
///
/// Always answers 200; failures travel inside the [`CommandResponse`].
pub async fn command(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    payload: Result<Json<Command>, JsonRejection>,
) -> Json<CommandResponse> {
    let command = match payload {
        Ok(Json(command)) => command,
        Err(rejection) => {
            debug!("Rejected command body: {}", rejection.body_text());
            let err = CommandError::InvalidRequest(rejection.body_text());
            return Json(CommandResponse::from_error(&err));
        }
    };
    let context = sender_context(&headers);
    Json(state.commands.execute(command, context).await)
}

fn sender_context(headers: &HeaderMap) -> CommandContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    CommandContext {
        sender_tab: header(TAB_ID_HEADER).and_then(|v| v.parse().ok()),
        sender_url: header(TAB_URL_HEADER).map(str::to_string),
    }
}

/// Snapshot of one tab session.
///
/// GET /api/tabs/{tab_id}
pub async fn tab_snapshot(
    State(state): State<Arc<HttpState>>,
    Path(tab_id): Path<TabId>,
) -> Response {
    match state.app.store.get(tab_id) {
        Some(session) => Json(TrafficSnapshot::from(session)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("No session for tab {}", tab_id) })),
        )
            .into_response(),
    }
}

/// Default wait of a change long-poll.
pub const DEFAULT_WAIT_MS: u64 = 25_000;
/// Upper bound on a requested wait.
pub const MAX_WAIT_MS: u64 = 60_000;

#[derive(Debug, Deserialize)]
pub struct WaitQuery {
    pub timeout_ms: Option<u64>,
}

/// Wait for the next change to a tab session.
///
/// GET /api/tabs/{tab_id}/next?timeout_ms=
///
/// 200 with the new snapshot, 404 once the tab is closed, 204 when
/// nothing changed within the wait.
pub async fn next_tab_change(
    State(state): State<Arc<HttpState>>,
    Path(tab_id): Path<TabId>,
    Query(query): Query<WaitQuery>,
) -> Response {
    let wait_ms = query.timeout_ms.unwrap_or(DEFAULT_WAIT_MS).min(MAX_WAIT_MS);
    let wait = Duration::from_millis(wait_ms);
    let mut feed = SessionFeed::push(state.app.store.clone(), tab_id);

    match tokio::time::timeout(wait, feed.next()).await {
        Ok(Some(FeedUpdate::Snapshot(session))) => {
            Json(TrafficSnapshot::from(session)).into_response()
        }
        Ok(Some(FeedUpdate::Removed)) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Tab {} was closed", tab_id) })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "Traffic store stopped" })),
        )
            .into_response(),
        Err(_) => {
            debug!(tab_id, "No tab change within {:?}", wait);
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrackingQuery {
    pub origin: String,
}

/// Tracking log for one origin, most recent first.
///
/// GET /api/tracking?origin=
pub async fn tracking_log(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<TrackingQuery>,
) -> Json<CommandResponse> {
    let command = Command::GetTrackingLog {
        origin: query.origin,
    };
    Json(
        state
            .commands
            .execute(command, CommandContext::default())
            .await,
    )
}
