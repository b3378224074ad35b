//! Health check handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::http::routes::HttpState;

/// Health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Functional with reduced capability.
    Degraded,
    Unhealthy,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
}

/// Component health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentHealth {
    fn healthy(name: &str, message: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Healthy,
            message,
        }
    }

    fn degraded(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Degraded,
            message: Some(message.into()),
        }
    }
}

/// Worst status among the components.
pub fn overall_status(components: &[ComponentHealth]) -> HealthStatus {
    if components.iter().any(|c| c.status == HealthStatus::Unhealthy) {
        HealthStatus::Unhealthy
    } else if components.iter().any(|c| c.status == HealthStatus::Degraded) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Health check handler.
///
/// GET /health
pub async fn health_check(State(state): State<Arc<HttpState>>) -> Json<HealthResponse> {
    let app = &state.app;

    let capture = if app.hooks.network_observation_available() {
        ComponentHealth::healthy("capture", Some(format!("{} tabs", app.store.len())))
    } else {
        ComponentHealth::degraded("capture", "Network observation unavailable")
    };

    let tracking = ComponentHealth::healthy(
        "tracking_log",
        Some(format!(
            "{} of {} entries",
            app.tracking.len().await,
            app.tracking.capacity()
        )),
    );

    let key = app
        .credentials
        .resolve(app.config.analysis.api_key.as_deref())
        .await;
    let analysis = match key {
        Some(_) => ComponentHealth::healthy("analysis", Some(app.provider_name().to_string())),
        None => ComponentHealth::degraded("analysis", "API key not configured"),
    };

    let components = vec![capture, tracking, analysis];
    Json(HealthResponse {
        status: overall_status(&components),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: app.uptime().as_secs(),
        components,
    })
}

/// Liveness probe.
pub async fn liveness_probe() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "alive" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialize() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
    }

    #[test]
    fn test_overall_status_takes_worst() {
        let mut components = vec![
            ComponentHealth::healthy("a", None),
            ComponentHealth::degraded("b", "slow"),
        ];
        assert_eq!(overall_status(&components), HealthStatus::Degraded);

        components.push(ComponentHealth {
            name: "c".to_string(),
            status: HealthStatus::Unhealthy,
            message: None,
        });
        assert_eq!(overall_status(&components), HealthStatus::Unhealthy);
        assert_eq!(overall_status(&[]), HealthStatus::Healthy);
    }

    #[test]
    fn test_component_message_skipped_when_absent() {
        let json = serde_json::to_value(ComponentHealth::healthy("api", None)).unwrap();
        assert!(json.get("message").is_none());
        assert_eq!(json["status"], "healthy");
    }
}
