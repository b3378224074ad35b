//! Message protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trafficlens_core::{FormSubmission, KeySource, RequestNotice, ResponseNotice};
use trafficlens_protocols::{CommandError, RawEvent, TabId, TabSession, TrafficEvent};

/// A request to the background store.
///
/// Serialized as `{"type": "<snake_case name>", ...camelCase fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Command {
    /// Snapshot of a tab's session.
    GetTrafficData {
        #[serde(default)]
        tab_id: Option<TabId>,
    },
    /// Drop a tab's session.
    ClearTrafficData {
        #[serde(default)]
        tab_id: Option<TabId>,
    },
    /// Summarize a tab and send the report for AI analysis.
    AnalyzeTraffic {
        #[serde(default)]
        tab_id: Option<TabId>,
    },
    /// Whether network observation is available.
    TestWebrequest,
    SetApiKey {
        api_key: String,
    },
    ClearApiKey,
    ApiKeyStatus,
    /// Tracking hits for an origin, most recent first.
    GetTrackingLog {
        origin: String,
    },
    /// The rendered text report for a tab.
    BuildPrompt {
        #[serde(default)]
        tab_id: Option<TabId>,
    },
    /// Free-form question with the tab's recent events as context.
    Ask {
        #[serde(default)]
        tab_id: Option<TabId>,
        question: String,
    },
    /// Probe the configured AI provider.
    TestConnection,

    // Host hooks delivered as messages.
    PageEvent {
        #[serde(default)]
        tab_id: Option<TabId>,
        #[serde(default)]
        tab_url: Option<String>,
        payload: RawEvent,
    },
    FormSubmit {
        #[serde(default)]
        tab_id: Option<TabId>,
        #[serde(default)]
        tab_url: Option<String>,
        form: FormSubmission,
    },
    Request {
        notice: RequestNotice,
    },
    Response {
        notice: ResponseNotice,
    },
    NavigationComplete {
        tab_id: TabId,
        url: String,
    },
    TabActivated {
        tab_id: TabId,
    },
    TabRemoved {
        tab_id: TabId,
    },
}

impl Command {
    /// Wire name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetTrafficData { .. } => "get_traffic_data",
            Command::ClearTrafficData { .. } => "clear_traffic_data",
            Command::AnalyzeTraffic { .. } => "analyze_traffic",
            Command::TestWebrequest => "test_webrequest",
            Command::SetApiKey { .. } => "set_api_key",
            Command::ClearApiKey => "clear_api_key",
            Command::ApiKeyStatus => "api_key_status",
            Command::GetTrackingLog { .. } => "get_tracking_log",
            Command::BuildPrompt { .. } => "build_prompt",
            Command::Ask { .. } => "ask",
            Command::TestConnection => "test_connection",
            Command::PageEvent { .. } => "page_event",
            Command::FormSubmit { .. } => "form_submit",
            Command::Request { .. } => "request",
            Command::Response { .. } => "response",
            Command::NavigationComplete { .. } => "navigation_complete",
            Command::TabActivated { .. } => "tab_activated",
            Command::TabRemoved { .. } => "tab_removed",
        }
    }

    /// Commands that wait on the external AI service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Command::AnalyzeTraffic { .. } | Command::Ask { .. } | Command::TestConnection
        )
    }
}

/// Who sent a command, as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandContext {
    #[serde(default)]
    pub sender_tab: Option<TabId>,
    #[serde(default)]
    pub sender_url: Option<String>,
}

impl CommandContext {
    pub fn from_tab(tab_id: TabId, url: Option<String>) -> Self {
        Self {
            sender_tab: Some(tab_id),
            sender_url: url,
        }
    }
}

/// Tagged result of every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandResponse {
    Ok { data: serde_json::Value },
    Error { kind: String, message: String },
}

impl CommandResponse {
    pub fn ok<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => CommandResponse::Ok { data },
            Err(e) => CommandResponse::Error {
                kind: "invalid_request".to_string(),
                message: format!("Failed to encode response: {}", e),
            },
        }
    }

    pub fn from_error(err: &CommandError) -> Self {
        CommandResponse::Error {
            kind: err.kind().to_string(),
            message: err.user_message(),
        }
    }

    pub fn from_result(result: Result<serde_json::Value, CommandError>) -> Self {
        match result {
            Ok(data) => CommandResponse::Ok { data },
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CommandResponse::Ok { .. })
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        match self {
            CommandResponse::Ok { data } => Some(data),
            CommandResponse::Error { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<&str> {
        match self {
            CommandResponse::Ok { .. } => None,
            CommandResponse::Error { kind, .. } => Some(kind),
        }
    }
}

/// `get_traffic_data` payload.
///
/// A tab with no session yields an empty snapshot with `captured: false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSnapshot {
    pub tab_id: Option<TabId>,
    pub session_id: Option<Uuid>,
    pub url: Option<String>,
    pub start_time: DateTime<Utc>,
    pub events: Vec<TrafficEvent>,
    pub captured: bool,
}

impl TrafficSnapshot {
    pub fn empty(tab_id: Option<TabId>, now: DateTime<Utc>) -> Self {
        Self {
            tab_id,
            session_id: None,
            url: None,
            start_time: now,
            events: Vec::new(),
            captured: false,
        }
    }
}

impl From<TabSession> for TrafficSnapshot {
    fn from(session: TabSession) -> Self {
        Self {
            tab_id: Some(session.tab_id),
            session_id: Some(session.session_id),
            url: session.url,
            start_time: session.start_time,
            events: session.events.into_iter().collect(),
            captured: true,
        }
    }
}

/// `test_webrequest` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebRequestProbe {
    pub status: String,
    pub has_web_request: bool,
}

impl WebRequestProbe {
    pub fn new(available: bool) -> Self {
        let status = if available {
            "webRequest API available"
        } else {
            "webRequest API not available"
        };
        Self {
            status: status.to_string(),
            has_web_request: available,
        }
    }
}

/// `api_key_status` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyStatus {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<KeySource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<String>,
    pub provider: String,
}
