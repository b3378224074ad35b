//! Single-writer command loop.
//!
//! Commands are queued to one task and executed in arrival order, so store
//! mutations never interleave across commands. Commands that wait on the AI
//! service run on their own task and re-check their session when the reply
//! arrives.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use trafficlens_core::credentials::mask_key;
use trafficlens_core::{AnalysisBridge, Report, render_report};
use trafficlens_protocols::{CommandError, TabId, TabSession};

use crate::command::{
    ApiKeyStatus, Command, CommandContext, CommandResponse, TrafficSnapshot, WebRequestProbe,
};
use crate::state::AppState;

const COMMAND_QUEUE_CAPACITY: usize = 256;

const NO_TRAFFIC: &str = "No traffic data collected yet";
const SESSION_ENDED: &str = "The tab navigated or closed before the reply arrived";

struct Envelope {
    command: Command,
    context: CommandContext,
    reply: oneshot::Sender<CommandResponse>,
}

/// Cloneable sender side of the command loop.
#[derive(Clone)]
pub struct CommandHandle {
    tx: mpsc::Sender<Envelope>,
}

impl CommandHandle {
    /// Queue a command and wait for its response.
    pub async fn execute(&self, command: Command, context: CommandContext) -> CommandResponse {
        let (reply, rx) = oneshot::channel();
        let envelope = Envelope {
            command,
            context,
            reply,
        };
        if self.tx.send(envelope).await.is_err() {
            return CommandResponse::from_error(&CommandError::Unavailable);
        }
        rx.await
            .unwrap_or_else(|_| CommandResponse::from_error(&CommandError::Unavailable))
    }
}

/// The loop that owns command execution.
pub struct CommandService {
    state: Arc<AppState>,
    rx: mpsc::Receiver<Envelope>,
}

impl CommandService {
    pub fn new(state: Arc<AppState>) -> (Self, CommandHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        (Self { state, rx }, CommandHandle { tx })
    }

    /// Start the loop on the current runtime.
    pub fn spawn(state: Arc<AppState>) -> CommandHandle {
        let (service, handle) = Self::new(state);
        tokio::spawn(service.run());
        handle
    }

    /// Run until every handle is dropped.
    pub async fn run(mut self) {
        info!("Command service started");
        while let Some(envelope) = self.rx.recv().await {
            let Envelope {
                command,
                context,
                reply,
            } = envelope;
            let name = command.name();

            if command.is_remote() {
                let state = self.state.clone();
                tokio::spawn(async move {
                    let response = execute(&state, command, context).await;
                    deliver(reply, response, name);
                });
            } else {
                let response = execute(&self.state, command, context).await;
                deliver(reply, response, name);
            }
        }
        info!("Command service stopped");
    }
}

/// Hand a response back; a vanished caller is expected during teardown.
fn deliver(reply: oneshot::Sender<CommandResponse>, response: CommandResponse, name: &str) {
    if reply.send(response).is_err() {
        debug!(command = name, "Caller went away before the reply was sent");
    }
}

/// Execute one command, folding every error into the response.
pub async fn execute(state: &AppState, command: Command, context: CommandContext) -> CommandResponse {
    let name = command.name();
    debug!(command = name, "Executing command");
    let result = handle(state, command, context).await;
    if let Err(e) = &result {
        match e {
            CommandError::Provider(_) | CommandError::Storage(_) => {
                error!(command = name, kind = e.kind(), "Command failed: {}", e);
            }
            _ => debug!(command = name, kind = e.kind(), "Command rejected: {}", e),
        }
    }
    CommandResponse::from_result(result)
}

async fn handle(
    state: &AppState,
    command: Command,
    context: CommandContext,
) -> Result<serde_json::Value, CommandError> {
    match command {
        Command::GetTrafficData { tab_id } => {
            let tab_id = resolve_tab(state, tab_id, &context);
            let snapshot = tab_id
                .and_then(|id| state.store.get(id))
                .map(TrafficSnapshot::from)
                .unwrap_or_else(|| TrafficSnapshot::empty(tab_id, Utc::now()));
            to_json(snapshot)
        }
        Command::ClearTrafficData { tab_id } => {
            let tab_id = resolve_tab(state, tab_id, &context);
            let cleared = tab_id.is_some_and(|id| state.store.remove(id));
            Ok(json!({ "success": true, "tabId": tab_id, "cleared": cleared }))
        }
        Command::AnalyzeTraffic { tab_id } => analyze(state, resolve_tab(state, tab_id, &context)).await,
        Command::TestWebrequest => to_json(WebRequestProbe::new(
            state.hooks.network_observation_available(),
        )),
        Command::SetApiKey { api_key } => {
            if api_key.trim().is_empty() {
                return Err(CommandError::InvalidRequest(
                    "API key must not be empty".to_string(),
                ));
            }
            state.credentials.set(&api_key).await?;
            to_json(key_status(state).await)
        }
        Command::ClearApiKey => {
            state.credentials.clear().await?;
            to_json(key_status(state).await)
        }
        Command::ApiKeyStatus => to_json(key_status(state).await),
        Command::GetTrackingLog { origin } => {
            let origin = origin.trim();
            if origin.is_empty() {
                return Err(CommandError::InvalidRequest(
                    "origin must not be empty".to_string(),
                ));
            }
            let entries = state.tracking.query_recent_first(origin).await;
            Ok(json!({ "origin": origin, "entries": entries }))
        }
        Command::BuildPrompt { tab_id } => {
            let session = captured_session(state, resolve_tab(state, tab_id, &context))?;
            let prompt = build_prompt(state, &session)?;
            Ok(json!({ "tabId": session.tab_id, "prompt": prompt }))
        }
        Command::Ask { tab_id, question } => {
            ask(state, resolve_tab(state, tab_id, &context), &question).await
        }
        Command::TestConnection => {
            let bridge = bridge(state).await?;
            let reply = bridge.test_connection().await?;
            Ok(json!({
                "success": true,
                "provider": state.provider_name(),
                "model": reply.model,
                "reply": reply.text,
            }))
        }
        Command::PageEvent {
            tab_id,
            tab_url,
            payload,
        } => {
            let tab_id = tab_id.or(context.sender_tab);
            let tab_url = tab_url.or(context.sender_url);
            let recorded = state
                .hooks
                .on_page_event(tab_id, tab_url.as_deref(), payload)
                .is_some();
            Ok(json!({ "status": "received", "recorded": recorded }))
        }
        Command::FormSubmit {
            tab_id,
            tab_url,
            form,
        } => {
            let tab_id = tab_id.or(context.sender_tab);
            let tab_url = tab_url.or(context.sender_url);
            let recorded = state
                .hooks
                .on_form_submit(tab_id, tab_url.as_deref(), form)
                .is_some();
            Ok(json!({ "status": "received", "recorded": recorded }))
        }
        Command::Request { notice } => {
            let recorded = state.hooks.on_before_request(notice).await.is_some();
            Ok(json!({ "recorded": recorded }))
        }
        Command::Response { notice } => {
            let correlated = state.hooks.on_completed(notice);
            Ok(json!({ "correlated": correlated }))
        }
        Command::NavigationComplete { tab_id, url } => {
            let session_id = state.hooks.on_navigation_complete(tab_id, &url);
            Ok(json!({ "sessionId": session_id }))
        }
        Command::TabActivated { tab_id } => {
            state.set_active_tab(Some(tab_id));
            Ok(json!({ "activeTab": tab_id }))
        }
        Command::TabRemoved { tab_id } => {
            let removed = state.hooks.on_tab_removed(tab_id);
            state.clear_active_tab(tab_id);
            Ok(json!({ "removed": removed }))
        }
    }
}

/// Explicit tab, else the sender's tab, else the active tab.
fn resolve_tab(state: &AppState, explicit: Option<TabId>, context: &CommandContext) -> Option<TabId> {
    explicit.or(context.sender_tab).or_else(|| state.active_tab())
}

fn captured_session(state: &AppState, tab_id: Option<TabId>) -> Result<TabSession, CommandError> {
    tab_id
        .and_then(|id| state.store.get(id))
        .filter(|session| !session.is_empty())
        .ok_or_else(|| CommandError::NoData(NO_TRAFFIC.to_string()))
}

fn build_prompt(state: &AppState, session: &TabSession) -> Result<String, CommandError> {
    let summary = state.summarizer.summarize(session, Utc::now());
    match render_report(&summary, state.summarizer.config().domains_in_report) {
        Report::Text(text) => Ok(text),
        Report::NoData => Err(CommandError::NoData(NO_TRAFFIC.to_string())),
    }
}

/// The session must still be the one the request was built from.
fn ensure_current(state: &AppState, session: &TabSession) -> Result<(), CommandError> {
    if state.store.session_id(session.tab_id) == Some(session.session_id) {
        Ok(())
    } else {
        warn!(tab_id = session.tab_id, "Session replaced during AI call; discarding reply");
        Err(CommandError::NoData(SESSION_ENDED.to_string()))
    }
}

async fn bridge(state: &AppState) -> Result<AnalysisBridge, CommandError> {
    let (api_key, _) = state
        .credentials
        .resolve(state.config.analysis.api_key.as_deref())
        .await
        .ok_or(CommandError::NotConfigured)?;
    let provider = (state.provider_factory())(&api_key);
    Ok(AnalysisBridge::new(provider, state.bridge_settings.clone()))
}

async fn analyze(state: &AppState, tab_id: Option<TabId>) -> Result<serde_json::Value, CommandError> {
    let session = captured_session(state, tab_id)?;
    let bridge = bridge(state).await?;

    let summary = state.summarizer.summarize(&session, Utc::now());
    let report = match render_report(&summary, state.summarizer.config().domains_in_report) {
        Report::Text(text) => text,
        Report::NoData => return Err(CommandError::NoData(NO_TRAFFIC.to_string())),
    };

    let result = bridge.analyze(&summary, &report).await?;
    ensure_current(state, &session)?;
    to_json(result)
}

async fn ask(
    state: &AppState,
    tab_id: Option<TabId>,
    question: &str,
) -> Result<serde_json::Value, CommandError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(CommandError::InvalidRequest(
            "question must not be empty".to_string(),
        ));
    }
    let bridge = bridge(state).await?;

    let session = tab_id
        .and_then(|id| state.store.get(id))
        .filter(|s| !s.is_empty());
    let context: Vec<_> = session
        .as_ref()
        .map(|s| {
            s.recent(state.summarizer.config().chat_context_events)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    let answer = bridge.ask(question, &context).await?;
    if let Some(session) = &session {
        ensure_current(state, session)?;
    }
    Ok(json!({ "answer": answer, "contextEvents": context.len() }))
}

async fn key_status(state: &AppState) -> ApiKeyStatus {
    let resolved = state
        .credentials
        .resolve(state.config.analysis.api_key.as_deref())
        .await;
    ApiKeyStatus {
        configured: resolved.is_some(),
        source: resolved.as_ref().map(|(_, source)| *source),
        masked: resolved.as_ref().map(|(key, _)| mask_key(key)),
        provider: state.provider_name().to_string(),
    }
}

fn to_json<T: serde::Serialize>(value: T) -> Result<serde_json::Value, CommandError> {
    serde_json::to_value(value).map_err(|e| CommandError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
