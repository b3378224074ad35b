//! Bridge between traffic summaries and an external language model.
//!
//! The bridge builds prompts, enforces the call timeout and classifies the
//! reply. It holds no session state; callers re-validate their session
//! after the call returns.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use trafficlens_config::AnalysisConfig;
use trafficlens_protocols::{
    AnalysisOutcome, AnalysisProvider, AnalysisReply, AnalysisRequest, AnalysisResult,
    ProviderError, TrafficEvent,
};

use crate::summarizer::Summary;

pub const ANALYSIS_SYSTEM_INSTRUCTION: &str =
    "You are a web security and privacy analyst. Always respond with valid JSON.";

pub const CHAT_SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that can analyze web \
     traffic and answer questions. Be concise and helpful.";

const JSON_FORMAT_INSTRUCTION: &str = "Format your response as JSON with keys: summary, \
     privacyConcerns, securityConcerns, recommendations.";

pub const CONNECTION_PROBE_PROMPT: &str = "Say \"Connection successful!\"";

/// Builds a provider for an API key.
pub type ProviderFactory = Arc<dyn Fn(&str) -> Arc<dyn AnalysisProvider> + Send + Sync>;

/// Per-call model parameters.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl BridgeSettings {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            model: config.model_name(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

pub struct AnalysisBridge {
    provider: Arc<dyn AnalysisProvider>,
    settings: BridgeSettings,
}

impl AnalysisBridge {
    pub fn new(provider: Arc<dyn AnalysisProvider>, settings: BridgeSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Request for a full traffic analysis of a rendered report.
    pub fn analysis_request(&self, report: &str) -> AnalysisRequest {
        self.request(
            ANALYSIS_SYSTEM_INSTRUCTION,
            format!("{}\n\n{}", report, JSON_FORMAT_INSTRUCTION),
        )
    }

    /// Analyze a rendered report of `summary`.
    pub async fn analyze(
        &self,
        summary: &Summary,
        report: &str,
    ) -> Result<AnalysisResult, ProviderError> {
        info!(
            provider = self.provider.id(),
            tab_id = summary.tab_id,
            events = summary.total_events,
            "Requesting traffic analysis"
        );
        let reply = self.call(self.analysis_request(report)).await?;
        let analysis = AnalysisOutcome::parse(&reply.text);
        debug!(structured = analysis.is_structured(), "Analysis reply parsed");
        Ok(AnalysisResult {
            analysis,
            metadata: summary.to_metadata(),
        })
    }

    /// Free-form question, with recent events attached as context.
    pub async fn ask(
        &self,
        question: &str,
        context: &[TrafficEvent],
    ) -> Result<String, ProviderError> {
        let mut prompt = question.to_string();
        if !context.is_empty() {
            let json = serde_json::to_string_pretty(context)
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
            prompt.push_str(&format!(
                "\n\nCurrent web traffic context (last {} events):\n{}",
                context.len(),
                json
            ));
        }
        let reply = self.call(self.request(CHAT_SYSTEM_INSTRUCTION, prompt)).await?;
        Ok(reply.text)
    }

    /// Send a one-line probe and return the reply.
    pub async fn test_connection(&self) -> Result<AnalysisReply, ProviderError> {
        self.call(self.request("", CONNECTION_PROBE_PROMPT)).await
    }

    fn request(&self, system: &str, prompt: impl Into<String>) -> AnalysisRequest {
        AnalysisRequest::new(system, prompt)
            .with_model(self.settings.model.clone())
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
    }

    async fn call(&self, request: AnalysisRequest) -> Result<AnalysisReply, ProviderError> {
        let timeout = self.settings.timeout;
        match tokio::time::timeout(timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(timeout.as_secs())),
        }
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
