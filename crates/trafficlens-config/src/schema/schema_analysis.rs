//! AI analysis settings.

use serde::{Deserialize, Serialize};

/// Which language-model backend answers analysis requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAI,
    Gemini,
}

impl ProviderKind {
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "gpt-4o-mini",
            ProviderKind::Gemini => "gemini-2.0-flash",
        }
    }
}

/// Analysis bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub provider: ProviderKind,

    /// Model name; empty means the provider default.
    #[serde(default)]
    pub model: Option<String>,

    /// Bearer token. Takes precedence over the stored credential.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Override for OpenAI-compatible endpoints.
    #[serde(default)]
    pub api_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl AnalysisConfig {
    /// Configured model, or the provider's default.
    pub fn model_name(&self) -> String {
        self.model
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            api_key: None,
            api_url: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}
