//! Provider request and reply types.

use serde::{Deserialize, Serialize};

/// One prompt sent to a language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub system_instruction: String,
    pub user_prompt: String,
    /// Overrides the provider's default model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl AnalysisRequest {
    pub fn new(system_instruction: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_prompt: user_prompt.into(),
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Raw text reply from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReply {
    pub text: String,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = AnalysisRequest::new("sys", "user")
            .with_model("gpt-4o-mini")
            .with_temperature(0.7)
            .with_max_tokens(1000);
        assert_eq!(request.system_instruction, "sys");
        assert_eq!(request.user_prompt, "user");
        assert_eq!(request.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(request.max_tokens, Some(1000));
    }

    #[test]
    fn test_request_skips_unset_options() {
        let json = serde_json::to_value(AnalysisRequest::new("s", "u")).unwrap();
        assert_eq!(json["systemInstruction"], "s");
        assert_eq!(json["userPrompt"], "u");
        assert!(json.get("model").is_none());
        assert!(json.get("temperature").is_none());
    }
}
