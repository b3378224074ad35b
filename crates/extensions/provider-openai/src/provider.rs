//! OpenAI provider implementation.

use async_trait::async_trait;
use tracing::debug;

use trafficlens_protocols::{AnalysisProvider, AnalysisReply, AnalysisRequest, ProviderError};

use crate::api::{ApiMessage, ApiRequest, ApiResponse, error_message};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI chat completions provider.
pub struct OpenAIProvider {
    api_key: String,
    api_url: String,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_url(api_key, DEFAULT_API_URL.to_string())
    }

    /// Create provider with custom API URL (for OpenAI-compatible APIs).
    pub fn with_url(api_key: String, api_url: String) -> Self {
        Self {
            api_key,
            api_url,
            client: reqwest::Client::new(),
        }
    }

    fn build_request(&self, request: &AnalysisRequest) -> ApiRequest {
        let mut messages = Vec::with_capacity(2);
        if !request.system_instruction.is_empty() {
            messages.push(ApiMessage::system(&request.system_instruction));
        }
        messages.push(ApiMessage::user(&request.user_prompt));

        ApiRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn send_request(&self, api_request: &ApiRequest) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(api_request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_api_response(status, error_message(&text)));
        }

        Ok(response)
    }
}

#[async_trait]
impl AnalysisProvider for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    async fn complete(&self, request: AnalysisRequest) -> Result<AnalysisReply, ProviderError> {
        let api_request = self.build_request(&request);
        debug!(model = %api_request.model, messages = api_request.messages.len(), "Sending chat completion");

        let response = self.send_request(&api_request).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let text = api_response
            .first_text()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?
            .to_string();
        Ok(AnalysisReply {
            text,
            model: api_response.model.unwrap_or(api_request.model),
        })
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
