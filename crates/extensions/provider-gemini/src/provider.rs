//! Gemini analysis provider implementation.

use async_trait::async_trait;

use trafficlens_protocols::{AnalysisProvider, AnalysisReply, AnalysisRequest, ProviderError};

use crate::client::GeminiClient;
use crate::types::*;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini analysis provider.
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(api_key: String) -> Self {
        Self {
            client: GeminiClient::new(api_key),
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: GeminiClient::with_base_url(api_key, base_url),
        }
    }

    fn build_request(&self, request: &AnalysisRequest) -> GenerateContentRequest {
        let system_instruction = Some(request.system_instruction.as_str())
            .filter(|s| !s.is_empty())
            .map(Content::system);
        let generation_config = GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        };

        GenerateContentRequest {
            contents: vec![Content::user(&request.user_prompt)],
            system_instruction,
            generation_config: Some(generation_config).filter(|c| !c.is_empty()),
        }
    }
}

#[async_trait]
impl AnalysisProvider for GeminiProvider {
    fn id(&self) -> &str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    async fn complete(&self, request: AnalysisRequest) -> Result<AnalysisReply, ProviderError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let gemini_request = self.build_request(&request);
        let response = self.client.generate_content(&model, &gemini_request).await?;

        let text = response.first_text().ok_or_else(|| {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            ProviderError::InvalidResponse(format!("Empty reply ({})", reason))
        })?;

        Ok(AnalysisReply {
            text,
            model: response.model_version.unwrap_or(model),
        })
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
