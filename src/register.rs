//! Provider selection for the analysis bridge.

use std::sync::Arc;

use tracing::info;

use trafficlens_config::{AnalysisConfig, ProviderKind};
use trafficlens_core::ProviderFactory;
use trafficlens_protocols::AnalysisProvider;
use trafficlens_provider_gemini::GeminiProvider;
use trafficlens_provider_openai::OpenAIProvider;

/// Build the factory that turns an API key into the configured provider.
pub(crate) fn provider_factory(config: &AnalysisConfig) -> ProviderFactory {
    let kind = config.provider;
    let api_url = config.api_url.clone().filter(|u| !u.is_empty());
    info!(
        provider = ?kind,
        model = %config.model_name(),
        custom_url = api_url.is_some(),
        "Analysis provider selected"
    );

    Arc::new(move |api_key: &str| -> Arc<dyn AnalysisProvider> {
        let api_key = api_key.to_string();
        match (kind, &api_url) {
            (ProviderKind::OpenAI, Some(url)) => {
                Arc::new(OpenAIProvider::with_url(api_key, url.clone()))
            }
            (ProviderKind::OpenAI, None) => Arc::new(OpenAIProvider::new(api_key)),
            (ProviderKind::Gemini, Some(url)) => {
                Arc::new(GeminiProvider::with_base_url(api_key, url.clone()))
            }
            (ProviderKind::Gemini, None) => Arc::new(GeminiProvider::new(api_key)),
        }
    })
}
