//! Analysis provider trait definition.

use async_trait::async_trait;

use super::{AnalysisReply, AnalysisRequest};
use crate::error::ProviderError;

/// A language-model backend: prompt in, text out.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Returns the provider ID.
    fn id(&self) -> &str;

    /// Model used when the request does not name one.
    fn default_model(&self) -> &str;

    /// Send one prompt and return the reply text.
    async fn complete(&self, request: AnalysisRequest) -> Result<AnalysisReply, ProviderError>;
}
