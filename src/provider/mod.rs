//! Model provider trait and the Gemini implementation.

pub mod gemini;
pub mod http;

pub use gemini::GeminiProvider;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::models::GeminiModel;
use crate::tools::ToolSpec;
use crate::types::{Content, FinishReason, GenerationSettings, GroundingMetadata, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub contents: Vec<Content>,
    pub system_instruction: Option<String>,
    pub tools: Vec<ToolSpec>,
    pub settings: GenerationSettings,
}

/// One model response, or one chunk of a streamed response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    pub content: Option<Content>,
    pub finish_reason: Option<FinishReason>,
    /// Set when the prompt itself was rejected and no candidate was produced.
    pub block_reason: Option<String>,
    pub grounding: Option<GroundingMetadata>,
    pub usage: Option<Usage>,
}

impl ProviderResponse {
    /// Text of the response, concatenating every text part.
    pub fn text(&self) -> String {
        self.content.as_ref().map(Content::text).unwrap_or_default()
    }
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g. "google").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate a complete response.
    async fn generate_content(&self, request: &ProviderRequest) -> Result<ProviderResponse>;

    /// Generate a response as a stream of chunks.
    async fn stream_content(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<ProviderResponse>>>;
}

/// Create the provider for `model` from the configured key and base URL.
pub fn create_provider(
    model: &GeminiModel,
    config: &PlannerConfig,
) -> Result<Arc<dyn ModelProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        PlannerError::Authentication(format!(
            "Missing {} (set it in the environment or a .env file)",
            config.api_key_env()
        ))
    })?;
    Ok(Arc::new(GeminiProvider::new(
        model.clone(),
        api_key.to_string(),
        config.base_url().to_string(),
    )))
}
