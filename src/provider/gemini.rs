//! Google Gemini API provider.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{PlannerError, Result};
use crate::models::GeminiModel;
use crate::types::{
    Content, ContentRole, FinishReason, GroundingMetadata, GroundingSource, Part, Usage,
};

use super::http::{parse_sse_data, shared_client, status_to_error};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiProvider {
    model: GeminiModel,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(model: GeminiModel, api_key: String, base_url: String) -> Self {
        Self {
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{method}", self.base_url, self.model.as_str())
    }

    async fn post(&self, url: &str, request: &ProviderRequest) -> Result<reqwest::Response> {
        let body = build_request_body(request);
        let resp = shared_client()?
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }
        Ok(resp)
    }
}

/// Build a `generateContent` request body.
pub fn build_request_body(request: &ProviderRequest) -> serde_json::Value {
    let contents: Vec<serde_json::Value> = request
        .contents
        .iter()
        .filter(|content| !content.is_empty())
        .map(|content| {
            serde_json::json!({
                "role": content.role,
                "parts": content.parts,
            })
        })
        .collect();

    let mut body = serde_json::Map::new();
    body.insert("contents".into(), serde_json::Value::Array(contents));

    if let Some(ref sys) = request.system_instruction {
        body.insert(
            "systemInstruction".into(),
            serde_json::json!({ "parts": [{ "text": sys }] }),
        );
    }

    if !request.tools.is_empty() {
        let tools: Vec<serde_json::Value> = request.tools.iter().map(|t| t.to_gemini()).collect();
        body.insert("tools".into(), serde_json::Value::Array(tools));
    }

    let settings = &request.settings;
    let mut gen_config = serde_json::Map::new();
    if let Some(max) = settings.max_output_tokens {
        gen_config.insert("maxOutputTokens".into(), max.into());
    }
    if let Some(temp) = settings.temperature {
        gen_config.insert("temperature".into(), temp.into());
    }
    if let Some(top_p) = settings.top_p {
        gen_config.insert("topP".into(), top_p.into());
    }
    if let Some(top_k) = settings.top_k {
        gen_config.insert("topK".into(), top_k.into());
    }
    if let Some(ref stops) = settings.stop_sequences {
        gen_config.insert("stopSequences".into(), serde_json::json!(stops));
    }
    if !gen_config.is_empty() {
        body.insert("generationConfig".into(), serde_json::Value::Object(gen_config));
    }

    serde_json::Value::Object(body)
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate_content(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        debug!(model = self.model.as_str(), "Gemini generate_content");
        let resp = self.post(&self.endpoint("generateContent"), request).await?;
        let data: GeminiResponse = resp.json().await?;
        Ok(data.into_response())
    }

    async fn stream_content(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<ProviderResponse>>> {
        debug!(model = self.model.as_str(), "Gemini stream_content");
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let resp = self.post(&url, request).await?;
        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            // Raw bytes: a UTF-8 sequence may straddle two network chunks.
            let mut buffer: Vec<u8> = Vec::new();
            futures::pin_mut!(byte_stream);

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(PlannerError::Network(e));
                        return;
                    }
                };

                buffer.extend_from_slice(&chunk);

                while let Some(line_end) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=line_end).collect();
                    if let Some(parsed) = parse_sse_bytes(&line) {
                        yield Ok(parsed);
                    }
                }
            }

            if let Some(parsed) = parse_sse_bytes(&buffer) {
                yield Ok(parsed);
            }
        };

        Ok(Box::pin(stream))
    }
}

fn parse_sse_bytes(line: &[u8]) -> Option<ProviderResponse> {
    match std::str::from_utf8(line) {
        Ok(text) => parse_sse_line(text.trim()),
        Err(e) => {
            warn!(error = %e, "Skipping Gemini stream line with invalid UTF-8");
            None
        }
    }
}

fn parse_sse_line(line: &str) -> Option<ProviderResponse> {
    let data = parse_sse_data(line)?;
    match serde_json::from_str::<GeminiResponse>(data) {
        Ok(resp) => Some(resp.into_response()),
        Err(e) => {
            warn!(error = %e, "Skipping malformed Gemini stream chunk");
            None
        }
    }
}

// Internal Gemini response types

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

impl GeminiResponse {
    fn into_response(self) -> ProviderResponse {
        let usage = self.usage_metadata.map(|u| Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);

        let Some(candidate) = self.candidates.into_iter().next() else {
            return ProviderResponse {
                block_reason,
                usage,
                ..Default::default()
            };
        };

        let content = candidate.content.and_then(|c| {
            let parts: Vec<Part> = c
                .parts
                .into_iter()
                .filter(|p| !p.thought.unwrap_or(false))
                .filter_map(|p| p.text.map(Part::text))
                .collect();
            (!parts.is_empty()).then_some(Content {
                role: ContentRole::Model,
                parts,
            })
        });

        let grounding = candidate
            .grounding_metadata
            .map(|g| GroundingMetadata {
                web_search_queries: g.web_search_queries,
                sources: g
                    .grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.web)
                    .filter_map(|web| {
                        web.uri.map(|uri| GroundingSource {
                            uri,
                            title: web.title,
                        })
                    })
                    .collect(),
            })
            .filter(|g| !g.is_empty());

        ProviderResponse {
            content,
            finish_reason: candidate.finish_reason.as_deref().map(FinishReason::from_wire),
            block_reason,
            grounding,
            usage,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
    grounding_metadata: Option<GeminiGrounding>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
    thought: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGrounding {
    #[serde(default)]
    web_search_queries: Vec<String>,
    #[serde(default)]
    grounding_chunks: Vec<GeminiGroundingChunk>,
}

#[derive(Deserialize)]
struct GeminiGroundingChunk {
    web: Option<GeminiWebSource>,
}

#[derive(Deserialize)]
struct GeminiWebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
