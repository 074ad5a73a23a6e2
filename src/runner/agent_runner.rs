//! Runner backed by a model provider and a session store.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::agent::AgentDefinition;
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::provider::{self, ModelProvider, ProviderRequest, ProviderResponse};
use crate::session::{Session, SessionKey, SessionStore};
use crate::types::{AgentEvent, Content};

use super::{EventStream, Runner, StreamingMode};

/// Runs an [`AgentDefinition`] against Gemini, keeping history in a session.
///
/// Each run sends the whole session history plus the new message to the
/// model. The user message and the final event are recorded together once
/// the final event is produced, so a failed or abandoned run leaves the
/// session unchanged.
pub struct AgentRunner {
    agent: Arc<AgentDefinition>,
    app_name: String,
    sessions: Arc<dyn SessionStore>,
    config: PlannerConfig,
    provider: Option<Arc<dyn ModelProvider>>,
    streaming: StreamingMode,
}

impl AgentRunner {
    pub fn new(
        agent: Arc<AgentDefinition>,
        app_name: impl Into<String>,
        sessions: Arc<dyn SessionStore>,
        config: PlannerConfig,
    ) -> Self {
        let streaming = config.streaming();
        Self {
            agent,
            app_name: app_name.into(),
            sessions,
            config,
            provider: None,
            streaming,
        }
    }

    /// Use a fixed provider instead of building one from the config per run.
    pub fn with_provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_streaming(mut self, streaming: StreamingMode) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn agent(&self) -> &AgentDefinition {
        &self.agent
    }

    // Resolved per run so a missing key fails the turn, not construction.
    fn provider(&self) -> Result<Arc<dyn ModelProvider>> {
        match &self.provider {
            Some(provider) => Ok(provider.clone()),
            None => provider::create_provider(&self.agent.model, &self.config),
        }
    }

    fn build_request(&self, session: &Session, new_message: &Content) -> ProviderRequest {
        let mut contents: Vec<Content> = session
            .events
            .iter()
            .filter(|event| !event.partial)
            .filter_map(|event| event.content.clone())
            .collect();
        contents.push(new_message.clone());

        ProviderRequest {
            contents,
            system_instruction: Some(self.agent.instruction.clone()).filter(|s| !s.is_empty()),
            tools: self.agent.tools.clone(),
            settings: self.agent.settings.clone(),
        }
    }
}

#[async_trait]
impl Runner for AgentRunner {
    fn app_name(&self) -> &str {
        &self.app_name
    }

    async fn run(
        &self,
        user_id: &str,
        session_id: &str,
        new_message: Content,
    ) -> Result<EventStream> {
        let key = SessionKey::new(&self.app_name, user_id, session_id);
        let session = self
            .sessions
            .get_session(&key)
            .await?
            .ok_or_else(|| PlannerError::SessionNotFound(key.to_string()))?;
        let provider = self.provider()?;

        let invocation_id = Uuid::new_v4().to_string();
        let request = self.build_request(&session, &new_message);
        let user_event = AgentEvent::user_message(&invocation_id, new_message);

        debug!(
            session = %key,
            invocation = %invocation_id,
            model = provider.model_id(),
            history = request.contents.len(),
            streaming = %self.streaming,
            "agent run start"
        );

        let ctx = RunContext {
            provider,
            request,
            sessions: self.sessions.clone(),
            key,
            invocation_id,
            user_event,
            author: self.agent.name.clone(),
            streaming: self.streaming,
        };
        let stream = run_events(ctx);

        Ok(Box::pin(stream))
    }
}

/// Owned state of one run.
struct RunContext {
    provider: Arc<dyn ModelProvider>,
    request: ProviderRequest,
    sessions: Arc<dyn SessionStore>,
    key: SessionKey,
    invocation_id: String,
    user_event: AgentEvent,
    author: String,
    streaming: StreamingMode,
}

fn run_events(ctx: RunContext) -> impl Stream<Item = Result<AgentEvent>> + Send + 'static {
    async_stream::try_stream! {
        let RunContext {
            provider,
            request,
            sessions,
            key,
            invocation_id,
            user_event,
            author,
            streaming,
        } = ctx;

        let response = match streaming {
            StreamingMode::None => provider.generate_content(&request).await?,
            StreamingMode::Sse => {
                let mut chunks = provider.stream_content(&request).await?;
                let mut aggregate = StreamAggregate::default();
                while let Some(chunk) = chunks.next().await {
                    let chunk = chunk?;
                    let piece = chunk.text();
                    if !piece.is_empty() {
                        yield AgentEvent::partial_text(&invocation_id, &author, piece.clone());
                    }
                    aggregate.absorb(chunk, &piece);
                }
                aggregate.finish()
            }
        };

        let event = final_event(&invocation_id, &author, response);
        if let Some(grounding) = &event.grounding {
            debug!(
                queries = ?grounding.web_search_queries,
                sources = grounding.sources.len(),
                "response grounded by search"
            );
        }
        sessions.append_event(&key, user_event).await?;
        sessions.append_event(&key, event.clone()).await?;
        yield event;
    }
}

/// Folds streamed chunks into one response.
#[derive(Default)]
struct StreamAggregate {
    text: String,
    last: ProviderResponse,
}

impl StreamAggregate {
    fn absorb(&mut self, chunk: ProviderResponse, piece: &str) {
        self.text.push_str(piece);
        if chunk.finish_reason.is_some() {
            self.last.finish_reason = chunk.finish_reason;
        }
        if chunk.block_reason.is_some() {
            self.last.block_reason = chunk.block_reason;
        }
        if chunk.grounding.is_some() {
            self.last.grounding = chunk.grounding;
        }
        if let Some(usage) = chunk.usage {
            self.last
                .usage
                .get_or_insert_with(Default::default)
                .merge_cumulative(&usage);
        }
    }

    fn finish(mut self) -> ProviderResponse {
        if !self.text.is_empty() {
            self.last.content = Some(Content::model(self.text));
        }
        self.last
    }
}

/// Build the final event for a model response.
///
/// A response withheld by a content filter becomes an escalation carrying
/// the filter reason.
fn final_event(invocation_id: &str, author: &str, response: ProviderResponse) -> AgentEvent {
    let mut event = AgentEvent::new(invocation_id, author);
    event.turn_complete = true;
    event.grounding = response.grounding;
    event.usage = response.usage;

    if let Some(content) = response.content.filter(|c| !c.is_empty()) {
        event.content = Some(content);
        return event;
    }

    if let Some(reason) = response.block_reason {
        warn!(reason = %reason, "prompt blocked by the model");
        event.actions.escalate = true;
        event.error_message = Some(format!("prompt blocked by the model ({reason})"));
        event.error_code = Some(reason);
    } else if let Some(reason) = response.finish_reason.filter(|r| r.is_blocked()) {
        warn!(reason = %reason, "response withheld by the model");
        event.actions.escalate = true;
        event.error_message = Some(format!("response withheld by the model ({reason})"));
        event.error_code = Some(reason.to_string());
    }
    event
}
