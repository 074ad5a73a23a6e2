//! Shared test helpers: stub runners, stores and a mock provider.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, BoxStream};

use trip_planner::error::{PlannerError, Result};
use trip_planner::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use trip_planner::runner::{EventStream, Runner};
use trip_planner::session::{
    InMemorySessionStore, Session, SessionKey, SessionState, SessionStore,
};
use trip_planner::turn::TurnOrchestrator;
use trip_planner::types::{AgentEvent, Content, FinishReason, Usage};

pub const APP: &str = "BOOTCAMP";
pub const USER: &str = "streamlit_usuario";
pub const SESSION: &str = "default_streamlit_usuario";

pub fn fixed_key() -> SessionKey {
    SessionKey::new(APP, USER, SESSION)
}

/// What a [`StubRunner`] does on every run.
#[derive(Clone)]
pub enum Script {
    /// Yield these events, then end.
    Events(Vec<AgentEvent>),
    /// Never yield anything and never end.
    Pending,
    /// Fail before producing a stream.
    Fail(String),
}

/// Runner that replays a script and records what it was asked.
pub struct StubRunner {
    script: Script,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl StubRunner {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with a single final text event.
    pub fn replying(text: &str) -> Self {
        Self::new(Script::Events(vec![AgentEvent::final_text("bootcamp", text)]))
    }

    /// Escalate with the given message.
    pub fn escalating(message: Option<&str>) -> Self {
        Self::new(Script::Events(vec![AgentEvent::escalation(
            "bootcamp",
            message.map(str::to_string),
        )]))
    }

    /// `(user_id, session_id, text)` of every run so far.
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Runner for StubRunner {
    fn app_name(&self) -> &str {
        APP
    }

    async fn run(
        &self,
        user_id: &str,
        session_id: &str,
        new_message: Content,
    ) -> Result<EventStream> {
        self.calls.lock().unwrap().push((
            user_id.to_string(),
            session_id.to_string(),
            new_message.text(),
        ));
        match &self.script {
            Script::Events(events) => Ok(Box::pin(stream::iter(events.clone().into_iter().map(Ok)))),
            Script::Pending => Ok(Box::pin(stream::pending::<Result<AgentEvent>>())),
            Script::Fail(msg) => Err(PlannerError::Stream(msg.clone())),
        }
    }
}

/// In-memory store that counts lookups and creations.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemorySessionStore,
    pub gets: AtomicUsize,
    pub creates: AtomicUsize,
}

impl CountingStore {
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for CountingStore {
    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_session(key).await
    }

    async fn create_session(&self, key: &SessionKey, state: SessionState) -> Result<Session> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create_session(key, state).await
    }

    async fn append_event(&self, key: &SessionKey, event: AgentEvent) -> Result<()> {
        self.inner.append_event(key, event).await
    }

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<SessionKey>> {
        self.inner.list_sessions(app_name, user_id).await
    }

    async fn delete_session(&self, key: &SessionKey) -> Result<()> {
        self.inner.delete_session(key).await
    }
}

/// Store whose sessions can never be created.
pub struct FailingStore;

#[async_trait]
impl SessionStore for FailingStore {
    async fn get_session(&self, _key: &SessionKey) -> Result<Option<Session>> {
        Ok(None)
    }

    async fn create_session(&self, _key: &SessionKey, _state: SessionState) -> Result<Session> {
        Err(PlannerError::InvalidState("session store offline".into()))
    }

    async fn append_event(&self, key: &SessionKey, _event: AgentEvent) -> Result<()> {
        Err(PlannerError::SessionNotFound(key.to_string()))
    }

    async fn list_sessions(&self, _app_name: &str, _user_id: &str) -> Result<Vec<SessionKey>> {
        Ok(Vec::new())
    }

    async fn delete_session(&self, _key: &SessionKey) -> Result<()> {
        Ok(())
    }
}

/// Orchestrator over a fresh counting store and the given runner.
pub fn orchestrator(runner: Arc<StubRunner>) -> (TurnOrchestrator, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::default());
    let orchestrator = TurnOrchestrator::new(store.clone(), runner, fixed_key());
    (orchestrator, store)
}

/// A mock provider that returns canned responses.
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<ProviderResponse>>>,
    chunks: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            chunks: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push_back(Ok(text_response(text)));
    }

    /// Queue an arbitrary response.
    pub fn queue_raw(&self, response: ProviderResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a failed call.
    pub fn queue_error(&self, err: PlannerError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    /// Chunks replayed by every `stream_content` call.
    pub fn set_chunks(&self, texts: &[&str]) {
        let mut chunks: Vec<ProviderResponse> =
            texts.iter().map(|t| text_response(t)).collect();
        for chunk in chunks.iter_mut() {
            chunk.finish_reason = None;
        }
        if let Some(last) = chunks.last_mut() {
            last.finish_reason = Some(FinishReason::Stop);
        }
        *self.chunks.lock().unwrap() = chunks;
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        content: Some(Content::model(text)),
        finish_reason: Some(FinishReason::Stop),
        usage: Some(Usage {
            input_tokens: 10,
            output_tokens: 20,
            total_tokens: 30,
        }),
        ..Default::default()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }

    async fn generate_content(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(text_response("Mock response")))
    }

    async fn stream_content(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<ProviderResponse>>> {
        self.requests.lock().unwrap().push(request.clone());
        let chunks = self.chunks.lock().unwrap().clone();
        Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
    }
}
