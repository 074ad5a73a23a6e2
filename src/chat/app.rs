//! Synchronous chat front end over the async turn orchestrator.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::agent;
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::runner::AgentRunner;
use crate::session::{InMemorySessionStore, SessionStore};
use crate::turn::TurnOrchestrator;

use super::{ChatHistory, ChatMessage};

pub const PAGE_TITLE: &str = "Trip Planner";
pub const GREETING_PLACEHOLDER: &str = "Hello! How can I help you plan your trip today?";

/// Owns the transcript and runs each submission to completion.
///
/// Every call to [`ChatApp::submit`] blocks the calling thread until the
/// turn finishes, so turns never overlap. Must not be used from inside an
/// async runtime.
pub struct ChatApp {
    orchestrator: TurnOrchestrator,
    history: ChatHistory,
    runtime: Runtime,
}

impl ChatApp {
    pub fn new(orchestrator: TurnOrchestrator) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            orchestrator,
            history: ChatHistory::new(),
            runtime,
        })
    }

    /// Wire the cached agent, an in-memory session store and a Gemini runner.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let agent = agent::boot(config);
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let runner = AgentRunner::new(agent, config.app_name(), sessions.clone(), config.clone());
        let orchestrator = TurnOrchestrator::new(sessions, Arc::new(runner), config.session_key())
            .with_timeout(config.turn_timeout());
        Self::new(orchestrator)
    }

    /// Record `input`, run its turn and record the reply.
    ///
    /// Returns the assistant entry, or `None` if `input` is blank and nothing
    /// was recorded. A failed turn still records an assistant entry holding
    /// the error text.
    pub fn submit(&mut self, input: &str) -> Option<&ChatMessage> {
        if input.trim().is_empty() {
            return None;
        }
        self.history.append(ChatMessage::user(input));
        let reply = self.runtime.block_on(self.orchestrator.respond(input));
        Some(self.history.append(ChatMessage::assistant(reply)))
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn orchestrator(&self) -> &TurnOrchestrator {
        &self.orchestrator
    }
}
