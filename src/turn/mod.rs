//! Turn orchestration: one user message in, one display string out.
//!
//! A turn walks `Idle -> SessionEnsuring -> Dispatching -> AwaitingFinal`
//! and ends in `Completed` or `Failed`. The orchestrator stops reading the
//! runner's events at the first final event; anything after it is dropped
//! unread.

mod extract;

pub use extract::{
    extract_response, format_turn_error, ESCALATION_PREFIX, NO_FINAL_RESPONSE,
    NO_SPECIFIC_MESSAGE, TURN_ERROR_PREFIX,
};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use strum::Display;
use tracing::{debug, error, info, warn};

use crate::error::{PlannerError, Result};
use crate::runner::{EventStream, Runner};
use crate::session::{Session, SessionKey, SessionState, SessionStore};
use crate::types::Content;

/// Phase of a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TurnState {
    Idle,
    SessionEnsuring,
    Dispatching,
    AwaitingFinal,
    Completed,
    Failed,
}

/// Runs turns for one fixed session identity.
pub struct TurnOrchestrator {
    sessions: Arc<dyn SessionStore>,
    runner: Arc<dyn Runner>,
    key: SessionKey,
    timeout: Option<Duration>,
}

impl fmt::Debug for TurnOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnOrchestrator")
            .field("key", &self.key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TurnOrchestrator {
    pub fn new(sessions: Arc<dyn SessionStore>, runner: Arc<dyn Runner>, key: SessionKey) -> Self {
        if runner.app_name() != key.app_name {
            warn!(
                session = %key,
                runner_app = runner.app_name(),
                "runner serves a different app; turns will fail"
            );
        }
        Self {
            sessions,
            runner,
            key,
            timeout: None,
        }
    }

    /// Bound each turn. `None` (the default) waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn session_key(&self) -> &SessionKey {
        &self.key
    }

    /// Look the session up and create it if it does not exist yet.
    pub async fn ensure_session(&self) -> Result<Session> {
        if let Some(session) = self.sessions.get_session(&self.key).await? {
            debug!(session = %self.key, "session already exists");
            return Ok(session);
        }
        let session = self
            .sessions
            .create_session(&self.key, SessionState::new())
            .await?;
        info!(session = %self.key, "session created for turn");
        Ok(session)
    }

    /// Run one turn and return the text to show for the assistant.
    ///
    /// Errors from the session store or the runner are returned unchanged;
    /// see [`TurnOrchestrator::respond`] for the infallible form.
    pub async fn run_turn(&self, message: &str) -> Result<String> {
        let mut tracker = TurnTracker::new(&self.key);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.drive(message, &mut tracker))
                .await
                .unwrap_or_else(|_| Err(PlannerError::Timeout(limit.as_millis() as u64))),
            None => self.drive(message, &mut tracker).await,
        };
        match &result {
            Ok(_) => tracker.advance(TurnState::Completed),
            Err(_) => tracker.advance(TurnState::Failed),
        }
        result
    }

    /// Run one turn, folding any failure into the user-visible error string.
    pub async fn respond(&self, message: &str) -> String {
        match self.run_turn(message).await {
            Ok(text) => text,
            Err(err) => {
                error!(
                    session = %self.key,
                    error = %err,
                    category = ?err.category(),
                    retryable = err.is_retryable(),
                    "turn failed"
                );
                format_turn_error(&err)
            }
        }
    }

    async fn drive(&self, message: &str, tracker: &mut TurnTracker<'_>) -> Result<String> {
        if self.runner.app_name() != self.key.app_name {
            return Err(PlannerError::Configuration(format!(
                "session app '{}' does not match runner app '{}'",
                self.key.app_name,
                self.runner.app_name()
            )));
        }

        tracker.advance(TurnState::SessionEnsuring);
        self.ensure_session().await?;

        tracker.advance(TurnState::Dispatching);
        let events = self
            .runner
            .run(&self.key.user_id, &self.key.session_id, Content::user(message))
            .await?;

        tracker.advance(TurnState::AwaitingFinal);
        await_final(events).await
    }
}

/// Consume events until the first final one and extract its text.
///
/// A stream that ends without a final event yields the fallback text; one
/// that never ends and never turns final keeps this future pending.
pub async fn await_final(mut events: EventStream) -> Result<String> {
    while let Some(event) = events.next().await {
        let event = event?;
        if event.is_final_response() {
            return Ok(extract_response(&event));
        }
    }
    Ok(NO_FINAL_RESPONSE.to_string())
}

struct TurnTracker<'a> {
    key: &'a SessionKey,
    state: TurnState,
}

impl<'a> TurnTracker<'a> {
    fn new(key: &'a SessionKey) -> Self {
        Self {
            key,
            state: TurnState::Idle,
        }
    }

    fn advance(&mut self, next: TurnState) {
        debug!(session = %self.key, from = %self.state, to = %next, "turn state");
        self.state = next;
    }
}
