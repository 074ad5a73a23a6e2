//! Conversation sessions keyed by (application, user, session).

mod memory;

pub use memory::InMemorySessionStore;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::AgentEvent;

/// Free-form session state.
pub type SessionState = serde_json::Map<String, serde_json::Value>;

/// Identity of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// A conversation context and its event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub key: SessionKey,
    #[serde(default)]
    pub state: SessionState,
    #[serde(default)]
    pub events: Vec<AgentEvent>,
    pub last_update_time: DateTime<Utc>,
}

impl Session {
    pub fn new(key: SessionKey, state: SessionState) -> Self {
        Self {
            key,
            state,
            events: Vec::new(),
            last_update_time: Utc::now(),
        }
    }
}

/// Session lookup and creation.
///
/// `get_session` followed by `create_session` is not atomic; callers that
/// share a key across concurrent tasks must serialize themselves.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session, or `None` if it was never created.
    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>>;

    /// Create a session. Fails with `SessionExists` if the key is taken.
    async fn create_session(&self, key: &SessionKey, state: SessionState) -> Result<Session>;

    /// Append a complete event to a session's log.
    async fn append_event(&self, key: &SessionKey, event: AgentEvent) -> Result<()>;

    /// Keys of every session owned by `user_id` under `app_name`.
    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<SessionKey>>;

    /// Remove a session. Removing an unknown key is not an error.
    async fn delete_session(&self, key: &SessionKey) -> Result<()>;
}
