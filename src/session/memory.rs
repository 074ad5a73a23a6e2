//! Process-local session store.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use super::{Session, SessionKey, SessionState, SessionStore};
use crate::error::{PlannerError, Result};
use crate::types::AgentEvent;

/// Keeps sessions in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionKey, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<SessionKey, Session>>> {
        self.sessions
            .read()
            .map_err(|_| PlannerError::InvalidState("session store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<SessionKey, Session>>> {
        self.sessions
            .write()
            .map_err(|_| PlannerError::InvalidState("session store lock poisoned".into()))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>> {
        Ok(self.read()?.get(key).cloned())
    }

    async fn create_session(&self, key: &SessionKey, state: SessionState) -> Result<Session> {
        let mut sessions = self.write()?;
        if sessions.contains_key(key) {
            return Err(PlannerError::SessionExists(key.to_string()));
        }
        let session = Session::new(key.clone(), state);
        sessions.insert(key.clone(), session.clone());
        info!(session = %key, "session created");
        Ok(session)
    }

    async fn append_event(&self, key: &SessionKey, event: AgentEvent) -> Result<()> {
        if event.partial {
            return Err(PlannerError::InvalidState(
                "partial events are not stored in sessions".into(),
            ));
        }
        let mut sessions = self.write()?;
        let session = sessions
            .get_mut(key)
            .ok_or_else(|| PlannerError::SessionNotFound(key.to_string()))?;
        debug!(session = %key, author = %event.author, "append event");
        session.last_update_time = event.timestamp.max(Utc::now());
        session.events.push(event);
        Ok(())
    }

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<SessionKey>> {
        let mut keys: Vec<SessionKey> = self
            .read()?
            .keys()
            .filter(|k| k.app_name == app_name && k.user_id == user_id)
            .cloned()
            .collect();
        keys.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        Ok(keys)
    }

    async fn delete_session(&self, key: &SessionKey) -> Result<()> {
        if self.write()?.remove(key).is_some() {
            info!(session = %key, "session deleted");
        }
        Ok(())
    }
}
