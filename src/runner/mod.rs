//! Agent runner: turns one user message into a stream of agent events.

mod agent_runner;

pub use agent_runner::AgentRunner;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Result;
use crate::types::{AgentEvent, Content};

/// Events of one run, produced incrementally.
pub type EventStream = BoxStream<'static, Result<AgentEvent>>;

/// How the runner talks to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StreamingMode {
    /// One model call, one final event.
    #[default]
    None,
    /// Partial events per streamed chunk, then one final event.
    Sse,
}

/// Drives an agent for a session.
///
/// A run yields zero or more partial events and then an event for which
/// [`AgentEvent::is_final_response`] holds. Consumers may drop the stream as
/// soon as they have seen the final event.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Application the runner's sessions belong to.
    fn app_name(&self) -> &str;

    /// Submit `new_message` to the session and start the run.
    async fn run(&self, user_id: &str, session_id: &str, new_message: Content)
        -> Result<EventStream>;
}
