//! Convenience re-exports for common use.

pub use crate::agent::AgentDefinition;
pub use crate::chat::{ChatApp, ChatHistory, ChatMessage, ChatRole};
pub use crate::config::PlannerConfig;
pub use crate::error::{PlannerError, Result};
pub use crate::models::GeminiModel;
pub use crate::provider::ModelProvider;
pub use crate::runner::{AgentRunner, EventStream, Runner, StreamingMode};
pub use crate::session::{InMemorySessionStore, SessionKey, SessionStore};
pub use crate::tools::ToolSpec;
pub use crate::turn::TurnOrchestrator;
pub use crate::types::{AgentEvent, Content, GenerationSettings, Part, Usage};
