//! Agent runner events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Content;
use super::usage::Usage;

/// Author name recorded on events that carry the user's message.
pub const USER_AUTHOR: &str = "user";

/// Side effects an event requests from its consumer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventActions {
    /// The agent gave up on the turn and hands control back to the caller.
    #[serde(default)]
    pub escalate: bool,
}

/// A web source the model consulted through its search tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroundingSource {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Search queries and sources backing a grounded response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroundingMetadata {
    #[serde(default)]
    pub web_search_queries: Vec<String>,
    #[serde(default)]
    pub sources: Vec<GroundingSource>,
}

impl GroundingMetadata {
    pub fn is_empty(&self) -> bool {
        self.web_search_queries.is_empty() && self.sources.is_empty()
    }
}

/// One record of a runner's output sequence.
///
/// A run emits zero or more partial events followed by one event for which
/// [`AgentEvent::is_final_response`] holds. Events that reach a session's log
/// are never partial.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentEvent {
    pub id: String,
    pub invocation_id: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default)]
    pub partial: bool,
    #[serde(default)]
    pub turn_complete: bool,
    #[serde(default)]
    pub actions: EventActions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding: Option<GroundingMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    pub timestamp: DateTime<Utc>,
}

impl AgentEvent {
    /// Create an empty event for the given invocation.
    pub fn new(invocation_id: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            invocation_id: invocation_id.into(),
            author: author.into(),
            content: None,
            partial: false,
            turn_complete: false,
            actions: EventActions::default(),
            error_code: None,
            error_message: None,
            grounding: None,
            usage: None,
            timestamp: Utc::now(),
        }
    }

    /// Event recording the user's message in a session.
    pub fn user_message(invocation_id: impl Into<String>, content: Content) -> Self {
        Self::new(invocation_id, USER_AUTHOR).with_content(content)
    }

    /// Complete agent reply carrying a single text part.
    pub fn final_text(author: impl Into<String>, text: impl Into<String>) -> Self {
        let mut event = Self::new(Uuid::new_v4().to_string(), author).with_content(Content::model(text));
        event.turn_complete = true;
        event
    }

    /// Streaming chunk; never final.
    pub fn partial_text(
        invocation_id: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let mut event = Self::new(invocation_id, author).with_content(Content::model(text));
        event.partial = true;
        event
    }

    /// Final event in which the agent escalates instead of answering.
    pub fn escalation(author: impl Into<String>, error_message: Option<String>) -> Self {
        let mut event = Self::new(Uuid::new_v4().to_string(), author);
        event.actions.escalate = true;
        event.error_message = error_message;
        event.turn_complete = true;
        event
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// Whether this event holds the terminal response of its run.
    pub fn is_final_response(&self) -> bool {
        !self.partial
    }

    /// First text part of the event's content.
    pub fn first_text(&self) -> Option<&str> {
        self.content.as_ref().and_then(Content::first_text)
    }

    pub fn is_from_user(&self) -> bool {
        self.author == USER_AUTHOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_events_are_not_final() {
        let event = AgentEvent::partial_text("inv", "bootcamp", "Lu");
        assert!(!event.is_final_response());
        assert_eq!(event.first_text(), Some("Lu"));
    }

    #[test]
    fn escalation_is_final_without_content() {
        let event = AgentEvent::escalation("bootcamp", Some("timeout".into()));
        assert!(event.is_final_response());
        assert!(event.actions.escalate);
        assert!(event.content.is_none());
    }

    #[test]
    fn user_events_are_tagged() {
        let event = AgentEvent::user_message("inv", Content::user("hello"));
        assert!(event.is_from_user());
        assert!(!AgentEvent::final_text("bootcamp", "hi").is_from_user());
    }
}
