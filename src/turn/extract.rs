//! Display text for a turn's outcome.

use crate::error::PlannerError;
use crate::types::AgentEvent;

/// Prefix of the reply shown when the agent escalates instead of answering.
pub const ESCALATION_PREFIX: &str = "Agente escalou";
/// Escalation detail used when the agent gave no error message.
pub const NO_SPECIFIC_MESSAGE: &str = "Sem mensagem específica.";
/// Reply shown when the final event has neither text nor escalation.
pub const NO_FINAL_RESPONSE: &str = "Agent produced no final response.";
/// Prefix of the assistant entry recorded for a failed turn.
pub const TURN_ERROR_PREFIX: &str = "Sorry, an error occurred";

/// Text to show for a final event.
///
/// Text content wins over escalation; an event with neither falls back to
/// [`NO_FINAL_RESPONSE`].
pub fn extract_response(event: &AgentEvent) -> String {
    if let Some(text) = event.first_text() {
        return text.to_string();
    }
    if event.actions.escalate {
        let detail = event
            .error_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(NO_SPECIFIC_MESSAGE);
        return format!("{ESCALATION_PREFIX}: {detail}");
    }
    NO_FINAL_RESPONSE.to_string()
}

/// Assistant entry for a turn that failed with `err`.
pub fn format_turn_error(err: &PlannerError) -> String {
    format!("{TURN_ERROR_PREFIX}: {err}")
}
