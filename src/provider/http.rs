//! Shared HTTP client and response helpers.

use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{PlannerError, Result};

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// No request timeout is set; a turn waits as long as the model takes unless
/// the caller configures a turn timeout.
pub fn shared_client() -> Result<&'static reqwest::Client> {
    if let Some(client) = SHARED_CLIENT.get() {
        return Ok(client);
    }
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(4)
        .build()?;
    Ok(SHARED_CLIENT.get_or_init(|| client))
}

/// Parse an SSE "data:" line.
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line
        .strip_prefix("data:")
        .map(str::trim_start)?;
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> PlannerError {
    let message = extract_error_message(body).unwrap_or_else(|| body.to_string());
    match status {
        401 | 403 => PlannerError::Authentication(message),
        _ => PlannerError::api(status, message),
    }
}

/// Pull `error.message` out of a Google API error body.
fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
