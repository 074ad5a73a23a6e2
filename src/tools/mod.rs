//! Built-in tools the hosted model may invoke on its own.
//!
//! These run inside the Gemini API; the crate only declares them.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A Gemini built-in tool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolSpec {
    /// Web search grounding.
    GoogleSearch,
}

impl ToolSpec {
    /// Tool declaration as sent in a `generateContent` request.
    pub fn to_gemini(&self) -> serde_json::Value {
        let mut decl = serde_json::Map::new();
        decl.insert(self.to_string(), serde_json::json!({}));
        serde_json::Value::Object(decl)
    }
}
