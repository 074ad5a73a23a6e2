//! Google Gemini model definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Gemini models the planner can drive.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum GeminiModel {
    #[default]
    #[strum(serialize = "gemini-2.0-flash-exp")]
    Gemini20FlashExp,
    #[strum(serialize = "gemini-2.0-flash")]
    Gemini20Flash,
    #[strum(serialize = "gemini-2.5-flash")]
    Gemini25Flash,
    #[strum(serialize = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
    #[strum(serialize = "gemini-2.5-pro")]
    Gemini25Pro,
    /// Custom/unknown Gemini model.
    #[strum(default)]
    Custom(String),
}

impl GeminiModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini20FlashExp => "gemini-2.0-flash-exp",
            Self::Gemini20Flash => "gemini-2.0-flash",
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Gemini25FlashLite => "gemini-2.5-flash-lite",
            Self::Gemini25Pro => "gemini-2.5-pro",
            Self::Custom(s) => s,
        }
    }

    /// Parse a model id, accepting an optional `google:` or `gemini:` prefix.
    pub fn from_id(raw: &str) -> Self {
        let id = raw
            .trim()
            .strip_prefix("google:")
            .or_else(|| raw.trim().strip_prefix("gemini:"))
            .unwrap_or(raw.trim());
        // `Custom` is the strum default, so parsing cannot fail.
        id.parse()
            .unwrap_or_else(|_| Self::Custom(id.to_string()))
    }
}
