//! Generation settings and finish reasons.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Settings forwarded to Gemini as `generationConfig`.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationSettings {
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
    pub stop_sequences: Option<Vec<String>>,
}

/// Why the model stopped producing a candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Blocklist,
    ProhibitedContent,
    Spii,
    #[strum(default)]
    Other(String),
}

impl FinishReason {
    /// Parse Gemini's wire value.
    pub fn from_wire(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| Self::Other(raw.to_string()))
    }

    /// Whether the response was withheld by a content filter.
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            Self::Safety | Self::Recitation | Self::Blocklist | Self::ProhibitedContent | Self::Spii
        )
    }
}
