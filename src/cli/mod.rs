//! Command-line arguments for the trip planner chat.

use std::time::Duration;

use clap::Parser;

use crate::config::{PlannerConfig, DEFAULT_API_KEY_ENV};
use crate::error::{PlannerError, Result};
use crate::models::GeminiModel;
use crate::runner::StreamingMode;

/// Chat with a travel planning agent.
#[derive(Parser, Debug)]
#[command(name = "trip-planner", version, about = "Trip Planner: travel chat backed by Gemini")]
pub struct Cli {
    /// Gemini model id (e.g. gemini-2.0-flash-exp)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Country the agent plans trips in
    #[arg(short, long)]
    pub country: Option<String>,

    /// Session owner
    #[arg(long)]
    pub user_id: Option<String>,

    /// Session to continue
    #[arg(long)]
    pub session_id: Option<String>,

    /// Environment variable holding the Gemini API key
    #[arg(long, default_value = DEFAULT_API_KEY_ENV)]
    pub api_key_env: String,

    /// Stream partial model output
    #[arg(long)]
    pub stream: bool,

    /// Give up on a turn after this many seconds
    #[arg(short, long)]
    pub timeout_secs: Option<u64>,

    /// Send one message and exit instead of starting an interactive chat
    pub prompt: Option<String>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Load the environment config and apply flag overrides on top.
    pub fn load_config(&self) -> Result<PlannerConfig> {
        let config = PlannerConfig::from_env_with_key_var(&self.api_key_env)?;
        Ok(self.apply(config))
    }

    /// Apply the flags that were given; unset flags keep `config` values.
    pub fn apply(&self, mut config: PlannerConfig) -> PlannerConfig {
        if let Some(model) = &self.model {
            config = config.with_model(GeminiModel::from_id(model));
        }
        if let Some(country) = &self.country {
            config = config.with_country(country);
        }
        if let Some(user_id) = &self.user_id {
            config = config.with_user_id(user_id);
        }
        if let Some(session_id) = &self.session_id {
            config = config.with_session_id(session_id);
        }
        if self.stream {
            config = config.with_streaming(StreamingMode::Sse);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_turn_timeout((secs > 0).then(|| Duration::from_secs(secs)));
        }
        config
    }
}

/// Map a [`PlannerError`] to a user-facing help string with actionable guidance.
pub fn format_error_help(err: &PlannerError, api_key_env: &str) -> String {
    match err {
        PlannerError::Authentication(msg) => {
            format!("Authentication failed: {msg}. Check {api_key_env} in your environment or .env")
        }
        PlannerError::Configuration(msg) => {
            format!("Configuration error: {msg}. Check your .env")
        }
        other => format!("{other}"),
    }
}
