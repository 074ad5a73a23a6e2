//! Configuration (layered: code > env > defaults).

use std::fmt;
use std::time::Duration;

use crate::error::{PlannerError, Result};
use crate::models::GeminiModel;
use crate::runner::StreamingMode;
use crate::session::SessionKey;

/// Environment variable holding the Gemini API key unless overridden.
pub const DEFAULT_API_KEY_ENV: &str = "KERAYA";
/// Consulted when the configured key variable is unset.
pub const FALLBACK_API_KEY_ENV: &str = "GOOGLE_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_APP_NAME: &str = "BOOTCAMP";
pub const DEFAULT_USER_ID: &str = "streamlit_usuario";
pub const DEFAULT_SESSION_ID: &str = "default_streamlit_usuario";
pub const DEFAULT_COUNTRY: &str = "Angola";

const MODEL_ENV: &str = "TRIP_PLANNER_MODEL";
const BASE_URL_ENV: &str = "TRIP_PLANNER_BASE_URL";
const APP_NAME_ENV: &str = "TRIP_PLANNER_APP_NAME";
const USER_ID_ENV: &str = "TRIP_PLANNER_USER_ID";
const SESSION_ID_ENV: &str = "TRIP_PLANNER_SESSION_ID";
const COUNTRY_ENV: &str = "TRIP_PLANNER_COUNTRY";
const TIMEOUT_ENV: &str = "TRIP_PLANNER_TURN_TIMEOUT_SECS";
const STREAMING_ENV: &str = "TRIP_PLANNER_STREAMING";

/// Process configuration.
///
/// The API key is not validated here. A missing key surfaces as an
/// authentication error on the first turn that reaches the model.
#[derive(Clone)]
pub struct PlannerConfig {
    api_key: Option<String>,
    api_key_env: String,
    base_url: Option<String>,
    model: GeminiModel,
    app_name: String,
    user_id: String,
    session_id: String,
    country: String,
    turn_timeout: Option<Duration>,
    streaming: StreamingMode,
}

impl fmt::Debug for PlannerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("api_key_env", &self.api_key_env)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("app_name", &self.app_name)
            .field("user_id", &self.user_id)
            .field("session_id", &self.session_id)
            .field("country", &self.country)
            .field("turn_timeout", &self.turn_timeout)
            .field("streaming", &self.streaming)
            .finish()
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PlannerConfig {
    /// Defaults only; no key.
    pub fn new() -> Self {
        Self {
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            base_url: None,
            model: GeminiModel::default(),
            app_name: DEFAULT_APP_NAME.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            turn_timeout: None,
            streaming: StreamingMode::None,
        }
    }

    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_key_var(DEFAULT_API_KEY_ENV)
    }

    /// Like [`PlannerConfig::from_env`] but reads the key from `api_key_env`.
    pub fn from_env_with_key_var(api_key_env: &str) -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(api_key_env, |name| std::env::var(name).ok())
    }

    /// Resolve every setting through `lookup` (an environment stand-in).
    pub fn from_lookup<F>(api_key_env: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        config.api_key_env = api_key_env.to_string();

        config.api_key = lookup(api_key_env).filter(|key| !key.is_empty());
        if config.api_key.is_none() && api_key_env != FALLBACK_API_KEY_ENV {
            config.api_key = lookup(FALLBACK_API_KEY_ENV).filter(|key| !key.is_empty());
        }

        if let Some(model) = lookup(MODEL_ENV) {
            config.model = GeminiModel::from_id(&model);
        }
        config.base_url = lookup(BASE_URL_ENV);

        let text_overrides = [
            (APP_NAME_ENV, &mut config.app_name),
            (USER_ID_ENV, &mut config.user_id),
            (SESSION_ID_ENV, &mut config.session_id),
            (COUNTRY_ENV, &mut config.country),
        ];
        for (env_var, slot) in text_overrides {
            if let Some(value) = lookup(env_var).filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                PlannerError::Configuration(format!(
                    "{TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            config.turn_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(raw) = lookup(STREAMING_ENV) {
            config.streaming = raw.trim().to_ascii_lowercase().parse().map_err(|_| {
                PlannerError::Configuration(format!(
                    "{STREAMING_ENV} must be 'none' or 'sse', got '{raw}'"
                ))
            })?;
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.turn_timeout = timeout;
        self
    }

    pub fn with_streaming(mut self, streaming: StreamingMode) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Name of the variable the key was (or would have been) read from.
    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    /// Gemini REST base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn model(&self) -> &GeminiModel {
        &self.model
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn turn_timeout(&self) -> Option<Duration> {
        self.turn_timeout
    }

    pub fn streaming(&self) -> StreamingMode {
        self.streaming
    }

    /// The fixed conversation identity every turn runs under.
    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(&self.app_name, &self.user_id, &self.session_id)
    }
}
