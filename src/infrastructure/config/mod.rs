use crate::application::use_cases::model_fallback::DEFAULT_MODELS;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "testgen.toml";
pub const ENV_PREFIX: &str = "TESTGEN_";
pub const API_KEY_VARS: [&str; 2] = ["GENAI_API_KEY", "GOOGLE_API_KEY"];

/// Runtime settings: defaults, then `testgen.toml`, then `TESTGEN_*` env vars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub gemini_base_url: String,
    pub request_timeout_secs: u64,
    /// Candidate models, highest priority first.
    pub models: Vec<String>,
    pub default_run_dates: Vec<String>,
    pub default_expected_count: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            request_timeout_secs: 120,
            models: DEFAULT_MODELS.iter().map(|model| model.to_string()).collect(),
            default_run_dates: ["17/10/2025", "29/10/2025", "31/10/2025", "21/11/2025"]
                .iter()
                .map(|date| date.to_string())
                .collect(),
            default_expected_count: 8,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(AppConfig::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))
    }

    pub fn llm_config(&self, api_key: Option<String>) -> LLMConfig {
        LLMConfig {
            base_url: self.gemini_base_url.clone(),
            model: self.models.first().cloned().unwrap_or_default(),
            api_key,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// First non-empty value among the credential variables.
pub fn resolve_api_key<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

pub fn api_key_from_env() -> Option<String> {
    let key = resolve_api_key(|name| std::env::var(name).ok());
    match key {
        Some(_) => info!("Configured Gemini API key from environment"),
        None => warn!(
            "GENAI_API_KEY not set in environment. Set GENAI_API_KEY before running for proper operation."
        ),
    }
    key
}
