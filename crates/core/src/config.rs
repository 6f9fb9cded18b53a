// crates/core/src/config.rs

//! Runtime configuration read from the environment (and an optional `.env`).

use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROJECT: &str = "default";
pub const DEFAULT_EVAL_NAME: &str = "Tool Calling Eval";

/// Settings for the chat endpoint and the tracing backend.
///
/// Environment variables:
/// - OPENAI_API_KEY (required)
/// - OPENAI_BASE_URL, OPENAI_MODEL, MODEL_TIMEOUT_SECS
/// - PHOENIX_COLLECTOR_ENDPOINT: unset means spans stay in memory
/// - PHOENIX_PROJECT_NAME, PHOENIX_API_KEY
/// - EVAL_NAME: annotation name used when uploading labels
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub collector_endpoint: Option<String>,
    pub project: String,
    pub collector_api_key: Option<String>,
    pub eval_name: String,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let timeout_secs = match get("MODEL_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("MODEL_TIMEOUT_SECS is not a number: {raw:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            collector_endpoint: get("PHOENIX_COLLECTOR_ENDPOINT"),
            project: get("PHOENIX_PROJECT_NAME").unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
            collector_api_key: get("PHOENIX_API_KEY"),
            eval_name: get("EVAL_NAME").unwrap_or_else(|| DEFAULT_EVAL_NAME.to_string()),
        })
    }
}
