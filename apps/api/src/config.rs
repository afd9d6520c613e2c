use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::generation::settings::ReconcileStrategy;
use crate::llm_client::openai::OPENAI_API_URL;

const DEFAULT_MODELS: &str = "gpt-4,gpt-4-turbo-preview,gpt-3.5-turbo";
const DEFAULT_TIMEOUT_SECS: u64 = 90;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    /// Fallback order, highest quality first.
    pub llm_models: Vec<String>,
    pub llm_timeout: Duration,
    pub enforce_bullet_allocation: bool,
    pub reconcile_strategy: ReconcileStrategy,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            var(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let optional = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let llm_models: Vec<String> = optional("LLM_MODELS", DEFAULT_MODELS)
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        if llm_models.is_empty() {
            bail!("LLM_MODELS must name at least one model");
        }

        let timeout_secs = optional("LLM_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?;
        if !(1..=600).contains(&timeout_secs) {
            bail!("LLM_TIMEOUT_SECS must be between 1 and 600, got {timeout_secs}");
        }

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_base_url: optional("OPENAI_BASE_URL", OPENAI_API_URL)
                .trim_end_matches('/')
                .to_string(),
            llm_models,
            llm_timeout: Duration::from_secs(timeout_secs),
            enforce_bullet_allocation: optional("ENFORCE_BULLET_ALLOCATION", "false")
                .parse::<bool>()
                .context("ENFORCE_BULLET_ALLOCATION must be true or false")?,
            reconcile_strategy: optional("RECONCILE_STRATEGY", "full_merge")
                .parse::<ReconcileStrategy>()
                .map_err(anyhow::Error::msg)
                .context("RECONCILE_STRATEGY is invalid")?,
            max_upload_bytes: optional("MAX_UPLOAD_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            port: optional("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG", "info"),
        })
    }
}
