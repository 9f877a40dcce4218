use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;

use crate::llm_client::OPENROUTER_API_URL;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
///
/// The upstream API key is held as a `SecretString`, so `{:?}` on a `Config`
/// prints it redacted.
#[derive(Debug)]
pub struct Config {
    pub openrouter_api_key: SecretString,
    pub openrouter_api_url: String,
    pub upstream_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_api_key: SecretString::from(require_env("OPENROUTER_API_KEY")?),
            openrouter_api_url: std::env::var("OPENROUTER_API_URL")
                .unwrap_or_else(|_| OPENROUTER_API_URL.to_string()),
            upstream_timeout: Duration::from_secs(
                std::env::var("UPSTREAM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse::<u64>()
                    .context("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
