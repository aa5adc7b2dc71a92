//! Env-driven configuration for the service and library.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. Defaults match the public generation endpoint and the
//! documented retry constants.
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::gemini::client::RetryPolicy;
use crate::prompt::tables::InstructionSelection;

pub const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_host: String,
    pub api_port: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub selection: InstructionSelection,
    pub max_merge_files: usize,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            api_host: "127.0.0.1".to_string(),
            api_port: "8000".to_string(),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            selection: InstructionSelection::First,
            max_merge_files: 5,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> AppResult<Self> {
        let defaults = Config::default();
        let retry = RetryPolicy {
            max_retries: parse_var("RETRY_MAX", defaults.retry.max_retries)?,
            growth: parse_var("BACKOFF_GROWTH", defaults.retry.growth)?,
            unit: Duration::from_millis(parse_var(
                "BACKOFF_UNIT_MS",
                defaults.retry.unit.as_millis() as u64,
            )?),
        };
        let max_merge_files = parse_var("MAX_MERGE_FILES", defaults.max_merge_files)?;

        let config = Config {
            api_url: env::var("GEMINI_API_URL").unwrap_or(defaults.api_url),
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: env::var("API_PORT").unwrap_or(defaults.api_port),
            request_timeout: Duration::from_secs(parse_var(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            retry,
            selection: parse_var("PROMPT_SELECTION", defaults.selection)?,
            max_merge_files,
            max_upload_bytes: parse_var::<usize>("MAX_UPLOAD_MB", defaults.max_upload_bytes / (1024 * 1024))?
                * 1024
                * 1024,
        };
        config.validate()?;
        Ok(config)
    }

    /// Range checks that parsing alone does not cover.
    pub fn validate(&self) -> AppResult<()> {
        self.retry.validate()?;
        if self.max_merge_files == 0 {
            return Err(AppError::Config("MAX_MERGE_FILES must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        tracing::info!(
            api_url = %self.api_url,
            timeout_secs = self.request_timeout.as_secs(),
            max_retries = self.retry.max_retries,
            backoff_growth = self.retry.growth,
            backoff_unit_ms = self.retry.unit.as_millis() as u64,
            selection = ?self.selection,
            max_merge_files = self.max_merge_files,
            max_upload_bytes = self.max_upload_bytes,
            "Loaded configuration"
        );
    }
}

fn parse_var<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{}='{}': {}", key, raw, e))),
        _ => Ok(default),
    }
}
