//! Common error types.
//!
//! `AppError` covers setup and local failures (config, client build).
//! `GenerationFailure` is the reason a single upstream generation call did
//! not produce an image; its `Display` text is what callers see as `error`.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Why an operation did not produce output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("API key is required")]
    MissingApiKey,
    #[error("Prompt is required")]
    MissingPrompt,
    #[error("Missing required file: {0}")]
    MissingFile(&'static str),
    #[error("Operation '{0}' has no prompt configured")]
    Unsupported(String),
    #[error("{0}")]
    Generation(#[from] GenerationFailure),
}

impl OperationError {
    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, OperationError::Generation(_) | OperationError::Unsupported(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    /// Still rate limited after the last retry. Carries the final 429 body
    /// when one was read.
    #[error("{}", rate_limit_reason(.last_body))]
    RateLimited { last_body: Option<String> },
    /// Non-success, non-429 status. The raw body is the reason.
    #[error("{body}")]
    Upstream { status: u16, body: String },
    #[error("No image returned")]
    NoImage,
    #[error("Upstream request timed out: {0}")]
    Timeout(String),
    #[error("Could not connect to upstream: {0}")]
    Connect(String),
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
    #[error("Network error: {0}")]
    Network(String),
}

fn rate_limit_reason(last_body: &Option<String>) -> &str {
    last_body
        .as_deref()
        .filter(|b| !b.is_empty())
        .unwrap_or("Exhausted retries")
}

impl GenerationFailure {
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Classify a transport-level reqwest error. The URL is stripped since
    /// it carries the API key as a query parameter.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            GenerationFailure::Timeout(err.to_string())
        } else if err.is_connect() {
            GenerationFailure::Connect(err.to_string())
        } else if err.is_decode() || err.is_body() {
            GenerationFailure::Malformed(err.to_string())
        } else {
            GenerationFailure::Network(err.to_string())
        }
    }
}
