//! Nano Banana image proxy library
//!
//! Modules:
//! - `api`: Axum HTTP handlers, multipart parsing and router setup.
//! - `gemini`: Upstream `generateContent` client with rate-limit backoff.
//! - `prompt`: Canned instruction tables and the prompt composer.
//! - `variants`: Sequential multi-variant generation for batch operations.
//! - `service`: Validate/compose/call path shared by every operation.
//! - `operation`: The operation catalogue and per-operation input schemas.
//! - `utils`: Asset encoding helpers.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error types and aliases.
//!
//! Re-exports are provided for common types: `Config`, `GeminiClient`,
//! `PromptComposer`, `ImageService` and `Operation`.
pub mod api;
pub mod gemini;
pub mod prompt;
pub mod variants;
pub mod service;
pub mod operation;
pub mod utils;
pub mod config;
pub mod error;

pub use config::Config;
pub use gemini::client::GeminiClient;
pub use operation::Operation;
pub use prompt::composer::PromptComposer;
pub use service::ImageService;

use std::sync::Arc;

use prompt::tables::PromptTables;

/// Wire the production service from configuration.
pub fn build_service(config: &Config) -> error::AppResult<ImageService> {
    let client = GeminiClient::from_config(config)?;
    let composer = PromptComposer::new(PromptTables::builtin(), config.selection);
    Ok(ImageService::new(Arc::new(client), composer, config.max_merge_files))
}
