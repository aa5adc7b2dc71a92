//! multipart/form-data parsing into `OperationInput`.
use axum::extract::Multipart;

use crate::api::response::ApiError;
use crate::service::OperationInput;
use crate::utils::encode::EncodedAsset;

/// Reads every field. `api_key`/`apiKey`, `prompt` and `variations` are text;
/// anything else is an upload stored under its field name. Empty parts with
/// no filename (an unfilled file input) are skipped.
pub async fn read_operation_input(mut multipart: Multipart) -> Result<OperationInput, ApiError> {
    let mut input = OperationInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "api_key" | "apiKey" => {
                input.api_key = Some(read_text(field, &name).await?);
            }
            "prompt" => {
                input.prompt = Some(read_text(field, &name).await?);
            }
            "variations" => {
                let raw = read_text(field, &name).await?;
                input.variations = parse_variations(&raw)?;
            }
            "" => {
                tracing::trace!("Ignoring unnamed multipart field");
            }
            _ => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read '{}': {}", name, e)))?;
                if bytes.is_empty() && file_name.is_empty() {
                    tracing::trace!(field = %name, "Skipping empty upload");
                    continue;
                }
                tracing::debug!(field = %name, bytes = bytes.len(), "Received upload");
                input.add_file(name.clone(), EncodedAsset::from_bytes(&bytes, content_type.as_deref()));
            }
        }
    }
    Ok(input)
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read '{}': {}", name, e)))
}

fn parse_variations(raw: &str) -> Result<Option<i64>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("variations must be an integer, got '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variations_parsing() {
        assert_eq!(parse_variations("").unwrap(), None);
        assert_eq!(parse_variations(" 2 ").unwrap(), Some(2));
        assert_eq!(parse_variations("-4").unwrap(), Some(-4));
        assert!(parse_variations("three").is_err());
    }
}
