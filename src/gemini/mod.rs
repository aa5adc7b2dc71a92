//! Upstream generation: request/result types, the `ImageGenerator` seam and
//! the HTTP client that implements it against the Gemini endpoint.
pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::GenerationFailure;
use crate::utils::encode::EncodedAsset;

/// One upstream call: text first, then every image in order.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub api_key: String,
    pub prompt: String,
    pub images: Vec<EncodedAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub data: String,
    pub media_type: String,
}

pub type GenerationResult = Result<GeneratedImage, GenerationFailure>;

/// Anything that can turn a `GenerationRequest` into one image.
///
/// Implementations never return transport errors as panics; every failure
/// is a `GenerationFailure`.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult;
}
