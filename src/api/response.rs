//! JSON response shapes and error mapping for the HTTP API.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::error::OperationError;
use crate::gemini::GeneratedImage;
use crate::service::OperationOutput;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ImageBody {
    pub image: String,
    pub mime: String,
}

impl From<GeneratedImage> for ImageBody {
    fn from(img: GeneratedImage) -> Self {
        ImageBody { image: img.data, mime: img.media_type }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchBody {
    pub results: Vec<ImageBody>,
}

impl IntoResponse for OperationOutput {
    fn into_response(self) -> Response {
        match self {
            OperationOutput::Single(img) => Json(ImageBody::from(img)).into_response(),
            OperationOutput::Batch(outcome) => Json(BatchBody {
                results: outcome.results.into_iter().map(ImageBody::from).collect(),
            })
            .into_response(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Operation(OperationError),
}

impl From<OperationError> for ApiError {
    fn from(err: OperationError) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Operation(err)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Operation(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
