//! Axum request handlers for the HTTP API.
use std::sync::Arc;

use axum::extract::Multipart;
use axum::response::{Html, IntoResponse, Response};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::form::read_operation_input;
use crate::api::response::ApiError;
use crate::api::routes::AppState;
use crate::operation::Operation;

pub async fn root() -> Html<String> {
    Html(index_page())
}

/// Shared body of every operation route.
pub async fn run_operation(op: Operation, state: Arc<AppState>, multipart: Multipart) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("operation", op = %op, %request_id);
    async move {
        match handle(op, &state, multipart).await {
            Ok(resp) => resp,
            Err(err) => {
                match &err {
                    ApiError::BadRequest(msg) => tracing::info!(reason = %msg, "Rejected request"),
                    ApiError::Operation(e) => tracing::error!(reason = %e, "Operation failed"),
                }
                err.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn handle(op: Operation, state: &AppState, multipart: Multipart) -> Result<Response, ApiError> {
    let input = read_operation_input(multipart).await?;
    tracing::info!(
        uploads = input.files.values().map(Vec::len).sum::<usize>(),
        has_prompt = input.prompt.is_some(),
        "Handling request"
    );
    let output = state.service.run(op, input).await?;
    Ok(output.into_response())
}

fn index_page() -> String {
    let endpoints: String = Operation::ALL
        .iter()
        .map(|op| {
            format!(
                "        <div class=\"endpoint\">\n            <span class=\"method\">POST</span> <span class=\"path\">{}</span> - {}\n        </div>\n",
                op.route(),
                op.description()
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Nano Banana Studio API</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }}
        .header {{ text-align: center; margin-bottom: 40px; }}
        .endpoint {{ background: #f5f5f5; padding: 15px; margin: 10px 0; border-radius: 8px; }}
        .method {{ color: #2196F3; font-weight: bold; }}
        .path {{ color: #4CAF50; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>Nano Banana Studio API</h1>
        <p>AI-powered image generation and editing service</p>
    </div>
{}</body>
</html>
"#,
        endpoints
    )
}
