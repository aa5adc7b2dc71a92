//! Router setup and shared state.
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::operation::Operation;
use crate::service::ImageService;

pub struct AppState {
    pub service: ImageService,
}

pub fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    let mut app = Router::new().route("/", get(handlers::root));
    for op in Operation::ALL {
        app = app.route(
            op.route(),
            post(move |State(state): State<Arc<AppState>>, multipart: Multipart| {
                handlers::run_operation(op, state, multipart)
            }),
        );
    }
    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationFailure;
    use crate::prompt::composer::PromptComposer;
    use crate::prompt::tables::{InstructionSelection, PromptTables};
    use crate::variants::tests::{image, ScriptedGenerator};
    use axum::http::{header, Request, StatusCode};
    use hyper::Body;
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "XBOUNDARYX";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value).as_bytes(),
                    );
                }
                Part::File(name, filename, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n",
                            name, filename
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn app(generator: Arc<ScriptedGenerator>) -> Router {
        let composer = PromptComposer::new(PromptTables::builtin(), InstructionSelection::First);
        let state = Arc::new(AppState { service: ImageService::new(generator, composer, 5) });
        router(state, 10 * 1024 * 1024)
    }

    async fn post_form(app: Router, path: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn generate_returns_image_and_mime() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(image("aW1n"))]));
        let (status, body) = post_form(
            app(generator.clone()),
            "/generate",
            &[Part::Text("api_key", "k"), Part::Text("prompt", "a lighthouse")],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["image"], "aW1n");
        assert_eq!(body["mime"], "image/png");
        let seen = generator.seen.lock().unwrap();
        assert!(seen[0].prompt.ends_with("User: a lighthouse"));
        assert!(seen[0].images.is_empty());
    }

    #[tokio::test]
    async fn missing_api_key_is_400_without_upstream_call() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(image("x"))]));
        for op in Operation::ALL {
            let (status, body) = post_form(
                app(generator.clone()),
                op.route(),
                &[Part::Text("prompt", "p"), Part::File("file", "a.jpg", b"abc")],
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", op.route());
            assert_eq!(body["error"], "API key is required");
        }
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn edit_without_file_is_400() {
        let generator = Arc::new(ScriptedGenerator::new(vec![]));
        let (status, body) = post_form(
            app(generator.clone()),
            "/edit",
            &[Part::Text("api_key", "k"), Part::Text("prompt", "brighter")],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required file: file");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn unfilled_file_input_counts_as_missing() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(image("x"))]));
        let (status, body) = post_form(
            app(generator.clone()),
            "/restore_old_image",
            &[Part::Text("api_key", "k"), Part::File("file", "", b"")],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required file: file");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn upstream_failure_is_500_with_reason() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Err(GenerationFailure::Upstream {
            status: 403,
            body: "API key not valid".into(),
        })]));
        let (status, body) = post_form(
            app(generator),
            "/restore_old_image",
            &[Part::Text("api_key", "k"), Part::File("file", "old.jpg", b"\xff\xd8\xff")],
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "API key not valid");
    }

    #[tokio::test]
    async fn uploads_keep_their_content_type() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(image("x"))]));
        let (status, _) = post_form(
            app(generator.clone()),
            "/edit",
            &[Part::Text("api_key", "k"), Part::Text("prompt", "p"), Part::File("file", "a.jpg", b"hello")],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen[0].images[0].media_type, "image/jpeg");
        assert_eq!(seen[0].images[0].data, "aGVsbG8=");
    }

    #[tokio::test]
    async fn merge_with_seven_files_forwards_five() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(image("m"))]));
        let names: Vec<String> = (0..7).map(|i| format!("f{}.jpg", i)).collect();
        let mut parts = vec![Part::Text("api_key", "k")];
        for name in &names {
            parts.push(Part::File("files", name, b"data"));
        }
        let (status, _) = post_form(app(generator.clone()), "/merge_images", &parts).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(generator.seen.lock().unwrap()[0].images.len(), 5);
    }

    #[tokio::test]
    async fn create_ads_drops_failed_variants() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Err(GenerationFailure::NoImage),
            Err(GenerationFailure::Timeout("30s".into())),
            Ok(image("third")),
        ]));
        let (status, body) = post_form(
            app(generator.clone()),
            "/create_ads",
            &[
                Part::Text("api_key", "k"),
                Part::Text("variations", "3"),
                Part::File("model", "m.jpg", b"m"),
                Part::File("product", "p.jpg", b"p"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["image"], "third");
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn all_failed_batch_is_empty_200() {
        let generator = Arc::new(ScriptedGenerator::new(vec![]));
        let (status, body) = post_form(
            app(generator),
            "/generate_scenes",
            &[Part::Text("api_key", "k"), Part::File("scene", "s.jpg", b"s")],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn bad_variations_is_400() {
        let generator = Arc::new(ScriptedGenerator::new(vec![]));
        let (status, _) = post_form(
            app(generator),
            "/create_ads",
            &[Part::Text("api_key", "k"), Part::Text("variations", "lots")],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn index_is_html() {
        let generator = Arc::new(ScriptedGenerator::new(vec![]));
        let response = app(generator)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("/merge_images"));
    }
}
