//! Router tests. They drive the Axum app with `oneshot` requests against
//! in-memory embedder and generator implementations.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use longhorn_chat::{AskResponse, GenerationClient};
use longhorn_core::{Error, LonghornConfig, Result};
use longhorn_infer::EmbedderBackend;
use longhorn_runtime::DocumentRecord;
use longhorn_server::{build_router, AppState};
use ndarray::{array, Array1};
use tower::util::ServiceExt; // for `oneshot`

const QUESTION: &str = "What year was UT founded?";

struct LengthEmbedder;

impl EmbedderBackend for LengthEmbedder {
    fn embed(&self, text: &str) -> Result<Array1<f32>> {
        Ok(array![text.len() as f32, 1.0, 0.5])
    }

    fn dimension(&self) -> usize {
        3
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Returns the prompt it was given.
struct EchoGenerator;

#[async_trait]
impl GenerationClient for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }
}

struct UnreachableGenerator;

#[async_trait]
impl GenerationClient for UnreachableGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::Http("Request failed: connection refused".into()))
    }
}

fn config_for(pdf_path: &str) -> LonghornConfig {
    let pdf_path = pdf_path.to_string();
    LonghornConfig::from_lookup(move |key| match key {
        "LONGHORN_PDF_PATH" => Some(pdf_path.clone()),
        _ => None,
    })
    .unwrap()
}

/// App whose document is already in the cache, so no PDF is read.
fn app_with_cached_document(generator: Arc<dyn GenerationClient>) -> (Router, Arc<AppState>) {
    let config = config_for("University_of_Texas_at_Austin.pdf");
    let state = Arc::new(AppState::with_clients(
        config,
        Arc::new(LengthEmbedder),
        generator,
    ));
    let path = state.document_path().to_path_buf();
    state
        .pipeline
        .cache()
        .get_or_insert_with(&path, || {
            Ok(DocumentRecord::new(
                &path,
                "The University of Texas at Austin was founded in 1883.".into(),
                array![[1.0, 2.0, 3.0]],
            ))
        })
        .unwrap();
    (build_router(state.clone()), state)
}

fn form_post(body: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/hello")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_index_serves_question_form() {
    let (app, _) = app_with_cached_document(Arc::new(EchoGenerator));
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("name=\"first_name\""));
    assert!(html.contains("/hello"));
}

#[tokio::test]
async fn test_hello_response_contains_question() {
    let (app, _) = app_with_cached_document(Arc::new(EchoGenerator));

    let response = app
        .oneshot(form_post("first_name=What+year+was+UT+founded%3F"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json.as_object().map(|body| body.len()), Some(1));
    assert!(json["message"].is_string());
    let parsed: AskResponse = serde_json::from_value(json).unwrap();
    assert!(parsed.message.contains(QUESTION));
    assert!(parsed.message.contains("founded in 1883"));
}

#[tokio::test]
async fn test_hello_without_field_is_rejected() {
    let (app, _) = app_with_cached_document(Arc::new(EchoGenerator));

    let response = app.oneshot(form_post("last_name=Bevo")).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_hello_with_empty_body_is_rejected() {
    let (app, _) = app_with_cached_document(Arc::new(EchoGenerator));

    let response = app.oneshot(form_post("")).await.unwrap();
    assert!(!response.status().is_success());
}

#[tokio::test]
async fn test_hello_rejects_get() {
    let (app, _) = app_with_cached_document(Arc::new(EchoGenerator));
    let request = Request::builder().uri("/hello").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_missing_document_is_server_error() {
    let dir = std::env::temp_dir().join("longhorn-missing-document-test");
    let missing: PathBuf = dir.join("absent.pdf");
    let config = config_for(missing.to_str().unwrap());
    let state = Arc::new(AppState::with_clients(
        config,
        Arc::new(LengthEmbedder),
        Arc::new(EchoGenerator),
    ));
    let app = build_router(state.clone());

    let response = app
        .oneshot(form_post("first_name=Who+is+Bevo%3F"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("IO error"));
    assert!(state.pipeline.cache().is_empty());
}

#[tokio::test]
async fn test_generation_failure_is_bad_gateway() {
    let (app, _) = app_with_cached_document(Arc::new(UnreachableGenerator));

    let response = app
        .oneshot(form_post("first_name=Who+is+Bevo%3F"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_health_reports_cache_state() {
    let (app, _) = app_with_cached_document(Arc::new(EchoGenerator));
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["documentCached"], true);
    assert_eq!(json["embedderAvailable"], true);
}

/// Needs the bundled PDF, the ONNX model under `LONGHORN_MODEL_DIR`, and a
/// real `GOOGLE_API_KEY`. Run with `cargo test -- --ignored`.
#[tokio::test]
#[ignore]
async fn test_bundled_document_live() {
    dotenvy::dotenv().ok();
    let config = LonghornConfig::from_env().unwrap();
    let embedder = longhorn_infer::create_embedder(&config.document.model_dir);
    assert!(embedder.is_available(), "embedding model not found");
    let app = build_router(Arc::new(AppState::new(config, embedder).unwrap()));

    let response = app
        .oneshot(form_post("first_name=What+year+was+UT+founded%3F"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(!json["message"].as_str().unwrap().trim().is_empty());
}
