//! Web server for uploading and browsing documents.
//!
//! Provides:
//! - an upload form that runs the processing pipeline
//! - a listing with domain filter tabs and per-document detail pages
//! - a report page with per-domain and per-day counts
//! - a JSON API mirroring the pages

mod assets;
mod handlers;
mod routes;
mod templates;

pub use routes::{create_router, MAX_UPLOAD_BYTES};

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::{Config, Settings};
use crate::models::DocumentRecord;
use crate::pipeline::{Pipeline, PipelineError};
use crate::registry::Registry;
use crate::storage::{Upload, UploadStore};

/// Shared state for the web server.
///
/// The registry sits behind one async mutex; every request that reads or
/// writes it holds the lock until it is done with it.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Mutex<Registry>>,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(registry: Registry, pipeline: Pipeline) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            pipeline: Arc::new(pipeline),
        }
    }

    /// Build state from settings: opens the registry and the production pipeline.
    pub fn from_settings(settings: &Settings, config: &Config) -> anyhow::Result<Self> {
        settings.ensure_directories()?;
        let registry = settings.open_registry()?;
        let pipeline = Pipeline::from_config(settings, config)?;
        Ok(Self::new(registry, pipeline))
    }

    pub fn uploads(&self) -> &UploadStore {
        self.pipeline.storage()
    }

    /// Run the pipeline, locking the registry only to commit.
    pub async fn process_upload(&self, upload: Upload) -> Result<DocumentRecord, PipelineError> {
        let prepared = self.pipeline.prepare(upload, &|_| {}).await?;
        let mut registry = self.registry.lock().await;
        self.pipeline.commit(&mut registry, prepared)
    }
}

/// Bind a listener; `host` may be an IP address or a hostname.
pub async fn bind_listener(host: &str, port: u16) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((host, port)).await
}

/// Start the web server.
pub async fn serve(settings: &Settings, config: &Config, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings, config)?;
    let app = create_router(state);

    let listener = bind_listener(host, port).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::path::Path;
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::llm::{Analysis, AnalysisError, Analyzer};
    use crate::models::Domain;
    use crate::ocr::{Extraction, ExtractionError, ExtractionMethod, Extractor};

    /// Treats the stored file's bytes as its text.
    struct PassthroughExtractor;

    impl Extractor for PassthroughExtractor {
        fn extract(&self, path: &Path, _mime_type: &str) -> Result<Extraction, ExtractionError> {
            Ok(Extraction {
                text: std::fs::read_to_string(path)?,
                method: ExtractionMethod::PlainText,
                page_count: None,
            })
        }

        fn name(&self) -> &'static str {
            "passthrough"
        }
    }

    struct EchoAnalyzer;

    #[async_trait]
    impl Analyzer for EchoAnalyzer {
        async fn analyze(
            &self,
            text: &str,
            domain: Domain,
            _title: &str,
        ) -> Result<Analysis, AnalysisError> {
            Ok(Analysis {
                summary: format!("{} document of {} chars", domain, text.len()),
                analysis: "1. Document Overview".to_string(),
            })
        }
    }

    const BOUNDARY: &str = "docshelf-test-boundary";

    fn multipart_request(uri: &str, filename: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/plain\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = filename,
            c = content
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn setup_test_app() -> (axum::Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path().to_path_buf());
        settings.ensure_directories().unwrap();

        let registry = settings.open_registry().unwrap();
        let pipeline = Pipeline::new(
            Arc::new(PassthroughExtractor),
            Arc::new(EchoAnalyzer),
            settings.upload_store(),
        );
        let app = create_router(AppState::new(registry, pipeline));
        (app, dir)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_api_documents_empty() {
        let (app, _dir) = setup_test_app();
        let response = app.oneshot(get("/api/documents")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_api_upload_then_fetch() {
        let (app, _dir) = setup_test_app();

        let response = app
            .clone()
            .oneshot(multipart_request(
                "/api/documents",
                "invoice.txt",
                "Invoice 1001. Payment due in 30 days.",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["domain"], "Finance");
        assert_eq!(created["original_filename"], "invoice.txt");
        let id = created["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("invoice-"));

        let response = app
            .clone()
            .oneshot(get(&format!("/api/documents/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["summary"], "Finance document of 37 chars");

        let response = app.oneshot(get("/api/report")).await.unwrap();
        let report = body_json(response).await;
        assert_eq!(report["total"], 1);
        assert_eq!(report["by_domain"][0]["domain"], "Finance");
        assert_eq!(report["by_domain"][0]["count"], 1);
        assert_eq!(report["timeline"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_form_upload_redirects_to_detail() {
        let (app, _dir) = setup_test_app();

        let response = app
            .clone()
            .oneshot(multipart_request(
                "/upload",
                "notes.txt",
                "Lecture notes for the spring semester",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(location.starts_with("/documents/notes-"));

        let response = app.oneshot(get(&location)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Education"));
        assert!(html.contains("Lecture notes for the spring semester"));
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let (app, _dir) = setup_test_app();
        let response = app
            .oneshot(multipart_request("/api/documents", "empty.txt", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn test_blank_text_rejected() {
        let (app, _dir) = setup_test_app();
        let response = app
            .clone()
            .oneshot(multipart_request("/api/documents", "blank.txt", "   "))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app.oneshot(get("/api/documents")).await.unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_domain_filter() {
        let (app, _dir) = setup_test_app();
        for (name, text) in [
            ("a.txt", "Patient diagnosis and dosage"),
            ("b.txt", "Server architecture overview"),
        ] {
            let response = app
                .clone()
                .oneshot(multipart_request("/api/documents", name, text))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .clone()
            .oneshot(get("/api/documents?domain=medical"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["domain"], "Medical");

        let response = app
            .clone()
            .oneshot(get("/api/documents?domain=astrology"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app.oneshot(get("/documents?domain=technical")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("b.txt"));
        assert!(!html.contains("a.txt"));
    }

    #[tokio::test]
    async fn test_delete_document() {
        let (app, _dir) = setup_test_app();
        let response = app
            .clone()
            .oneshot(multipart_request(
                "/api/documents",
                "contract.txt",
                "This agreement is made between the parties",
            ))
            .await
            .unwrap();
        let id = body_json(response).await["id"]
            .as_str()
            .unwrap()
            .to_string();

        let delete = |uri: String| {
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(delete(format!("/api/documents/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(delete(format!("/api/documents/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_document_is_404() {
        let (app, _dir) = setup_test_app();
        let response = app
            .clone()
            .oneshot(get("/api/documents/missing"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get("/documents/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_file_rejects_traversal() {
        let (app, dir) = setup_test_app();
        std::fs::write(dir.path().join("secret.txt"), "secret").unwrap();

        let response = app
            .oneshot(get("/files/..%2Fsecret.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_report_page_and_css() {
        let (app, _dir) = setup_test_app();
        let response = app.clone().oneshot(get("/report")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("By domain"));
        assert!(html.contains("Nothing processed yet"));

        let response = app.oneshot(get("/static/style.css")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
    }

    #[tokio::test]
    async fn test_bind_listener_accepts_hostname() {
        let listener = bind_listener("localhost", 0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_bind_listener_accepts_ip() {
        let listener = bind_listener("127.0.0.1", 0).await.unwrap();
        assert_eq!(listener.local_addr().unwrap().ip().to_string(), "127.0.0.1");
    }
}
