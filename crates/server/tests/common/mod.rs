//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock transcoder and probe injected, so the whole API can be
//! exercised without ffmpeg installed.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use shareclip_core::metadata::ProbedStream;
use shareclip_core::testing::{MockProbe, MockTranscoder};
use shareclip_core::{
    Config, ConversionEngine, EstimateCache, FormatMap, GifEngine, SessionOrchestrator,
    WebmEngine,
};
use shareclip_server::state::AppState;

/// Re-export fixtures for test convenience
pub use shareclip_core::testing::fixtures;

const BOUNDARY: &str = "shareclip-test-boundary";

/// Test fixture with an in-process router.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_analyze() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture
///         .post_upload("/api/v1/analyze", &fixtures::sample_resource(), &[])
///         .await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared application state
    pub state: Arc<AppState>,
    /// Mock transcoder - inspect execs and inject failures
    pub transcoder: Arc<MockTranscoder>,
    /// Scratch directory for probe files
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Stream reported by the mock probe
    pub stream: Option<ProbedStream>,
    /// Make the mock probe fail with this reason
    pub probe_failure: Option<String>,
    /// Fixed WebM deadline
    pub webm_timeout: Option<Duration>,
    /// How long finished sessions are kept
    pub retention_secs: Option<u64>,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = Config::default();
        config.transcoder.work_dir = temp_dir.path().to_path_buf();
        if let Some(retention) = test_config.retention_secs {
            config.session.retention_secs = retention;
        }

        let transcoder = Arc::new(MockTranscoder::new());
        let probe = Arc::new(match test_config.probe_failure {
            Some(reason) => MockProbe::failing(reason),
            None => MockProbe::returning(
                test_config.stream.unwrap_or_else(fixtures::sample_stream),
            ),
        });

        let engines: FormatMap<Arc<dyn ConversionEngine>> = FormatMap::new(
            Arc::new(GifEngine::new(transcoder.clone())),
            Arc::new(WebmEngine::new(transcoder.clone())),
        );
        let mut orchestrator = SessionOrchestrator::new(
            engines,
            config.session.clone(),
            Arc::new(EstimateCache::new()),
        );
        if let Some(timeout) = test_config.webm_timeout {
            orchestrator = orchestrator.with_timeout_override(timeout);
        }

        let state = Arc::new(AppState::with_orchestrator(config, orchestrator, probe));
        let router = shareclip_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            transcoder,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a multipart upload with a `file` part and extra text fields.
    pub async fn post_upload(
        &self,
        path: &str,
        file: &shareclip_core::FileResource,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file.name, file.mime_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file.bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// Poll a session until it leaves the running phase.
    pub async fn wait_for_session(&self, id: &str) -> TestResponse {
        for _ in 0..200 {
            let response = self.get(&format!("/api/v1/sessions/{}", id)).await;
            if response.body["phase"] != "running" {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Session {} did not finish in time", id);
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}
