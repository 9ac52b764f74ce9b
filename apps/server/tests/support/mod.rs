//! Shared helpers for integration tests: an in-process app driven through
//! the router, no TCP listener needed.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use lumen::api::create_router;
use lumen::config::Config;
use lumen::services::BinaryCreateHandler;
use lumen::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_binary_handler(None)
    }

    /// Build an app with a custom Binary creation handler (used to capture
    /// the decoded payload instead of storing it).
    pub fn with_binary_handler(handler: Option<Arc<dyn BinaryCreateHandler>>) -> Self {
        let state = AppState::new_with_binary_handler(Config::test_defaults(), handler)
            .expect("test app state");
        let router = create_router(state.clone());
        Self { state, router }
    }

    /// Send a request with a FHIR JSON body (content type set automatically).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Vec<u8>)> {
        let content_type = body.as_ref().map(|_| "application/fhir+json");
        self.request_raw(method, uri, body, content_type, &[]).await
    }

    /// Send a request with full control over body, content type and headers.
    /// `content_type: None` sends no Content-Type header at all.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Vec<u8>)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }

        let request = builder.body(Body::from(body.unwrap_or_default()))?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

        Ok((status, headers, bytes.to_vec()))
    }
}

pub async fn with_test_app<F>(f: F) -> anyhow::Result<()>
where
    F: for<'a> FnOnce(&'a TestApp) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + 'a>>,
{
    let app = TestApp::new();
    f(&app).await
}

pub fn to_json_body(value: &Value) -> anyhow::Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub fn parse_json(body: &[u8]) -> anyhow::Result<Value> {
    Ok(serde_json::from_slice(body)?)
}

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "unexpected status for {context}");
}

pub fn minimal_patient() -> Value {
    serde_json::json!({
        "resourceType": "Patient",
        "name": [{"family": "FAMILY", "given": ["GIVEN1", "GIVEN2"]}]
    })
}

pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
