//! Request handlers

pub mod binary;
pub mod crud;
pub mod health;

use axum::http::{header, HeaderMap};

/// Weak ETag for a resource version, per FHIR REST conventions.
pub(crate) fn version_etag(version_id: i32) -> String {
    format!("W/\"{}\"", version_id)
}

/// The declared content type, if the header is present and readable.
pub(crate) fn content_type_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
