//! The `/fhir/Binary` endpoint.
//!
//! Create accepts three body shapes behind one handler: opaque bytes tagged
//! with an arbitrary content type, a FHIR-JSON `Binary`, or a FHIR-XML
//! `Binary`. Classification happens in `lumen-payload`; this handler only
//! threads headers and bytes through and renders the acknowledgment.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lumen_payload::FhirEncoding;

use crate::{state::AppState, Error, Result};

use super::{content_type_header, version_etag};

/// POST /fhir/Binary
pub async fn create_binary(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let content_type = content_type_header(&headers);

    let outcome = state.binary_service.create(body, content_type).await?;

    let location = format!("/fhir/{}", outcome.located());
    let ack = serde_json::json!({
        "resourceType": "OperationOutcome",
        "issue": [{
            "severity": "information",
            "code": "informational",
            "diagnostics": format!("Created {}", outcome.located()),
        }]
    });

    Ok((
        StatusCode::CREATED,
        [
            (header::LOCATION, location),
            (header::ETAG, version_etag(outcome.version_id)),
        ],
        Json(ack),
    )
        .into_response())
}

/// GET /fhir/Binary/{id}
///
/// Default is the native form: the stored bytes under the stored content
/// type. A FHIR JSON `Accept` header yields the resource form instead.
pub async fn read_binary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let resource = state.crud_service.read_resource("Binary", &id).await?;

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if FhirEncoding::detect(accept) == Some(FhirEncoding::Json) {
        return Ok((
            StatusCode::OK,
            [(header::ETAG, version_etag(resource.version_id))],
            Json(resource.resource),
        )
            .into_response());
    }

    let content = match resource.resource.get("data").and_then(|d| d.as_str()) {
        Some(encoded) => STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| Error::Internal(format!("stored Binary.data is not base64: {e}")))?,
        None => Vec::new(),
    };
    let content_type = resource
        .resource
        .get("contentType")
        .and_then(|ct| ct.as_str())
        .unwrap_or("application/octet-stream")
        .to_string();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::ETAG, version_etag(resource.version_id)),
        ],
        content,
    )
        .into_response())
}
