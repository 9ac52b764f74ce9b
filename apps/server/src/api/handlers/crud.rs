//! Generic resource CRUD handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use lumen_payload::FhirEncoding;
use serde_json::Value as JsonValue;

use crate::{
    models::{HistoryResult, ResourceOperation, UpdateParams},
    state::AppState,
    Error, Result,
};

use super::{content_type_header, version_etag};

/// POST /fhir/{resourceType}
pub async fn create_resource(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let resource = parse_json_body(&headers, &body)?;

    let result = state
        .crud_service
        .create_resource(&resource_type, resource)
        .await?;

    let location = format!(
        "/fhir/{}/{}/_history/{}",
        resource_type, result.resource.id, result.resource.version_id
    );

    Ok((
        StatusCode::CREATED,
        [
            (header::LOCATION, location),
            (header::ETAG, version_etag(result.resource.version_id)),
        ],
        Json(result.resource.resource),
    )
        .into_response())
}

/// GET /fhir/{resourceType}/{id}
pub async fn read_resource(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
) -> Result<Response> {
    let resource = state.crud_service.read_resource(&resource_type, &id).await?;

    Ok((
        StatusCode::OK,
        [(header::ETAG, version_etag(resource.version_id))],
        Json(resource.resource),
    )
        .into_response())
}

/// PUT /fhir/{resourceType}/{id}
pub async fn update_resource(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let resource = parse_json_body(&headers, &body)?;
    let params = UpdateParams {
        if_match: parse_if_match(&headers)?,
    };

    let result = state
        .crud_service
        .update_resource(&resource_type, &id, resource, Some(params))
        .await?;

    let status = match result.operation {
        ResourceOperation::Created => StatusCode::CREATED,
        ResourceOperation::Updated => StatusCode::OK,
    };

    Ok((
        status,
        [(header::ETAG, version_etag(result.resource.version_id))],
        Json(result.resource.resource),
    )
        .into_response())
}

/// DELETE /fhir/{resourceType}/{id}
pub async fn delete_resource(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
) -> Result<Response> {
    let version = state
        .crud_service
        .delete_resource(&resource_type, &id)
        .await?;

    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Some(version_id) = version {
        if let Ok(value) = version_etag(version_id).parse() {
            response.headers_mut().insert(header::ETAG, value);
        }
    }
    Ok(response)
}

/// GET /fhir/{resourceType}/{id}/_history/{versionId}
pub async fn vread_resource(
    State(state): State<AppState>,
    Path((resource_type, id, version_id)): Path<(String, String, i32)>,
) -> Result<Response> {
    let resource = state
        .crud_service
        .vread_resource(&resource_type, &id, version_id)
        .await?;

    Ok((
        StatusCode::OK,
        [(header::ETAG, version_etag(resource.version_id))],
        Json(resource.resource),
    )
        .into_response())
}

/// GET /fhir/{resourceType}/{id}/_history
pub async fn resource_history(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
) -> Result<Response> {
    let history = state
        .crud_service
        .resource_history(&resource_type, &id)
        .await?;

    Ok((StatusCode::OK, Json(history_bundle(&resource_type, history))).into_response())
}

/// Render a history Bundle, newest version first.
fn history_bundle(resource_type: &str, history: HistoryResult) -> JsonValue {
    let entries: Vec<JsonValue> = history
        .entries
        .iter()
        .map(|entry| {
            let url = match entry.method {
                crate::models::HistoryMethod::Post => resource_type.to_string(),
                _ => format!("{}/{}", resource_type, entry.resource.id),
            };
            serde_json::json!({
                "fullUrl": format!("{}/{}", resource_type, entry.resource.id),
                "resource": entry.resource.resource,
                "request": {
                    "method": entry.method.as_str(),
                    "url": url,
                }
            })
        })
        .collect();

    serde_json::json!({
        "resourceType": "Bundle",
        "type": "history",
        "total": history.total,
        "entry": entries,
    })
}

/// Parse a FHIR JSON request body, rejecting non-JSON content types.
fn parse_json_body(headers: &HeaderMap, body: &[u8]) -> Result<JsonValue> {
    if let Some(content_type) = content_type_header(headers) {
        if FhirEncoding::detect(&content_type) != Some(FhirEncoding::Json) {
            return Err(Error::UnsupportedMediaType(format!(
                "expected a FHIR JSON content type, got '{}'",
                content_type
            )));
        }
    }

    serde_json::from_slice(body).map_err(|e| Error::InvalidResource(e.to_string()))
}

/// Parse `If-Match: W/"<version>"` (or a bare quoted version).
fn parse_if_match(headers: &HeaderMap) -> Result<Option<i32>> {
    let Some(raw) = headers.get(header::IF_MATCH) else {
        return Ok(None);
    };

    let value = raw
        .to_str()
        .map_err(|_| Error::Validation("Invalid If-Match header".to_string()))?;

    let version = value
        .trim()
        .trim_start_matches("W/")
        .trim_matches('"')
        .parse::<i32>()
        .map_err(|_| Error::Validation(format!("Invalid If-Match header: '{}'", value)))?;

    Ok(Some(version))
}
