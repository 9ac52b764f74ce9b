//! Server error type and its HTTP mapping.
//!
//! Every error surfaces to the client as a FHIR OperationOutcome with an
//! appropriate status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{resource_type}/{id} not found")]
    ResourceNotFound { resource_type: String, id: String },

    #[error("{resource_type}/{id}/_history/{version_id} not found")]
    VersionNotFound {
        resource_type: String,
        id: String,
        version_id: i32,
    },

    #[error("{resource_type}/{id} has been deleted")]
    ResourceDeleted {
        resource_type: String,
        id: String,
        version_id: Option<i32>,
    },

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("invalid request payload: {0}")]
    InvalidPayload(#[from] lumen_payload::PayloadError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: i32, actual: i32 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::ResourceNotFound { .. } | Error::VersionNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Error::ResourceDeleted { .. } => StatusCode::GONE,
            Error::InvalidResource(_) | Error::InvalidPayload(_) | Error::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::VersionConflict { .. } => StatusCode::CONFLICT,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// FHIR issue code for the OperationOutcome body.
    fn issue_code(&self) -> &'static str {
        match self {
            Error::ResourceNotFound { .. } | Error::VersionNotFound { .. } => "not-found",
            Error::ResourceDeleted { .. } => "deleted",
            Error::InvalidResource(_) | Error::InvalidPayload(_) => "invalid",
            Error::Validation(_) => "invariant",
            Error::UnsupportedMediaType(_) => "not-supported",
            Error::MethodNotAllowed(_) => "not-supported",
            Error::VersionConflict { .. } => "conflict",
            Error::Internal(_) => "exception",
        }
    }

    /// Render as a FHIR OperationOutcome resource.
    pub fn to_operation_outcome(&self) -> serde_json::Value {
        serde_json::json!({
            "resourceType": "OperationOutcome",
            "issue": [{
                "severity": "error",
                "code": self.issue_code(),
                "diagnostics": self.to_string(),
            }]
        })
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (status, Json(self.to_operation_outcome())).into_response()
    }
}
