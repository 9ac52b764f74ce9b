//! Health check endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "up",
            "version": env!("CARGO_PKG_VERSION"),
            "fhirVersion": state.config.fhir.version,
        })),
    )
}
