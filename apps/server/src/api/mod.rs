//! HTTP API: router assembly and request handlers.

pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    routing::post,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::handlers::{binary, crud, health};
use crate::state::AppState;

/// Build the application router.
///
/// The static `/fhir/Binary` routes take precedence over the generic
/// `/:resource_type` routes, so Binary POST bodies get payload
/// classification instead of plain JSON parsing.
pub fn create_router(state: AppState) -> Router {
    let fhir_routes = Router::new()
        .route("/Binary", post(binary::create_binary))
        .route("/Binary/:id", get(binary::read_binary))
        .route("/:resource_type", post(crud::create_resource))
        .route(
            "/:resource_type/:id",
            get(crud::read_resource)
                .put(crud::update_resource)
                .delete(crud::delete_resource),
        )
        .route("/:resource_type/:id/_history", get(crud::resource_history))
        .route(
            "/:resource_type/:id/_history/:version_id",
            get(crud::vread_resource),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/fhir", fhir_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state))
        .layer(DefaultBodyLimit::max(state.config.server.max_request_body_size))
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors_origins;

    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
}
