use axum::{
    http::header::{ETAG, LOCATION},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{metadata, observations, patients};
use crate::api::state::AppState;

/// Builds the application router
///
/// Collection routes are also mounted with a trailing slash, which some
/// clients append. Unrouted paths and unsupported methods both answer with
/// an OperationOutcome.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([LOCATION, ETAG]);

    Router::new()
        .route(
            "/",
            get(metadata::root).fallback(metadata::method_not_allowed),
        )
        .route(
            "/metadata",
            get(metadata::capability).fallback(metadata::method_not_allowed),
        )
        .route(
            "/health",
            get(metadata::health_check).fallback(metadata::method_not_allowed),
        )
        // Patient
        .route(
            "/Patient",
            get(patients::search_patients)
                .post(patients::create_patient)
                .fallback(metadata::method_not_allowed),
        )
        .route(
            "/Patient/",
            get(patients::search_patients)
                .post(patients::create_patient)
                .fallback(metadata::method_not_allowed),
        )
        .route(
            "/Patient/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient)
                .fallback(metadata::method_not_allowed),
        )
        // Observation
        .route(
            "/Observation",
            get(observations::search_observations)
                .post(observations::create_observation)
                .fallback(metadata::method_not_allowed),
        )
        .route(
            "/Observation/",
            get(observations::search_observations)
                .post(observations::create_observation)
                .fallback(metadata::method_not_allowed),
        )
        .route(
            "/Observation/:id",
            get(observations::get_observation)
                .put(observations::update_observation)
                .delete(observations::delete_observation)
                .fallback(metadata::method_not_allowed),
        )
        .fallback(metadata::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
