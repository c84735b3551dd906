use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::response::Fhir;
use crate::api::state::AppState;
use crate::fhir::capability::capability_statement;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Redirect the base URL to the capability statement
///
/// GET /
pub async fn root() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/metadata")])
}

/// Describe what this server supports
///
/// GET /metadata
pub async fn capability() -> Fhir<Value> {
    Fhir(capability_statement())
}

/// Report whether the database is reachable
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Fhir<HealthResponse>) {
    if state.health.is_healthy().await {
        (StatusCode::OK, Fhir(HealthResponse { status: "ok" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Fhir(HealthResponse { status: "degraded" }),
        )
    }
}

/// Fallback for unrouted paths
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

/// Fallback for routed paths hit with an unsupported method
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::method_not_allowed(format!("{} is not supported on {}", method, uri.path()))
}
