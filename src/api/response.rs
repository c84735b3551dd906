use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::fhir::FHIR_JSON;

/// JSON body served as `application/fhir+json`
#[derive(Debug, Clone)]
pub struct Fhir<T>(pub T);

impl<T: Serialize> IntoResponse for Fhir<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => (
                [(header::CONTENT_TYPE, HeaderValue::from_static(FHIR_JSON))],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Weak ETag carrying a resource version, e.g. `W/"3"`
pub fn etag(version_id: i32) -> String {
    format!("W/\"{}\"", version_id)
}

/// Relative URL of a stored resource, used for `Location` and `fullUrl`
pub fn resource_url(resource_type: &str, id: impl std::fmt::Display) -> String {
    format!("/{}/{}", resource_type, id)
}
