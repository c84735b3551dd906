pub mod metadata;
pub mod observations;
pub mod patients;

use uuid::Uuid;

use crate::api::errors::ApiError;

/// Parses a resource id from the path
///
/// Ids that are not UUIDs can never name a stored resource, so they are
/// reported as not found.
pub(crate) fn parse_id(resource_type: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::not_found(format!("{}/{} not found", resource_type, raw)))
}

/// Drops empty query values such as `?family=`
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn non_uuid_ids_are_not_found() {
        let error = parse_id("Patient", "123").unwrap_err();
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.message, "Patient/123 not found");
    }

    #[test]
    fn empty_values_are_dropped() {
        assert_eq!(non_empty(Some(" ".to_string())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
    }
}
