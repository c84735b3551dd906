use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::response::Fhir;
use crate::domain::errors::DomainError;
use crate::domain::repositories::RepositoryError;
use crate::fhir::{IssueType, OperationOutcome};

/// API error type rendered as a FHIR OperationOutcome
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: IssueType,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, code: IssueType, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error for malformed input
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, IssueType::Invalid, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, IssueType::NotFound, message)
    }

    /// Creates a 405 Method Not Allowed error
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            IssueType::NotSupported,
            message,
        )
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            IssueType::Exception,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let outcome = OperationOutcome::error(self.code, self.message);
        (self.status, Fhir(outcome)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound { .. } => Self::not_found(error.to_string()),
            RepositoryError::InvalidReference(_) => Self::new(
                StatusCode::BAD_REQUEST,
                IssueType::Processing,
                error.to_string(),
            ),
            RepositoryError::Database(e) => {
                tracing::error!(error = %e, "Database operation failed");
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn domain_errors_are_bad_requests() {
        let error = ApiError::from(DomainError::MissingField("Patient.name"));
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.code, IssueType::Invalid);
        assert_eq!(error.message, "Patient.name is required");
    }

    #[test]
    fn repository_not_found_is_404() {
        let id = Uuid::new_v4();
        let error = ApiError::from(RepositoryError::NotFound {
            resource_type: "Patient",
            id,
        });
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.message, format!("Patient/{} not found", id));
    }

    #[test]
    fn invalid_reference_is_processing_error() {
        let error = ApiError::from(RepositoryError::InvalidReference("Patient/x".to_string()));
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.code, IssueType::Processing);
    }

    #[test]
    fn database_errors_hide_details() {
        let error = ApiError::from(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Internal server error");
    }
}
