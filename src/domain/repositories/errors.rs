use thiserror::Error;
use uuid::Uuid;

/// Errors returned by repository implementations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{resource_type}/{id} not found")]
    NotFound {
        resource_type: &'static str,
        id: Uuid,
    },

    #[error("Referenced resource does not exist: {0}")]
    InvalidReference(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
