use thiserror::Error;

/// Errors raised while validating or mutating domain aggregates
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Resource type must be {expected}, got '{found}'")]
    WrongResourceType {
        expected: &'static str,
        found: String,
    },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Resource id '{body}' does not match request id '{path}'")]
    IdMismatch { path: String, body: String },

    #[error("Invalid reference '{0}': expected Patient/<id>")]
    InvalidReference(String),

    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("Invalid search parameter {name}: {reason}")]
    InvalidSearchParam { name: &'static str, reason: String },
}

pub type DomainResult<T> = Result<T, DomainError>;
