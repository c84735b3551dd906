// Domain layer module exports
// Domain is independent of HTTP and database concerns

pub mod datatypes;
pub mod dates;
pub mod errors;
pub mod observation;
pub mod patient;
pub mod repositories;
pub mod search;

pub use errors::{DomainError, DomainResult};
