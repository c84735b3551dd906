// API layer module (HTTP adapter)
// Translates FHIR REST interactions into repository calls

pub mod errors;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

pub use errors::ApiError;
pub use router::router;
pub use state::AppState;
