// Repository ports
// Implemented by infrastructure adapters; the API layer only sees these traits

pub mod errors;
pub mod health;
pub mod observation_repository;
pub mod patient_repository;

pub use errors::RepositoryError;
pub use health::HealthCheck;
pub use observation_repository::ObservationRepository;
pub use patient_repository::PatientRepository;
