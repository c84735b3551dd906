// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

mod filters;
pub mod postgres_health_check;
pub mod postgres_observation_repository;
pub mod postgres_patient_repository;

pub use postgres_health_check::PostgresHealthCheck;
pub use postgres_observation_repository::PostgresObservationRepository;
pub use postgres_patient_repository::PostgresPatientRepository;
