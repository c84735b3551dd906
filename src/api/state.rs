use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::repositories::{HealthCheck, ObservationRepository, PatientRepository};
use crate::domain::search::PageLimits;
use crate::infrastructure::repositories::{
    PostgresHealthCheck, PostgresObservationRepository, PostgresPatientRepository,
};
use crate::infrastructure::retry::RetryPolicy;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub patients: Arc<dyn PatientRepository>,
    pub observations: Arc<dyn ObservationRepository>,
    pub health: Arc<dyn HealthCheck>,
    pub page_limits: PageLimits,
}

impl AppState {
    /// Wires the PostgreSQL adapters around one pool
    pub fn postgres(pool: PgPool, retry: RetryPolicy, page_limits: PageLimits) -> Self {
        Self {
            patients: Arc::new(PostgresPatientRepository::new(pool.clone(), retry)),
            observations: Arc::new(PostgresObservationRepository::new(pool.clone(), retry)),
            health: Arc::new(PostgresHealthCheck::new(pool)),
            page_limits,
        }
    }
}
