use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::repositories::HealthCheck;

/// Pings PostgreSQL with `SELECT 1`
pub struct PostgresHealthCheck {
    pool: PgPool,
}

impl PostgresHealthCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheck for PostgresHealthCheck {
    async fn is_healthy(&self) -> bool {
        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "Database health check failed");
                false
            }
        }
    }
}
