use async_trait::async_trait;

/// Liveness probe for the backing store
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Returns true when the store answers a trivial query
    async fn is_healthy(&self) -> bool;
}
