use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::observation::Observation;
use crate::domain::search::{ObservationSearch, SearchResult};

/// Repository trait for the Observation aggregate
///
/// Writes whose subject names a missing patient fail with
/// `InvalidReference`.
#[async_trait]
pub trait ObservationRepository: Send + Sync {
    /// Insert a new observation and return it as stored
    async fn create(&self, observation: &Observation) -> RepositoryResult<Observation>;

    /// Find an observation by its ID
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Observation>>;

    /// Overwrite an existing observation, bumping its version
    async fn update(&self, observation: &Observation) -> RepositoryResult<Observation>;

    /// Delete an observation; returns whether a row was removed
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;

    /// Run a search, returning one page plus the total match count
    async fn search(
        &self,
        search: &ObservationSearch,
    ) -> RepositoryResult<SearchResult<Observation>>;
}
