use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::patient::Patient;
use crate::domain::search::{PatientSearch, SearchResult};

/// Repository trait for the Patient aggregate
///
/// Implementations own `version_id` and `updated_at`: the values returned
/// from `update` are authoritative, the ones on the argument are not.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Insert a new patient and return it as stored
    async fn create(&self, patient: &Patient) -> RepositoryResult<Patient>;

    /// Find a patient by its ID
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Patient>>;

    /// Overwrite an existing patient, bumping its version
    ///
    /// Fails with `NotFound` when the patient no longer exists.
    async fn update(&self, patient: &Patient) -> RepositoryResult<Patient>;

    /// Delete a patient and, by cascade, its observations
    ///
    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;

    /// Run a search, returning one page plus the total match count
    async fn search(&self, search: &PatientSearch) -> RepositoryResult<SearchResult<Patient>>;
}
