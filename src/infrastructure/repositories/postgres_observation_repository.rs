use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::filters::{begin_snapshot, push_date_filter, push_page};
use crate::domain::datatypes::{CodeableConcept, Quantity, ReferenceRange};
use crate::domain::observation::{Observation, ObservationStatus};
use crate::domain::repositories::errors::RepositoryResult;
use crate::domain::repositories::{ObservationRepository, RepositoryError};
use crate::domain::search::{ObservationSearch, SearchResult};
use crate::infrastructure::retry::{is_unique_violation, with_retry, RetryPolicy};

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL implementation of ObservationRepository
///
/// `subject_id` is a foreign key to `patients` with cascading delete.
pub struct PostgresObservationRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresObservationRepository {
    /// Creates a new PostgresObservationRepository
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

#[derive(sqlx::FromRow)]
struct ObservationRow {
    id: Uuid,
    status: ObservationStatus,
    category: Json<Vec<CodeableConcept>>,
    code: Json<CodeableConcept>,
    subject_id: Uuid,
    effective_at: Option<DateTime<Utc>>,
    value_quantity: Option<Json<Quantity>>,
    reference_range: Json<Vec<ReferenceRange>>,
    version_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ObservationRow> for Observation {
    fn from(r: ObservationRow) -> Self {
        Observation::from_persistence(
            r.id,
            r.status,
            r.category.0,
            r.code.0,
            r.subject_id,
            r.effective_at,
            r.value_quantity.map(|q| q.0),
            r.reference_range.0,
            r.version_id,
            r.created_at,
            r.updated_at,
        )
    }
}

/// Turns a foreign key violation on `subject_id` into `InvalidReference`
fn map_write_error(error: sqlx::Error, observation: &Observation) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            RepositoryError::InvalidReference(observation.subject_reference())
        }
        _ => RepositoryError::Database(error),
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, search: &ObservationSearch) {
    qb.push(" WHERE TRUE");

    if let Some(patient) = search.patient {
        qb.push(" AND subject_id = ").push_bind(patient);
    }

    if let Some(category) = &search.category {
        qb.push(" AND category @> ")
            .push_bind(Json(json!([category.containment()])));
    }

    if let Some(code) = &search.code {
        qb.push(" AND code @> ").push_bind(Json(code.containment()));
    }

    if let Some(date) = &search.date {
        push_date_filter(qb, "effective_at", date);
    }
}

#[async_trait]
impl ObservationRepository for PostgresObservationRepository {
    async fn create(&self, observation: &Observation) -> RepositoryResult<Observation> {
        let pool = &self.pool;
        let row = with_retry(&self.retry, "observation.create", || async move {
            sqlx::query_as::<_, ObservationRow>(
                r#"
                INSERT INTO observations (
                    id, status, category, code, subject_id, effective_at,
                    value_quantity, reference_range, version_id, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING
                    id, status, category, code, subject_id, effective_at,
                    value_quantity, reference_range, version_id, created_at, updated_at
                "#,
            )
            .bind(observation.id())
            .bind(observation.status())
            .bind(Json(observation.category()))
            .bind(Json(observation.code()))
            .bind(observation.subject_id())
            .bind(observation.effective_at())
            .bind(observation.value_quantity().map(Json))
            .bind(Json(observation.reference_range()))
            .bind(observation.version_id())
            .bind(observation.created_at())
            .bind(observation.updated_at())
            .fetch_one(pool)
            .await
        })
        .await;

        match row {
            Ok(row) => Ok(row.into()),
            // A retried insert found the row its first attempt committed
            Err(e) if is_unique_violation(&e) => self
                .find_by_id(observation.id())
                .await?
                .ok_or(RepositoryError::Database(e)),
            Err(e) => Err(map_write_error(e, observation)),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Observation>> {
        let pool = &self.pool;
        let row = with_retry(&self.retry, "observation.find_by_id", || async move {
            sqlx::query_as::<_, ObservationRow>(
                r#"
                SELECT
                    id, status, category, code, subject_id, effective_at,
                    value_quantity, reference_range, version_id, created_at, updated_at
                FROM observations
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(pool)
            .await
        })
        .await?;

        Ok(row.map(Observation::from))
    }

    async fn update(&self, observation: &Observation) -> RepositoryResult<Observation> {
        let pool = &self.pool;
        let row = with_retry(&self.retry, "observation.update", || async move {
            sqlx::query_as::<_, ObservationRow>(
                r#"
                UPDATE observations SET
                    status = $2,
                    category = $3,
                    code = $4,
                    subject_id = $5,
                    effective_at = $6,
                    value_quantity = $7,
                    reference_range = $8,
                    version_id = version_id + 1,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING
                    id, status, category, code, subject_id, effective_at,
                    value_quantity, reference_range, version_id, created_at, updated_at
                "#,
            )
            .bind(observation.id())
            .bind(observation.status())
            .bind(Json(observation.category()))
            .bind(Json(observation.code()))
            .bind(observation.subject_id())
            .bind(observation.effective_at())
            .bind(observation.value_quantity().map(Json))
            .bind(Json(observation.reference_range()))
            .fetch_optional(pool)
            .await
        })
        .await
        .map_err(|e| map_write_error(e, observation))?;

        row.map(Observation::from).ok_or(RepositoryError::NotFound {
            resource_type: Observation::RESOURCE_TYPE,
            id: observation.id(),
        })
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let pool = &self.pool;
        let result = with_retry(&self.retry, "observation.delete", || async move {
            sqlx::query("DELETE FROM observations WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
        })
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(
        &self,
        search: &ObservationSearch,
    ) -> RepositoryResult<SearchResult<Observation>> {
        let pool = &self.pool;

        let (total, rows) = with_retry(&self.retry, "observation.search", || async move {
            let mut tx = begin_snapshot(pool).await?;

            let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM observations");
            push_filters(&mut qb, search);
            let total = qb.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;

            let mut rows = Vec::new();
            if total > 0 && search.page.count > 0 {
                let mut qb = QueryBuilder::<Postgres>::new(
                    "SELECT id, status, category, code, subject_id, effective_at, \
                     value_quantity, reference_range, version_id, created_at, updated_at \
                     FROM observations",
                );
                push_filters(&mut qb, search);
                push_page(&mut qb, search.page.count, search.page.offset);
                rows = qb
                    .build_query_as::<ObservationRow>()
                    .fetch_all(&mut *tx)
                    .await?;
            }

            tx.commit().await?;
            Ok::<_, sqlx::Error>((total, rows))
        })
        .await?;

        Ok(SearchResult {
            total,
            items: rows.into_iter().map(Observation::from).collect(),
        })
    }
}
