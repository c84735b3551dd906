use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::filters::{begin_snapshot, push_date_filter, push_page};
use crate::domain::datatypes::{Address, ContactPoint, HumanName};
use crate::domain::patient::{Gender, Patient};
use crate::domain::repositories::errors::RepositoryResult;
use crate::domain::repositories::{PatientRepository, RepositoryError};
use crate::domain::search::{escape_like, PatientSearch, SearchResult};
use crate::infrastructure::retry::{is_unique_violation, with_retry, RetryPolicy};

/// PostgreSQL implementation of PatientRepository
///
/// Complex datatypes live in JSONB columns; scalar search fields
/// (`gender`, `birth_date`) have their own indexed columns.
pub struct PostgresPatientRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresPatientRepository {
    /// Creates a new PostgresPatientRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    /// * `retry` - Policy applied to transient connection failures
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

#[derive(sqlx::FromRow)]
struct PatientRow {
    id: Uuid,
    active: bool,
    gender: Option<Gender>,
    birth_date: Option<NaiveDate>,
    name: Json<Vec<HumanName>>,
    telecom: Json<Vec<ContactPoint>>,
    address: Json<Vec<Address>>,
    version_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PatientRow> for Patient {
    fn from(r: PatientRow) -> Self {
        Patient::from_persistence(
            r.id,
            r.active,
            r.gender,
            r.birth_date,
            r.name.0,
            r.telecom.0,
            r.address.0,
            r.version_id,
            r.created_at,
            r.updated_at,
        )
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, search: &PatientSearch) {
    qb.push(" WHERE TRUE");

    if let Some(family) = &search.family {
        qb.push(
            " AND EXISTS (SELECT 1 FROM jsonb_array_elements(name) AS n \
             WHERE n->>'family' ILIKE ",
        )
        .push_bind(format!("{}%", escape_like(family)))
        .push(")");
    }

    if let Some(given) = &search.given {
        qb.push(
            " AND EXISTS (SELECT 1 FROM jsonb_array_elements(name) AS n, \
             jsonb_array_elements_text(COALESCE(n->'given', '[]'::jsonb)) AS g \
             WHERE g ILIKE ",
        )
        .push_bind(format!("{}%", escape_like(given)))
        .push(")");
    }

    if let Some(gender) = search.gender {
        qb.push(" AND gender = ").push_bind(gender);
    }

    if let Some(birthdate) = &search.birthdate {
        push_date_filter(qb, "(birth_date::timestamp AT TIME ZONE 'UTC')", birthdate);
    }
}

#[async_trait]
impl PatientRepository for PostgresPatientRepository {
    async fn create(&self, patient: &Patient) -> RepositoryResult<Patient> {
        let pool = &self.pool;
        let row = with_retry(&self.retry, "patient.create", || async move {
            sqlx::query_as::<_, PatientRow>(
                r#"
                INSERT INTO patients (
                    id, active, gender, birth_date, name, telecom, address,
                    version_id, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING
                    id, active, gender, birth_date, name, telecom, address,
                    version_id, created_at, updated_at
                "#,
            )
            .bind(patient.id())
            .bind(patient.active())
            .bind(patient.gender())
            .bind(patient.birth_date())
            .bind(Json(patient.name()))
            .bind(Json(patient.telecom()))
            .bind(Json(patient.address()))
            .bind(patient.version_id())
            .bind(patient.created_at())
            .bind(patient.updated_at())
            .fetch_one(pool)
            .await
        })
        .await;

        match row {
            Ok(row) => Ok(row.into()),
            // A retried insert found the row its first attempt committed
            Err(e) if is_unique_violation(&e) => self
                .find_by_id(patient.id())
                .await?
                .ok_or(RepositoryError::Database(e)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Patient>> {
        let pool = &self.pool;
        let row = with_retry(&self.retry, "patient.find_by_id", || async move {
            sqlx::query_as::<_, PatientRow>(
                r#"
                SELECT
                    id, active, gender, birth_date, name, telecom, address,
                    version_id, created_at, updated_at
                FROM patients
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(pool)
            .await
        })
        .await?;

        Ok(row.map(Patient::from))
    }

    async fn update(&self, patient: &Patient) -> RepositoryResult<Patient> {
        let pool = &self.pool;
        let row = with_retry(&self.retry, "patient.update", || async move {
            sqlx::query_as::<_, PatientRow>(
                r#"
                UPDATE patients SET
                    active = $2,
                    gender = $3,
                    birth_date = $4,
                    name = $5,
                    telecom = $6,
                    address = $7,
                    version_id = version_id + 1,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING
                    id, active, gender, birth_date, name, telecom, address,
                    version_id, created_at, updated_at
                "#,
            )
            .bind(patient.id())
            .bind(patient.active())
            .bind(patient.gender())
            .bind(patient.birth_date())
            .bind(Json(patient.name()))
            .bind(Json(patient.telecom()))
            .bind(Json(patient.address()))
            .fetch_optional(pool)
            .await
        })
        .await?;

        row.map(Patient::from).ok_or(RepositoryError::NotFound {
            resource_type: Patient::RESOURCE_TYPE,
            id: patient.id(),
        })
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let pool = &self.pool;
        let result = with_retry(&self.retry, "patient.delete", || async move {
            sqlx::query("DELETE FROM patients WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
        })
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, search: &PatientSearch) -> RepositoryResult<SearchResult<Patient>> {
        let pool = &self.pool;

        let (total, rows) = with_retry(&self.retry, "patient.search", || async move {
            let mut tx = begin_snapshot(pool).await?;

            let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM patients");
            push_filters(&mut qb, search);
            let total = qb.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;

            let mut rows = Vec::new();
            if total > 0 && search.page.count > 0 {
                let mut qb = QueryBuilder::<Postgres>::new(
                    "SELECT id, active, gender, birth_date, name, telecom, address, \
                     version_id, created_at, updated_at FROM patients",
                );
                push_filters(&mut qb, search);
                push_page(&mut qb, search.page.count, search.page.offset);
                rows = qb.build_query_as::<PatientRow>().fetch_all(&mut *tx).await?;
            }

            tx.commit().await?;
            Ok::<_, sqlx::Error>((total, rows))
        })
        .await?;

        Ok(SearchResult {
            total,
            items: rows.into_iter().map(Patient::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::DateParam;

    #[test]
    fn no_criteria_matches_everything() {
        let search = PatientSearch::default();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM patients");
        push_filters(&mut qb, &search);

        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM patients WHERE TRUE");
    }

    #[test]
    fn every_criterion_adds_a_bound_clause() {
        let search = PatientSearch {
            family: Some("Cha".to_string()),
            given: Some("Pe".to_string()),
            gender: Some(Gender::Male),
            birthdate: Some(DateParam::parse("birthdate", "ge1970").unwrap()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM patients");
        push_filters(&mut qb, &search);
        let sql = qb.sql();

        assert!(sql.contains("n->>'family' ILIKE $1"));
        assert!(sql.contains("g ILIKE $2"));
        assert!(sql.contains("gender = $3"));
        assert!(sql.ends_with("(birth_date::timestamp AT TIME ZONE 'UTC') >= $4"));
    }
}
