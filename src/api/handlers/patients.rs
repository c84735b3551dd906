use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::{non_empty, parse_id};
use crate::api::errors::ApiError;
use crate::api::response::{etag, resource_url, Fhir};
use crate::api::state::AppState;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::patient::{Gender, Patient};
use crate::domain::search::{DateParam, Page, PageLimits, PatientSearch};
use crate::fhir::{Bundle, BundleEntry, PatientResource};

/// Query string accepted by `GET /Patient`
#[derive(Debug, Default, Deserialize)]
pub struct PatientSearchParams {
    pub family: Option<String>,
    pub given: Option<String>,
    pub gender: Option<String>,
    #[serde(alias = "birth_date")]
    pub birthdate: Option<String>,
    #[serde(rename = "_count", alias = "count")]
    pub count: Option<i64>,
    #[serde(rename = "_offset", alias = "offset")]
    pub offset: Option<i64>,
}

impl PatientSearchParams {
    /// Validates the raw parameters into search criteria
    pub fn into_search(self, limits: &PageLimits) -> DomainResult<PatientSearch> {
        let gender = match non_empty(self.gender) {
            None => None,
            Some(code) => Some(Gender::parse(&code).ok_or_else(|| {
                DomainError::InvalidSearchParam {
                    name: "gender",
                    reason: format!("unknown gender '{}'", code),
                }
            })?),
        };
        let birthdate = non_empty(self.birthdate)
            .map(|raw| DateParam::parse("birthdate", &raw))
            .transpose()?;

        Ok(PatientSearch {
            family: non_empty(self.family),
            given: non_empty(self.given),
            gender,
            birthdate,
            page: Page::new(self.count, self.offset, limits)?,
        })
    }
}

fn patient_url(patient: &Patient) -> String {
    resource_url(Patient::RESOURCE_TYPE, patient.id())
}

/// Create a new patient
///
/// POST /Patient
pub async fn create_patient(
    State(state): State<AppState>,
    body: Result<Json<PatientResource>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(resource) = body?;
    let patient = Patient::new(resource)?;

    let stored = state.patients.create(&patient).await?;
    tracing::info!(patient_id = %stored.id(), "Patient created");

    Ok((
        StatusCode::CREATED,
        [
            (header::LOCATION, patient_url(&stored)),
            (header::ETAG, etag(stored.version_id())),
        ],
        Fhir(PatientResource::from(&stored)),
    ))
}

/// Get a patient by ID
///
/// GET /Patient/:id
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(Patient::RESOURCE_TYPE, &id)?;

    let patient = state
        .patients
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Patient/{} not found", id)))?;

    Ok((
        [(header::ETAG, etag(patient.version_id()))],
        Fhir(PatientResource::from(&patient)),
    ))
}

/// Replace an existing patient
///
/// PUT /Patient/:id
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PatientResource>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(Patient::RESOURCE_TYPE, &id)?;
    let Json(resource) = body?;

    let mut patient = state
        .patients
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Patient/{} not found", id)))?;
    patient.replace(resource)?;

    let stored = state.patients.update(&patient).await?;
    tracing::info!(
        patient_id = %stored.id(),
        version_id = stored.version_id(),
        "Patient updated"
    );

    Ok((
        [(header::ETAG, etag(stored.version_id()))],
        Fhir(PatientResource::from(&stored)),
    ))
}

/// Delete a patient and, through the foreign key, its observations
///
/// DELETE /Patient/:id
///
/// Deleting an unknown patient still answers 204.
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let Ok(id) = uuid::Uuid::parse_str(&id) else {
        return Ok(StatusCode::NO_CONTENT);
    };

    if state.patients.delete(id).await? {
        tracing::info!(patient_id = %id, "Patient deleted");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Search patients
///
/// GET /Patient?family=&given=&gender=&birthdate=&_count=&_offset=
pub async fn search_patients(
    State(state): State<AppState>,
    params: Result<Query<PatientSearchParams>, QueryRejection>,
) -> Result<Fhir<Bundle<PatientResource>>, ApiError> {
    let Query(params) = params?;
    let search = params.into_search(&state.page_limits)?;

    let result = state.patients.search(&search).await?;
    let entries = result.items.iter().map(|patient| BundleEntry {
        full_url: patient_url(patient),
        resource: PatientResource::from(patient),
    });

    Ok(Fhir(Bundle::searchset(result.total, entries)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::Comparator;

    #[test]
    fn empty_params_use_default_page() {
        let search = PatientSearchParams::default()
            .into_search(&PageLimits::default())
            .unwrap();

        assert_eq!(search, PatientSearch::default());
    }

    #[test]
    fn params_become_typed_criteria() {
        let params = PatientSearchParams {
            family: Some("Chal".to_string()),
            gender: Some("female".to_string()),
            birthdate: Some("lt2000-01".to_string()),
            count: Some(500),
            ..Default::default()
        };
        let search = params.into_search(&PageLimits::default()).unwrap();

        assert_eq!(search.family.as_deref(), Some("Chal"));
        assert_eq!(search.gender, Some(Gender::Female));
        assert_eq!(search.birthdate.unwrap().comparator, Comparator::Lt);
        assert_eq!(search.page.count, 100);
    }

    #[test]
    fn unknown_gender_is_rejected() {
        let params = PatientSearchParams {
            gender: Some("robot".to_string()),
            ..Default::default()
        };
        let err = params.into_search(&PageLimits::default()).unwrap_err();

        assert!(matches!(
            err,
            DomainError::InvalidSearchParam { name: "gender", .. }
        ));
    }
}
