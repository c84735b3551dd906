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
use uuid::Uuid;

use super::{non_empty, parse_id};
use crate::api::errors::ApiError;
use crate::api::response::{etag, resource_url, Fhir};
use crate::api::state::AppState;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::observation::{patient_id_from_reference, Observation};
use crate::domain::search::{DateParam, ObservationSearch, Page, PageLimits, TokenParam};
use crate::fhir::{Bundle, BundleEntry, ObservationResource};

/// Query string accepted by `GET /Observation`
#[derive(Debug, Default, Deserialize)]
pub struct ObservationSearchParams {
    #[serde(alias = "subject")]
    pub patient: Option<String>,
    pub category: Option<String>,
    pub code: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "_count", alias = "count")]
    pub count: Option<i64>,
    #[serde(rename = "_offset", alias = "offset")]
    pub offset: Option<i64>,
}

/// Accepts either a bare id or a `Patient/<id>` reference
fn parse_patient_param(raw: &str) -> DomainResult<Uuid> {
    if let Ok(id) = Uuid::parse_str(raw) {
        return Ok(id);
    }
    patient_id_from_reference(raw).map_err(|e| DomainError::InvalidSearchParam {
        name: "patient",
        reason: e.to_string(),
    })
}

impl ObservationSearchParams {
    /// Validates the raw parameters into search criteria
    pub fn into_search(self, limits: &PageLimits) -> DomainResult<ObservationSearch> {
        Ok(ObservationSearch {
            patient: non_empty(self.patient)
                .map(|raw| parse_patient_param(&raw))
                .transpose()?,
            category: non_empty(self.category)
                .map(|raw| TokenParam::parse("category", &raw))
                .transpose()?,
            code: non_empty(self.code)
                .map(|raw| TokenParam::parse("code", &raw))
                .transpose()?,
            date: non_empty(self.date)
                .map(|raw| DateParam::parse("date", &raw))
                .transpose()?,
            page: Page::new(self.count, self.offset, limits)?,
        })
    }
}

fn observation_url(observation: &Observation) -> String {
    resource_url(Observation::RESOURCE_TYPE, observation.id())
}

/// Create a new observation
///
/// POST /Observation
///
/// The subject patient must already exist.
pub async fn create_observation(
    State(state): State<AppState>,
    body: Result<Json<ObservationResource>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(resource) = body?;
    let observation = Observation::new(resource)?;

    let stored = state.observations.create(&observation).await?;
    tracing::info!(
        observation_id = %stored.id(),
        subject = %stored.subject_reference(),
        "Observation created"
    );

    Ok((
        StatusCode::CREATED,
        [
            (header::LOCATION, observation_url(&stored)),
            (header::ETAG, etag(stored.version_id())),
        ],
        Fhir(ObservationResource::from(&stored)),
    ))
}

/// Get an observation by ID
///
/// GET /Observation/:id
pub async fn get_observation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(Observation::RESOURCE_TYPE, &id)?;

    let observation = state
        .observations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Observation/{} not found", id)))?;

    Ok((
        [(header::ETAG, etag(observation.version_id()))],
        Fhir(ObservationResource::from(&observation)),
    ))
}

/// Replace an existing observation
///
/// PUT /Observation/:id
pub async fn update_observation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ObservationResource>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(Observation::RESOURCE_TYPE, &id)?;
    let Json(resource) = body?;

    let mut observation = state
        .observations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Observation/{} not found", id)))?;
    observation.replace(resource)?;

    let stored = state.observations.update(&observation).await?;
    tracing::info!(
        observation_id = %stored.id(),
        version_id = stored.version_id(),
        "Observation updated"
    );

    Ok((
        [(header::ETAG, etag(stored.version_id()))],
        Fhir(ObservationResource::from(&stored)),
    ))
}

/// Delete an observation
///
/// DELETE /Observation/:id
pub async fn delete_observation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(StatusCode::NO_CONTENT);
    };

    if state.observations.delete(id).await? {
        tracing::info!(observation_id = %id, "Observation deleted");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Search observations
///
/// GET /Observation?patient=&category=&code=&date=&_count=&_offset=
pub async fn search_observations(
    State(state): State<AppState>,
    params: Result<Query<ObservationSearchParams>, QueryRejection>,
) -> Result<Fhir<Bundle<ObservationResource>>, ApiError> {
    let Query(params) = params?;
    let search = params.into_search(&state.page_limits)?;

    let result = state.observations.search(&search).await?;
    let entries = result.items.iter().map(|observation| BundleEntry {
        full_url: observation_url(observation),
        resource: ObservationResource::from(observation),
    });

    Ok(Fhir(Bundle::searchset(result.total, entries)))
}
