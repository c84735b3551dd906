// JSON shapes of the Patient and Observation resources.
// Deserialized from request bodies and serialized into responses; the
// aggregates in `domain` decide what a valid body is.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::datatypes::{
    Address, CodeableConcept, ContactPoint, HumanName, Quantity, Reference, ReferenceRange,
};
use crate::domain::observation::{Observation, ObservationStatus};
use crate::domain::patient::{Gender, Patient};

/// Server-maintained resource metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Meta {
    fn stored(version_id: i32, last_updated: DateTime<Utc>) -> Self {
        Self {
            version_id: Some(version_id.to_string()),
            last_updated: Some(last_updated),
        }
    }
}

/// FHIR Patient resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResource {
    #[serde(default)]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default)]
    pub name: Vec<HumanName>,
    #[serde(default)]
    pub telecom: Vec<ContactPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub address: Vec<Address>,
}

impl From<&Patient> for PatientResource {
    fn from(patient: &Patient) -> Self {
        Self {
            resource_type: Patient::RESOURCE_TYPE.to_string(),
            id: Some(patient.id().to_string()),
            meta: Some(Meta::stored(patient.version_id(), patient.updated_at())),
            active: Some(patient.active()),
            name: patient.name().to_vec(),
            telecom: patient.telecom().to_vec(),
            gender: patient.gender(),
            birth_date: patient.birth_date(),
            address: patient.address().to_vec(),
        }
    }
}

/// FHIR Observation resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationResource {
    #[serde(default)]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ObservationStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_range: Vec<ReferenceRange>,
}

impl From<&Observation> for ObservationResource {
    fn from(observation: &Observation) -> Self {
        Self {
            resource_type: Observation::RESOURCE_TYPE.to_string(),
            id: Some(observation.id().to_string()),
            meta: Some(Meta::stored(
                observation.version_id(),
                observation.updated_at(),
            )),
            status: Some(observation.status()),
            category: observation.category().to_vec(),
            code: Some(observation.code().clone()),
            subject: Some(Reference {
                reference: Some(observation.subject_reference()),
                display: None,
            }),
            effective_date_time: observation
                .effective_at()
                .map(|at| at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            value_quantity: observation.value_quantity().cloned(),
            reference_range: observation.reference_range().to_vec(),
        }
    }
}
