use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Workflow status of an observation result
///
/// FHIR places no transition rules on these codes; any status may follow
/// any other, including corrections via `entered-in-error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "observation_status", rename_all = "kebab-case")]
pub enum ObservationStatus {
    Registered,
    Preliminary,
    Final,
    Amended,
    Cancelled,
    EnteredInError,
}

impl std::fmt::Display for ObservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObservationStatus::Registered => write!(f, "registered"),
            ObservationStatus::Preliminary => write!(f, "preliminary"),
            ObservationStatus::Final => write!(f, "final"),
            ObservationStatus::Amended => write!(f, "amended"),
            ObservationStatus::Cancelled => write!(f, "cancelled"),
            ObservationStatus::EnteredInError => write!(f, "entered-in-error"),
        }
    }
}

/// Extracts the patient id from a `Patient/<id>` reference
///
/// Absolute references (`https://host/fhir/Patient/<id>`) are accepted too.
///
/// # Example
/// ```
/// use fhir_lite::domain::observation::patient_id_from_reference;
///
/// let id = patient_id_from_reference("Patient/7f1c2a43-6a3b-4c36-9d3f-2b1f6a8e5c10");
/// assert!(id.is_ok());
/// assert!(patient_id_from_reference("Group/1").is_err());
/// ```
pub fn patient_id_from_reference(reference: &str) -> DomainResult<Uuid> {
    let invalid = || DomainError::InvalidReference(reference.to_string());

    let (base, id) = reference.rsplit_once("Patient/").ok_or_else(invalid)?;
    if !(base.is_empty() || base.ends_with('/')) {
        return Err(invalid());
    }

    Uuid::parse_str(id).map_err(|_| invalid())
}
