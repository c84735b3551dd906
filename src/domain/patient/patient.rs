use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::value_objects::Gender;
use crate::domain::datatypes::{Address, ContactPoint, HumanName};
use crate::domain::errors::{DomainError, DomainResult};
use crate::fhir::resources::PatientResource;

/// Patient aggregate root
///
/// Demographics for a person receiving care. Observations point at a
/// patient through their subject reference.
///
/// # Invariants
/// - At least one name is recorded
/// - `version_id` starts at 1 and only grows
/// - `id` never changes once assigned
///
/// # Example
/// ```
/// use fhir_lite::domain::patient::Patient;
/// use fhir_lite::fhir::resources::PatientResource;
///
/// let resource: PatientResource = serde_json::from_value(serde_json::json!({
///     "resourceType": "Patient",
///     "name": [{ "family": "Chalmers", "given": ["Peter"] }]
/// }))
/// .expect("valid json");
///
/// let patient = Patient::new(resource).expect("valid patient");
/// assert!(patient.active());
/// assert_eq!(patient.version_id(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    id: Uuid,
    active: bool,
    gender: Option<Gender>,
    birth_date: Option<NaiveDate>,
    name: Vec<HumanName>,
    telecom: Vec<ContactPoint>,
    address: Vec<Address>,
    version_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Validated content of a Patient resource, without server metadata
struct PatientContent {
    active: bool,
    gender: Option<Gender>,
    birth_date: Option<NaiveDate>,
    name: Vec<HumanName>,
    telecom: Vec<ContactPoint>,
    address: Vec<Address>,
}

impl PatientContent {
    fn validate(resource: PatientResource) -> DomainResult<Self> {
        if resource.resource_type != Patient::RESOURCE_TYPE {
            return Err(DomainError::WrongResourceType {
                expected: Patient::RESOURCE_TYPE,
                found: resource.resource_type,
            });
        }

        if resource.name.is_empty() {
            return Err(DomainError::MissingField("Patient.name"));
        }

        Ok(Self {
            active: resource.active.unwrap_or(true),
            gender: resource.gender,
            birth_date: resource.birth_date,
            name: resource.name,
            telecom: resource.telecom,
            address: resource.address,
        })
    }
}

impl Patient {
    pub const RESOURCE_TYPE: &'static str = "Patient";

    /// Creates a new Patient from a submitted resource
    ///
    /// Any `id` or `meta` in the body is ignored; the server assigns both.
    ///
    /// # Business Rules Enforced
    /// - `resourceType` must be `Patient`
    /// - At least one name must be present
    /// - `active` defaults to true
    pub fn new(resource: PatientResource) -> DomainResult<Self> {
        let content = PatientContent::validate(resource)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            active: content.active,
            gender: content.gender,
            birth_date: content.birth_date,
            name: content.name,
            telecom: content.telecom,
            address: content.address,
            version_id: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the patient's content with a submitted resource
    ///
    /// Metadata is left for the repository to bump when the change is stored.
    ///
    /// # Business Rules
    /// - Same validation as [`Patient::new`]
    /// - An `id` in the body must equal this patient's id
    pub fn replace(&mut self, resource: PatientResource) -> DomainResult<()> {
        check_body_id(self.id, resource.id.as_deref())?;
        let content = PatientContent::validate(resource)?;

        self.active = content.active;
        self.gender = content.gender;
        self.birth_date = content.birth_date;
        self.name = content.name;
        self.telecom = content.telecom;
        self.address = content.address;

        Ok(())
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    pub fn name(&self) -> &[HumanName] {
        &self.name
    }

    pub fn telecom(&self) -> &[ContactPoint] {
        &self.telecom
    }

    pub fn address(&self) -> &[Address] {
        &self.address
    }

    pub fn version_id(&self) -> i32 {
        self.version_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reconstructs a Patient from persistence layer data
    ///
    /// Bypasses validation; only repository implementations should call it.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        active: bool,
        gender: Option<Gender>,
        birth_date: Option<NaiveDate>,
        name: Vec<HumanName>,
        telecom: Vec<ContactPoint>,
        address: Vec<Address>,
        version_id: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            active,
            gender,
            birth_date,
            name,
            telecom,
            address,
            version_id,
            created_at,
            updated_at,
        }
    }
}

/// Rejects a body whose `id` disagrees with the addressed resource
pub(crate) fn check_body_id(expected: Uuid, body_id: Option<&str>) -> DomainResult<()> {
    match body_id {
        Some(body) if body != expected.to_string() => Err(DomainError::IdMismatch {
            path: expected.to_string(),
            body: body.to_string(),
        }),
        _ => Ok(()),
    }
}
