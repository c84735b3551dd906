use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::value_objects::{patient_id_from_reference, ObservationStatus};
use crate::domain::datatypes::{CodeableConcept, Quantity, ReferenceRange};
use crate::domain::dates::Period;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::patient::patient::check_body_id;
use crate::fhir::resources::ObservationResource;

/// Observation aggregate root
///
/// A measurement or assertion about a patient, e.g. a lab value or a vital
/// sign.
///
/// # Invariants
/// - `status` and `code` are always present
/// - `subject_id` identifies the patient the observation is about
/// - `version_id` starts at 1 and only grows
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    id: Uuid,
    status: ObservationStatus,
    category: Vec<CodeableConcept>,
    code: CodeableConcept,
    subject_id: Uuid,
    effective_at: Option<DateTime<Utc>>,
    value_quantity: Option<Quantity>,
    reference_range: Vec<ReferenceRange>,
    version_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

struct ObservationContent {
    status: ObservationStatus,
    category: Vec<CodeableConcept>,
    code: CodeableConcept,
    subject_id: Uuid,
    effective_at: Option<DateTime<Utc>>,
    value_quantity: Option<Quantity>,
    reference_range: Vec<ReferenceRange>,
}

impl ObservationContent {
    fn validate(resource: ObservationResource) -> DomainResult<Self> {
        if resource.resource_type != Observation::RESOURCE_TYPE {
            return Err(DomainError::WrongResourceType {
                expected: Observation::RESOURCE_TYPE,
                found: resource.resource_type,
            });
        }

        let status = resource
            .status
            .ok_or(DomainError::MissingField("Observation.status"))?;

        let code = resource
            .code
            .filter(|code| !code.is_empty())
            .ok_or(DomainError::MissingField("Observation.code"))?;

        let reference = resource
            .subject
            .and_then(|subject| subject.reference)
            .ok_or(DomainError::MissingField("Observation.subject"))?;
        let subject_id = patient_id_from_reference(&reference)?;

        // A partial date such as "2023-04" is stored as the start of its period
        let effective_at = resource
            .effective_date_time
            .as_deref()
            .map(Period::parse)
            .transpose()?
            .map(|period| period.start);

        Ok(Self {
            status,
            category: resource.category,
            code,
            subject_id,
            effective_at,
            value_quantity: resource.value_quantity,
            reference_range: resource.reference_range,
        })
    }
}

impl Observation {
    pub const RESOURCE_TYPE: &'static str = "Observation";

    /// Creates a new Observation from a submitted resource
    ///
    /// # Business Rules Enforced
    /// - `resourceType` must be `Observation`
    /// - `status` and a non-empty `code` are required
    /// - `subject.reference` must be `Patient/<id>`
    /// - `effectiveDateTime`, when present, must be a valid FHIR dateTime
    ///
    /// Whether the referenced patient exists is checked by the repository.
    pub fn new(resource: ObservationResource) -> DomainResult<Self> {
        let content = ObservationContent::validate(resource)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            status: content.status,
            category: content.category,
            code: content.code,
            subject_id: content.subject_id,
            effective_at: content.effective_at,
            value_quantity: content.value_quantity,
            reference_range: content.reference_range,
            version_id: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the observation's content with a submitted resource
    ///
    /// Fields absent from the body are cleared.
    pub fn replace(&mut self, resource: ObservationResource) -> DomainResult<()> {
        check_body_id(self.id, resource.id.as_deref())?;
        let content = ObservationContent::validate(resource)?;

        self.status = content.status;
        self.category = content.category;
        self.code = content.code;
        self.subject_id = content.subject_id;
        self.effective_at = content.effective_at;
        self.value_quantity = content.value_quantity;
        self.reference_range = content.reference_range;

        Ok(())
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> ObservationStatus {
        self.status
    }

    pub fn category(&self) -> &[CodeableConcept] {
        &self.category
    }

    pub fn code(&self) -> &CodeableConcept {
        &self.code
    }

    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    /// Returns the subject as a relative FHIR reference
    pub fn subject_reference(&self) -> String {
        format!("Patient/{}", self.subject_id)
    }

    pub fn effective_at(&self) -> Option<DateTime<Utc>> {
        self.effective_at
    }

    pub fn value_quantity(&self) -> Option<&Quantity> {
        self.value_quantity.as_ref()
    }

    pub fn reference_range(&self) -> &[ReferenceRange] {
        &self.reference_range
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

    /// Reconstructs an Observation from persistence layer data
    ///
    /// Bypasses validation; only repository implementations should call it.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        status: ObservationStatus,
        category: Vec<CodeableConcept>,
        code: CodeableConcept,
        subject_id: Uuid,
        effective_at: Option<DateTime<Utc>>,
        value_quantity: Option<Quantity>,
        reference_range: Vec<ReferenceRange>,
        version_id: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            status,
            category,
            code,
            subject_id,
            effective_at,
            value_quantity,
            reference_range,
            version_id,
            created_at,
            updated_at,
        }
    }
}
