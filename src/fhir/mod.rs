// FHIR wire formats: resources, bundles, outcomes and the capability statement

pub mod bundle;
pub mod capability;
pub mod outcome;
pub mod resources;

pub use bundle::{Bundle, BundleEntry};
pub use outcome::{IssueType, OperationOutcome};
pub use resources::{Meta, ObservationResource, PatientResource};

/// FHIR release implemented by this server
pub const FHIR_VERSION: &str = "4.0.1";

/// Media type for FHIR JSON
pub const FHIR_JSON: &str = "application/fhir+json";
