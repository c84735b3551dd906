use serde_json::{json, Value};

use super::{FHIR_JSON, FHIR_VERSION};

/// Date the capability statement was last revised
const STATEMENT_DATE: &str = "2023-11-21";

const INTERACTIONS: [&str; 5] = ["read", "create", "update", "delete", "search-type"];

const PATIENT_SEARCH_PARAMS: [(&str, &str); 4] = [
    ("family", "string"),
    ("given", "string"),
    ("gender", "token"),
    ("birthdate", "date"),
];

const OBSERVATION_SEARCH_PARAMS: [(&str, &str); 4] = [
    ("patient", "reference"),
    ("category", "token"),
    ("code", "token"),
    ("date", "date"),
];

fn resource_entry(resource_type: &str, params: &[(&str, &str)]) -> Value {
    json!({
        "type": resource_type,
        "interaction": INTERACTIONS
            .iter()
            .map(|code| json!({ "code": code }))
            .collect::<Vec<_>>(),
        "searchParam": params
            .iter()
            .map(|(name, kind)| json!({ "name": name, "type": kind }))
            .collect::<Vec<_>>(),
    })
}

/// Builds the CapabilityStatement served at `/metadata`
pub fn capability_statement() -> Value {
    json!({
        "resourceType": "CapabilityStatement",
        "status": "active",
        "date": STATEMENT_DATE,
        "kind": "instance",
        "software": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
        "fhirVersion": FHIR_VERSION,
        "format": ["json", FHIR_JSON],
        "rest": [{
            "mode": "server",
            "resource": [
                resource_entry("Patient", &PATIENT_SEARCH_PARAMS),
                resource_entry("Observation", &OBSERVATION_SEARCH_PARAMS),
            ],
        }],
    })
}
