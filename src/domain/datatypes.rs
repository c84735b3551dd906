// FHIR complex datatypes shared by the Patient and Observation aggregates.
// Stored as JSONB and rendered verbatim, so serde naming follows FHIR JSON.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A reference to a code defined by a terminology system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A concept that may be defined by one or more codings plus free text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// True when the concept carries neither codings nor text
    pub fn is_empty(&self) -> bool {
        self.coding.is_empty() && self.text.is_none()
    }
}

/// A person's name with its parts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanName {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub name_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefix: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suffix: Vec<String>,
}

/// Phone, email or other contact detail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub contact_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// A postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub address_use: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// A measured amount
///
/// `value` is held as a decimal and travels as a plain JSON number with
/// its digits and scale intact (`6.30` stays `6.30`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(
        default,
        with = "rust_decimal::serde::arbitrary_precision_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A literal reference to another resource, e.g. `Patient/<id>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Normal range guidance for an observation value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn human_name_uses_fhir_field_names() {
        let name: HumanName = serde_json::from_value(json!({
            "use": "official",
            "family": "Chalmers",
            "given": ["Peter", "James"]
        }))
        .unwrap();

        assert_eq!(name.name_use.as_deref(), Some("official"));
        assert_eq!(name.given, vec!["Peter", "James"]);

        let value = serde_json::to_value(&name).unwrap();
        assert_eq!(value["use"], "official");
        assert!(value.get("prefix").is_none());
    }

    #[test]
    fn address_postal_code_is_camel_case() {
        let address: Address = serde_json::from_value(json!({
            "line": ["534 Erewhon St"],
            "city": "PleasantVille",
            "postalCode": "3999"
        }))
        .unwrap();

        assert_eq!(address.postal_code.as_deref(), Some("3999"));
        let value = serde_json::to_value(&address).unwrap();
        assert_eq!(value["postalCode"], "3999");
    }

    #[test]
    fn quantity_value_serializes_as_number() {
        let quantity: Quantity = serde_json::from_value(json!({
            "value": 6.3,
            "unit": "mmol/l"
        }))
        .unwrap();

        assert_eq!(quantity.value, Some(Decimal::new(63, 1)));
        let value = serde_json::to_value(&quantity).unwrap();
        assert_eq!(value["value"], json!(6.3));
    }

    #[test]
    fn quantity_value_keeps_digits_and_scale() {
        for raw in [
            r#"{"value":0.12345678901234567890123}"#,
            r#"{"value":6.30}"#,
            r#"{"value":72}"#,
        ] {
            let quantity: Quantity = serde_json::from_str(raw).unwrap();
            assert_eq!(serde_json::to_string(&quantity).unwrap(), raw);
        }

        let quantity: Quantity = serde_json::from_str(r#"{"value":6.30}"#).unwrap();
        assert_eq!(quantity.value, Some(Decimal::new(630, 2)));
    }

    #[test]
    fn quantity_without_value_omits_it() {
        let quantity: Quantity = serde_json::from_value(json!({ "unit": "kg" })).unwrap();

        assert!(quantity.value.is_none());
        let value = serde_json::to_value(&quantity).unwrap();
        assert!(value.get("value").is_none());
    }

    #[test]
    fn empty_codeable_concept() {
        assert!(CodeableConcept::default().is_empty());
        let concept = CodeableConcept {
            text: Some("Glucose".to_string()),
            ..Default::default()
        };
        assert!(!concept.is_empty());
    }
}
