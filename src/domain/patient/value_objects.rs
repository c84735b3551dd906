use serde::{Deserialize, Serialize};

/// Administrative gender of a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "patient_gender", rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    /// Parses a FHIR gender code
    ///
    /// # Example
    /// ```
    /// use fhir_lite::domain::patient::Gender;
    ///
    /// assert_eq!(Gender::parse("female"), Some(Gender::Female));
    /// assert_eq!(Gender::parse("F"), None);
    /// ```
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            "unknown" => Some(Gender::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
            Gender::Unknown => write!(f, "unknown"),
        }
    }
}
