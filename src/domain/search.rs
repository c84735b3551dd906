// Search parameter types shared by the repositories and the HTTP layer

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use super::datatypes::CodeableConcept;
use super::dates::{midnight_utc, Period};
use super::errors::{DomainError, DomainResult};
use super::patient::Gender;

/// Bounds applied to `_count`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_count: u32,
    pub max_count: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_count: 10,
            max_count: 100,
        }
    }
}

/// Window of a search result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub count: u32,
    pub offset: u32,
}

impl Page {
    /// Builds a page from raw `_count` / `_offset` values
    ///
    /// Missing count falls back to the default, oversized count is clamped
    /// to the maximum, negative values are rejected.
    pub fn new(count: Option<i64>, offset: Option<i64>, limits: &PageLimits) -> DomainResult<Self> {
        let count = match count {
            None => limits.default_count,
            Some(c) if c < 0 => {
                return Err(DomainError::InvalidSearchParam {
                    name: "_count",
                    reason: "must not be negative".to_string(),
                })
            }
            Some(c) => u32::try_from(c).unwrap_or(u32::MAX).min(limits.max_count),
        };
        let offset = match offset {
            None => 0,
            Some(o) => u32::try_from(o).map_err(|_| DomainError::InvalidSearchParam {
                name: "_offset",
                reason: format!("{} is out of range", o),
            })?,
        };

        Ok(Self { count, offset })
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            count: PageLimits::default().default_count,
            offset: 0,
        }
    }
}

/// FHIR search prefix for ordered parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A `date`-typed search parameter such as `birthdate=ge1980`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParam {
    pub comparator: Comparator,
    pub period: Period,
}

impl DateParam {
    /// Parses a prefixed FHIR date value
    ///
    /// # Example
    /// ```
    /// use fhir_lite::domain::search::{Comparator, DateParam};
    ///
    /// let param = DateParam::parse("date", "lt2020-06").expect("valid date param");
    /// assert_eq!(param.comparator, Comparator::Lt);
    /// ```
    pub fn parse(name: &'static str, raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        let (comparator, value) = match raw.get(..2) {
            Some("eq") => (Comparator::Eq, &raw[2..]),
            Some("ne") => (Comparator::Ne, &raw[2..]),
            Some("lt") => (Comparator::Lt, &raw[2..]),
            Some("le") => (Comparator::Le, &raw[2..]),
            Some("gt") => (Comparator::Gt, &raw[2..]),
            Some("ge") => (Comparator::Ge, &raw[2..]),
            Some(prefix) if prefix.bytes().all(|b| b.is_ascii_alphabetic()) => {
                return Err(DomainError::InvalidSearchParam {
                    name,
                    reason: format!("unsupported prefix '{}'", prefix),
                })
            }
            _ => (Comparator::Eq, raw),
        };

        let period = Period::parse(value).map_err(|e| DomainError::InvalidSearchParam {
            name,
            reason: e.to_string(),
        })?;

        Ok(Self { comparator, period })
    }

    /// Evaluates the parameter against a stored instant
    pub fn matches(&self, instant: DateTime<Utc>) -> bool {
        let Period { start, end } = self.period;
        match self.comparator {
            Comparator::Eq => start <= instant && instant < end,
            Comparator::Ne => instant < start || instant >= end,
            Comparator::Lt => instant < start,
            Comparator::Le => instant < end,
            Comparator::Gt => instant >= end,
            Comparator::Ge => instant >= start,
        }
    }

    /// Evaluates the parameter against a stored calendar date
    pub fn matches_date(&self, date: NaiveDate) -> bool {
        self.matches(midnight_utc(date))
    }
}

/// A `token`-typed search parameter: `code` or `system|code`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParam {
    pub system: Option<String>,
    pub code: String,
}

impl TokenParam {
    pub fn parse(name: &'static str, raw: &str) -> DomainResult<Self> {
        let (system, code) = match raw.split_once('|') {
            Some((system, code)) => {
                let system = (!system.is_empty()).then(|| system.to_string());
                (system, code)
            }
            None => (None, raw),
        };

        if code.trim().is_empty() {
            return Err(DomainError::InvalidSearchParam {
                name,
                reason: "code must not be empty".to_string(),
            });
        }

        Ok(Self {
            system,
            code: code.to_string(),
        })
    }

    /// True when any coding of `concept` carries this token
    pub fn matches(&self, concept: &CodeableConcept) -> bool {
        concept.coding.iter().any(|coding| {
            coding.code.as_deref() == Some(self.code.as_str())
                && self
                    .system
                    .as_deref()
                    .map_or(true, |system| coding.system.as_deref() == Some(system))
        })
    }

    /// JSON fragment a CodeableConcept must contain to match this token
    pub fn containment(&self) -> Value {
        let mut coding = json!({ "code": self.code });
        if let Some(system) = &self.system {
            coding["system"] = json!(system);
        }
        json!({ "coding": [coding] })
    }
}

/// Escapes `%`, `_` and `\` for use inside a LIKE pattern
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Criteria for `GET /Patient`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientSearch {
    pub family: Option<String>,
    pub given: Option<String>,
    pub gender: Option<Gender>,
    pub birthdate: Option<DateParam>,
    pub page: Page,
}

/// Criteria for `GET /Observation`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationSearch {
    pub patient: Option<Uuid>,
    pub category: Option<TokenParam>,
    pub code: Option<TokenParam>,
    pub date: Option<DateParam>,
    pub page: Page,
}

/// One page of matches plus the size of the whole match set
#[derive(Debug, Clone)]
pub struct SearchResult<T> {
    pub total: i64,
    pub items: Vec<T>,
}
