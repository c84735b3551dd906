use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::errors::{DomainError, DomainResult};

/// Half-open time span `[start, end)` denoted by a FHIR date or dateTime
///
/// FHIR lets a client write `2023`, `2023-04`, `2023-04-01` or a full
/// timestamp. Each form denotes the whole period it names, which is what
/// search comparisons need. Values without an offset are read as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Parses any supported FHIR date/dateTime form
    ///
    /// # Example
    /// ```
    /// use fhir_lite::domain::dates::Period;
    ///
    /// let period = Period::parse("2023-04").expect("valid month");
    /// assert_eq!(period.start.to_rfc3339(), "2023-04-01T00:00:00+00:00");
    /// assert_eq!(period.end.to_rfc3339(), "2023-05-01T00:00:00+00:00");
    /// ```
    pub fn parse(value: &str) -> DomainResult<Self> {
        let value = value.trim();
        let invalid = || DomainError::InvalidDate(value.to_string());

        if value.contains('T') {
            if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
                return Ok(Self::from_instant(instant.with_timezone(&Utc), Duration::seconds(1)));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
                return Ok(Self::from_instant(Utc.from_utc_datetime(&naive), Duration::seconds(1)));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
                return Ok(Self::from_instant(Utc.from_utc_datetime(&naive), Duration::minutes(1)));
            }
            return Err(invalid());
        }

        let (start, end) = match value.len() {
            4 if value.bytes().all(|b| b.is_ascii_digit()) => {
                let year: i32 = value.parse().map_err(|_| invalid())?;
                let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
                let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(invalid)?;
                (start, end)
            }
            7 => {
                let start = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
                    .map_err(|_| invalid())?;
                let end = start.checked_add_months(Months::new(1)).ok_or_else(invalid)?;
                (start, end)
            }
            10 => {
                let start = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
                let end = start.succ_opt().ok_or_else(invalid)?;
                (start, end)
            }
            _ => return Err(invalid()),
        };

        Ok(Self {
            start: midnight_utc(start),
            end: midnight_utc(end),
        })
    }

    fn from_instant(start: DateTime<Utc>, width: Duration) -> Self {
        Self {
            start,
            end: start + width,
        }
    }

    /// True when `instant` falls inside the period
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Midnight UTC at the start of `date`
pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}
