//! Trip requests
//!
//! A [`TripRequest`] is the normalized form input handed to the
//! orchestration collaborator. Strings pass through untouched; only the date
//! span is parsed, and the span check belongs to the form boundary
//! ([`TripForm::into_request`]), the same way a date-range widget would
//! prevent a reversed selection.

use crate::error::{Result, TrippyError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used on the wire and in prompts
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive travel date span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a span from two dates as selected by the UI control.
    ///
    /// The control guarantees `start <= end`; this constructor does not re-check.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse a span from two `YYYY-MM-DD` strings, rejecting reversed spans
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_date("start date", start)?;
        let end = parse_date("end date", end)?;
        if start > end {
            return Err(TrippyError::invalid_input(format!(
                "start date {} is after end date {}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )));
        }
        Ok(Self::new(start, end))
    }

    /// The form's initial selection: today until January 16 of next year
    pub fn default_from(today: NaiveDate) -> Self {
        let end = NaiveDate::from_ymd_opt(today.year() + 1, 1, 16).unwrap_or(today);
        Self::new(today, end)
    }

    /// Number of calendar days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        TrippyError::invalid_input(format!("{} `{}` is not a YYYY-MM-DD date: {}", field, value, e))
    })
}

/// Raw form submission, as posted by the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripForm {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    pub date_start: String,
    pub date_end: String,
    #[serde(default)]
    pub interests: String,
}

impl TripForm {
    /// Normalize the form into a trip request
    ///
    /// Only the dates are validated; empty text fields go through as-is and
    /// any rejection of them surfaces later as an orchestration failure.
    pub fn into_request(self) -> Result<TripRequest> {
        let dates = DateRange::parse(&self.date_start, &self.date_end)?;
        Ok(TripRequest::new(
            self.origin,
            self.destination,
            dates,
            self.interests,
        ))
    }
}

/// Normalized trip preferences for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub dates: DateRange,
    pub interests: String,
}

impl TripRequest {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        dates: DateRange,
        interests: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            dates,
            interests: interests.into(),
        }
    }

    /// Date span formatted for the collaborator (`2025-06-01 to 2025-06-10`)
    pub fn date_range(&self) -> String {
        self.dates.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_form_into_request() {
        let form = TripForm {
            origin: "San Mateo, CA".to_string(),
            destination: "Bali, Indonesia".to_string(),
            date_start: "2025-06-01".to_string(),
            date_end: "2025-06-10".to_string(),
            interests: "hiking".to_string(),
        };
        let request = form.into_request().unwrap();
        assert_eq!(request.dates, DateRange::new(date(2025, 6, 1), date(2025, 6, 10)));
        assert_eq!(request.date_range(), "2025-06-01 to 2025-06-10");
        assert_eq!(request.dates.days(), 10);
    }

    #[test]
    fn test_empty_strings_pass_through() {
        let form = TripForm {
            date_start: "2025-06-01".to_string(),
            date_end: "2025-06-01".to_string(),
            ..Default::default()
        };
        let request = form.into_request().unwrap();
        assert_eq!(request.origin, "");
        assert_eq!(request.destination, "");
        assert_eq!(request.interests, "");
    }

    #[test]
    fn test_reversed_span_rejected_at_form() {
        let err = DateRange::parse("2025-06-10", "2025-06-01").unwrap_err();
        assert!(matches!(err, TrippyError::InvalidInput(_)));
        assert!(err.to_string().contains("after end date"));
    }

    #[test]
    fn test_unparseable_date_rejected() {
        let err = DateRange::parse("June 1st", "2025-06-01").unwrap_err();
        assert!(err.to_string().contains("start date `June 1st`"));
    }

    #[test]
    fn test_default_range() {
        let range = DateRange::default_from(date(2025, 3, 4));
        assert_eq!(range.start, date(2025, 3, 4));
        assert_eq!(range.end, date(2026, 1, 16));
    }
}
