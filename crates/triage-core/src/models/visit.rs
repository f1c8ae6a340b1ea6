//! Visit record models.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator used when a symptom list is flattened into one text field.
pub const SYMPTOM_SEPARATOR: &str = ", ";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors parsing visit fields from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFieldError {
    #[error("Unknown gender: {0} (expected Male, Female or Other)")]
    Gender(String),

    #[error("Invalid visit timestamp: {0} (expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")]
    Timestamp(String),
}

/// Patient gender as offered by the intake form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(ParseFieldError::Gender(s.to_string())),
        }
    }
}

/// When a visit happened: a calendar date or a local date-time.
///
/// Both forms render to text that sorts chronologically, and a bare date
/// sorts before any time on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitTimestamp {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl VisitTimestamp {
    /// Current local time, truncated to whole seconds.
    pub fn now() -> Self {
        let now = Local::now().naive_local();
        VisitTimestamp::DateTime(now.with_nanosecond(0).unwrap_or(now))
    }

    /// Calendar day of the visit.
    pub fn date(&self) -> NaiveDate {
        match self {
            VisitTimestamp::Date(date) => *date,
            VisitTimestamp::DateTime(dt) => dt.date(),
        }
    }
}

impl fmt::Display for VisitTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitTimestamp::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            VisitTimestamp::DateTime(dt) => write!(f, "{}", dt.format(DATE_TIME_FORMAT)),
        }
    }
}

impl FromStr for VisitTimestamp {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT) {
            return Ok(VisitTimestamp::DateTime(dt));
        }
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(VisitTimestamp::Date)
            .map_err(|_| ParseFieldError::Timestamp(s.to_string()))
    }
}

impl From<NaiveDate> for VisitTimestamp {
    fn from(date: NaiveDate) -> Self {
        VisitTimestamp::Date(date)
    }
}

impl From<NaiveDateTime> for VisitTimestamp {
    fn from(dt: NaiveDateTime) -> Self {
        VisitTimestamp::DateTime(dt)
    }
}

impl Serialize for VisitTimestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VisitTimestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Payload for appending a visit. The store assigns the identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewVisit {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub contact_info: String,
    /// Selected symptoms in input order
    pub symptoms: Vec<String>,
    pub predicted_disease: String,
    /// Defaults to [`VisitTimestamp::now`] when absent
    pub visit_date: Option<VisitTimestamp>,
}

impl NewVisit {
    /// Create a visit stamped at insert time.
    pub fn new(
        name: impl Into<String>,
        age: u32,
        gender: Gender,
        contact_info: impl Into<String>,
        symptoms: Vec<String>,
        predicted_disease: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            gender,
            contact_info: contact_info.into(),
            symptoms,
            predicted_disease: predicted_disease.into(),
            visit_date: None,
        }
    }

    /// Set an explicit visit timestamp.
    pub fn with_visit_date(mut self, visit_date: impl Into<VisitTimestamp>) -> Self {
        self.visit_date = Some(visit_date.into());
        self
    }

    /// Symptoms flattened for storage.
    pub fn symptoms_text(&self) -> String {
        join_symptoms(&self.symptoms)
    }
}

/// One persisted patient visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitRecord {
    /// Store-assigned, strictly increasing, never reused
    pub id: i64,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub contact_info: String,
    pub symptoms: Vec<String>,
    pub predicted_disease: String,
    pub visit_date: VisitTimestamp,
}

impl VisitRecord {
    /// Symptoms as one comma-separated line.
    pub fn symptoms_display(&self) -> String {
        join_symptoms(&self.symptoms)
    }
}

pub fn join_symptoms<S: AsRef<str>>(symptoms: &[S]) -> String {
    symptoms
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(SYMPTOM_SEPARATOR)
}

/// Inverse of [`join_symptoms`]. Empty text yields an empty list.
pub fn split_symptoms(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
