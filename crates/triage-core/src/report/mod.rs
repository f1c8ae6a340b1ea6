//! Downloadable patient reports.

mod pdf;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{join_symptoms, Gender, GuidanceLookup, VisitRecord, DISEASE_NOT_FOUND};

/// Report errors.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF rendering error: {0}")]
    Pdf(String),

    #[error("Unknown report format: {0} (expected text, json or pdf)")]
    UnknownFormat(String),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Output format of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Pdf,
}

impl ReportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportFormat::Text => "patient_report.txt",
            ReportFormat::Json => "patient_report.json",
            ReportFormat::Pdf => "patient_report.pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text/plain; charset=utf-8",
            ReportFormat::Json => "application/json",
            ReportFormat::Pdf => "application/pdf",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "pdf" => Ok(ReportFormat::Pdf),
            _ => Err(ReportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Patient fields printed at the top of a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSubject {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub contact_info: String,
    pub symptoms: Vec<String>,
}

impl From<&VisitRecord> for ReportSubject {
    fn from(record: &VisitRecord) -> Self {
        Self {
            name: record.name.clone(),
            age: record.age,
            gender: record.gender,
            contact_info: record.contact_info.clone(),
            symptoms: record.symptoms.clone(),
        }
    }
}

/// A rendered report ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    /// Suggested file name
    pub file_name: String,
    /// MIME content type
    pub content_type: String,
    /// Document bytes
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of `bytes`
    pub sha256: String,
}

impl ReportDocument {
    fn new(format: ReportFormat, bytes: Vec<u8>) -> Self {
        let sha256 = hex::encode(Sha256::digest(&bytes));
        Self {
            file_name: format.file_name().to_string(),
            content_type: format.content_type().to_string(),
            bytes,
            sha256,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    patient: JsonPatient<'a>,
    predicted_disease: &'a str,
    guidance: &'a GuidanceLookup,
}

#[derive(Serialize)]
struct JsonPatient<'a> {
    name: &'a str,
    age: u32,
    gender: Gender,
    contact_info: &'a str,
    symptoms: &'a [String],
}

/// Fixed-layout report renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFormatter {
    format: ReportFormat,
}

impl ReportFormatter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Render a report for a patient, predicted disease and guidance lookup.
    pub fn render(
        &self,
        subject: &ReportSubject,
        predicted_disease: &str,
        guidance: &GuidanceLookup,
    ) -> ReportResult<ReportDocument> {
        let bytes = match self.format {
            ReportFormat::Text => {
                render_text(&report_lines(subject, predicted_disease, guidance)).into_bytes()
            }
            ReportFormat::Pdf => pdf::render(TITLE, &report_lines(subject, predicted_disease, guidance))?,
            ReportFormat::Json => serde_json::to_vec_pretty(&JsonReport {
                patient: JsonPatient {
                    name: &subject.name,
                    age: subject.age,
                    gender: subject.gender,
                    contact_info: &subject.contact_info,
                    symptoms: &subject.symptoms,
                },
                predicted_disease,
                guidance,
            })?,
        };
        Ok(ReportDocument::new(self.format, bytes))
    }
}

const TITLE: &str = "Patient Report";

/// Field lines under the title, shared by the text and PDF layouts.
fn report_lines(subject: &ReportSubject, predicted_disease: &str, guidance: &GuidanceLookup) -> Vec<String> {
    let mut lines = vec![
        format!("Name: {}", subject.name),
        format!("Age: {}", subject.age),
        format!("Gender: {}", subject.gender),
        format!("Contact Info: {}", subject.contact_info),
        format!("Symptoms: {}", join_symptoms(&subject.symptoms)),
        String::new(),
        format!("Predicted Disease: {}", predicted_disease),
    ];

    match guidance.guidance() {
        Some(g) => {
            lines.push(format!("Suggested Diet: {}", g.suggested_diet));
            lines.push(format!("Foods to Eat: {}", g.foods_to_eat));
            lines.push(format!("Foods to Avoid: {}", g.foods_to_avoid));
            lines.push(format!("Medication: {}", g.medication));
            lines.push(format!("Additional Tips: {}", g.tips_or_default()));
        }
        None => lines.push(format!("Guidance: {}", DISEASE_NOT_FOUND)),
    }

    lines
}

fn render_text(lines: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", TITLE));
    out.push_str(&format!("{}\n", "=".repeat(TITLE.len())));
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}
