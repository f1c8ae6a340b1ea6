//! Patient Triage Core Library
//!
//! Symptom intake, disease prediction, diet/medication guidance and a
//! persistent visit log.
//!
//! # Architecture
//!
//! ```text
//! Patient input → Validation ──(warning, nothing stored)──▶ user
//!                     │
//!                     ▼
//!              Symptom encoding → Classifier → DiseaseAdvisor
//!                                                    │
//!                                   ┌────────────────▼────────────────┐
//!                                   │   Visit log insert (SQLite)     │
//!                                   │   append-only, ids never reused │
//!                                   └────────────────┬────────────────┘
//!                                                    │
//!                                                    ▼
//!                                             ReportFormatter
//!                                                    │
//!                                                    ▼
//!                                         Downloadable report
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite visit log
//! - [`models`]: Domain types (VisitRecord, DiseaseGuidance, etc.)
//! - [`advisor`]: Disease → guidance reference table
//! - [`report`]: Report rendering
//! - [`controller`]: Interaction flow
//! - [`config`]: Startup configuration

pub mod advisor;
pub mod config;
pub mod controller;
pub mod db;
pub mod models;
pub mod report;

// Re-export commonly used types
pub use advisor::DiseaseAdvisor;
pub use config::TriageConfig;
pub use controller::{
    InteractionController, PredictionOutcome, TriageError, ValidationError, VisitRequest,
};
pub use db::Database;
pub use models::{DiseaseGuidance, Gender, GuidanceLookup, NewVisit, VisitRecord, VisitTimestamp};
pub use report::{ReportDocument, ReportFormat, ReportFormatter};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum TriageCoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Classifier error: {0}")]
    ClassifierError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Report error: {0}")]
    ReportError(String),
}

impl From<db::DbError> for TriageCoreError {
    fn from(e: db::DbError) -> Self {
        TriageCoreError::DatabaseError(e.to_string())
    }
}

impl From<models::ParseFieldError> for TriageCoreError {
    fn from(e: models::ParseFieldError) -> Self {
        TriageCoreError::InvalidInput(e.to_string())
    }
}

impl From<TriageError> for TriageCoreError {
    fn from(e: TriageError) -> Self {
        match e {
            TriageError::Validation(e) => TriageCoreError::InvalidInput(e.to_string()),
            TriageError::Storage(e) => e.into(),
            TriageError::Model(e) => TriageCoreError::ClassifierError(e.to_string()),
            TriageError::Advisor(e) => TriageCoreError::ConfigError(e.to_string()),
            TriageError::Report(e) => TriageCoreError::ReportError(e.to_string()),
        }
    }
}

impl From<report::ReportError> for TriageCoreError {
    fn from(e: report::ReportError) -> Self {
        TriageCoreError::ReportError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for TriageCoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        TriageCoreError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open (creating if needed) a visit store and load reference data.
///
/// `guidance_path` and `model_path` fall back to the built-in table and
/// classifier. `report_format` is "text" (default), "json" or "pdf".
#[uniffi::export]
pub fn open_triage(
    db_path: String,
    guidance_path: Option<String>,
    model_path: Option<String>,
    report_format: Option<String>,
) -> Result<Arc<TriageCore>, TriageCoreError> {
    let format = match report_format {
        Some(f) => f.parse::<ReportFormat>()?,
        None => ReportFormat::default(),
    };
    let controller = TriageConfig::new(db_path)
        .with_guidance_path(guidance_path.map(PathBuf::from))
        .with_model_path(model_path.map(PathBuf::from))
        .with_report_format(format)
        .build()?;
    controller.initialize_store()?;

    Ok(Arc::new(TriageCore {
        controller: Mutex::new(controller),
    }))
}

/// The ordered symptom vocabulary.
#[uniffi::export]
pub fn symptom_vocabulary() -> Vec<String> {
    patient_triage_model::SYMPTOMS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe controller wrapper for FFI.
///
/// The lock makes each interaction run to completion before the next starts.
#[derive(uniffi::Object)]
pub struct TriageCore {
    controller: Mutex<InteractionController>,
}

#[uniffi::export]
impl TriageCore {
    /// Validate, classify, store the visit and render the report.
    pub fn predict(&self, request: FfiVisitRequest) -> Result<FfiPredictionOutcome, TriageCoreError> {
        let controller = self.controller.lock()?;
        let request = VisitRequest::try_from(request)?;
        let outcome = controller.predict(request)?;
        Ok(outcome.into())
    }

    /// Visit history for an exact name, most recent first.
    pub fn history(&self, name: String) -> Result<Vec<FfiVisitRecord>, TriageCoreError> {
        let controller = self.controller.lock()?;
        let visits = controller.history(&name)?;
        Ok(visits.into_iter().map(|v| v.into()).collect())
    }

    /// Guidance for a disease, or None when it is not in the table.
    pub fn guidance(&self, disease: String) -> Result<Option<FfiGuidance>, TriageCoreError> {
        let controller = self.controller.lock()?;
        Ok(controller.guidance(&disease).guidance().map(|g| g.into()))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe prediction request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisitRequest {
    pub name: String,
    pub age: i64,
    /// "Male", "Female" or "Other"
    pub gender: String,
    pub contact_info: String,
    pub symptoms: Vec<String>,
    /// "YYYY-MM-DD" or "YYYY-MM-DD HH:MM:SS"; None for now
    pub visit_date: Option<String>,
}

impl TryFrom<FfiVisitRequest> for VisitRequest {
    type Error = TriageCoreError;

    fn try_from(request: FfiVisitRequest) -> Result<Self, Self::Error> {
        let visit_date = match request.visit_date {
            Some(text) => Some(text.parse::<VisitTimestamp>()?),
            None => None,
        };
        Ok(VisitRequest {
            name: request.name,
            age: request.age,
            gender: request.gender.parse::<Gender>()?,
            contact_info: request.contact_info,
            symptoms: request.symptoms,
            visit_date,
        })
    }
}

/// FFI-safe visit record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisitRecord {
    pub id: i64,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub contact_info: String,
    pub symptoms: Vec<String>,
    pub predicted_disease: String,
    pub visit_date: String,
}

impl From<VisitRecord> for FfiVisitRecord {
    fn from(record: VisitRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            age: record.age,
            gender: record.gender.to_string(),
            contact_info: record.contact_info,
            symptoms: record.symptoms,
            predicted_disease: record.predicted_disease,
            visit_date: record.visit_date.to_string(),
        }
    }
}

/// FFI-safe guidance. Missing tips are filled with the standard placeholder.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiGuidance {
    pub disease: String,
    pub suggested_diet: String,
    pub foods_to_eat: String,
    pub foods_to_avoid: String,
    pub medication: String,
    pub additional_tips: String,
}

impl From<&DiseaseGuidance> for FfiGuidance {
    fn from(guidance: &DiseaseGuidance) -> Self {
        Self {
            disease: guidance.disease.clone(),
            suggested_diet: guidance.suggested_diet.clone(),
            foods_to_eat: guidance.foods_to_eat.clone(),
            foods_to_avoid: guidance.foods_to_avoid.clone(),
            medication: guidance.medication.clone(),
            additional_tips: guidance.tips_or_default().to_string(),
        }
    }
}

/// FFI-safe report document.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReport {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub sha256: String,
}

impl From<ReportDocument> for FfiReport {
    fn from(doc: ReportDocument) -> Self {
        Self {
            file_name: doc.file_name,
            content_type: doc.content_type,
            bytes: doc.bytes,
            sha256: doc.sha256,
        }
    }
}

/// FFI-safe prediction result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPredictionOutcome {
    pub record: FfiVisitRecord,
    /// None when the predicted disease is not in the guidance table
    pub guidance: Option<FfiGuidance>,
    /// User-facing message for a guidance miss
    pub guidance_error: Option<String>,
    pub report: FfiReport,
}

impl From<PredictionOutcome> for FfiPredictionOutcome {
    fn from(outcome: PredictionOutcome) -> Self {
        Self {
            guidance: outcome.guidance.guidance().map(|g| g.into()),
            guidance_error: outcome.guidance.error_message().map(String::from),
            record: outcome.record.into(),
            report: outcome.report.into(),
        }
    }
}
