//! Interaction flow: validate → classify → advise → persist → report.
//!
//! Each operation opens the visit store, runs to completion and drops the
//! connection. The insert is the only durable side effect, so a failure in
//! any step simply stops the flow.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use patient_triage_model::{Classifier, ModelError, ProfileClassifier, SymptomVocabulary};
use thiserror::Error;

use crate::advisor::{AdvisorError, DiseaseAdvisor};
use crate::db::{Database, DbError};
use crate::models::{Gender, GuidanceLookup, NewVisit, VisitRecord, VisitTimestamp};
use crate::report::{ReportDocument, ReportError, ReportFormatter, ReportSubject};

/// Fewest distinct symptoms accepted for a prediction.
pub const MIN_SYMPTOMS: usize = 3;

/// Youngest accepted age.
pub const MIN_AGE: i64 = 1;

/// Input problems reported back to the user. Nothing is stored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please ensure that the age is 1 or greater (got {age}).")]
    AgeTooLow { age: i64 },

    #[error("Age {age} is out of range.")]
    AgeOutOfRange { age: i64 },

    #[error("Please select at least {required} symptoms for a valid prediction (got {selected}).")]
    TooFewSymptoms { selected: usize, required: usize },

    #[error("Symptom names cannot contain commas: {name:?}")]
    InvalidSymptomName { name: String },
}

/// Errors from a triage interaction.
#[derive(Error, Debug)]
pub enum TriageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage failure: {0}")]
    Storage(#[from] DbError),

    #[error("Classifier failure: {0}")]
    Model(#[from] ModelError),

    #[error("Guidance table failure: {0}")]
    Advisor(#[from] AdvisorError),

    #[error("Report failure: {0}")]
    Report(#[from] ReportError),
}

pub type TriageResult<T> = Result<T, TriageError>;

/// Patient input for one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitRequest {
    pub name: String,
    /// Raw age as entered; validated before use
    pub age: i64,
    pub gender: Gender,
    pub contact_info: String,
    /// Selected symptoms in input order
    pub symptoms: Vec<String>,
    /// Defaults to now
    pub visit_date: Option<VisitTimestamp>,
}

/// Everything produced by a successful prediction.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    /// The stored visit
    pub record: VisitRecord,
    /// Guidance for the predicted disease, or a miss
    pub guidance: GuidanceLookup,
    /// Rendered report
    pub report: ReportDocument,
}

/// Orchestrates a triage interaction against a file-backed visit store.
pub struct InteractionController {
    store_path: PathBuf,
    classifier: Arc<dyn Classifier>,
    advisor: Arc<DiseaseAdvisor>,
    formatter: ReportFormatter,
    vocabulary: SymptomVocabulary,
}

impl InteractionController {
    /// Create a controller from its collaborators.
    pub fn new(
        store_path: impl Into<PathBuf>,
        classifier: Arc<dyn Classifier>,
        advisor: Arc<DiseaseAdvisor>,
    ) -> Self {
        Self {
            store_path: store_path.into(),
            classifier,
            advisor,
            formatter: ReportFormatter::default(),
            vocabulary: SymptomVocabulary,
        }
    }

    /// Controller using the built-in classifier and guidance table.
    pub fn with_builtins(store_path: impl Into<PathBuf>) -> TriageResult<Self> {
        let classifier: Arc<dyn Classifier> = ProfileClassifier::builtin()?;
        Ok(Self::new(store_path, classifier, DiseaseAdvisor::builtin()?))
    }

    /// Use a different report formatter.
    pub fn with_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Create the visit table if it does not exist yet.
    pub fn initialize_store(&self) -> TriageResult<()> {
        Database::open(&self.store_path)?;
        Ok(())
    }

    /// Check a request without touching the store or the classifier.
    pub fn validate(&self, request: &VisitRequest) -> Result<u32, ValidationError> {
        if request.age < MIN_AGE {
            return Err(ValidationError::AgeTooLow { age: request.age });
        }
        let age = u32::try_from(request.age)
            .map_err(|_| ValidationError::AgeOutOfRange { age: request.age })?;

        // Stored symptoms are comma-joined
        if let Some(name) = request.symptoms.iter().find(|s| s.contains(',')) {
            return Err(ValidationError::InvalidSymptomName { name: name.clone() });
        }

        // Only names the encoder will set count towards the minimum
        let selected = request
            .symptoms
            .iter()
            .map(String::as_str)
            .filter(|s| self.vocabulary.contains(s))
            .collect::<HashSet<_>>()
            .len();
        if selected < MIN_SYMPTOMS {
            return Err(ValidationError::TooFewSymptoms {
                selected,
                required: MIN_SYMPTOMS,
            });
        }

        Ok(age)
    }

    /// Run a full prediction interaction.
    ///
    /// A guidance miss does not stop the flow: the visit is stored and the
    /// report notes the miss.
    pub fn predict(&self, request: VisitRequest) -> TriageResult<PredictionOutcome> {
        let age = self.validate(&request)?;

        let unknown = self.vocabulary.unknown(&request.symptoms);
        if !unknown.is_empty() {
            tracing::warn!(?unknown, "ignoring symptoms outside the vocabulary");
        }
        let features = self.vocabulary.encode(&request.symptoms);

        let disease = self.classifier.predict(&features)?;
        tracing::debug!(classifier = self.classifier.name(), %disease, "classified");

        let guidance = self.advisor.lookup(&disease);
        if !guidance.is_found() {
            tracing::warn!(%disease, "no guidance for predicted disease");
        }

        let visit_date = request.visit_date.unwrap_or_else(VisitTimestamp::now);
        let visit = NewVisit {
            name: request.name,
            age,
            gender: request.gender,
            contact_info: request.contact_info,
            symptoms: request.symptoms,
            predicted_disease: disease,
            visit_date: Some(visit_date),
        };

        let id = Database::open(&self.store_path)?.insert_visit(&visit)?;
        let record = VisitRecord {
            id,
            name: visit.name,
            age: visit.age,
            gender: visit.gender,
            contact_info: visit.contact_info,
            symptoms: visit.symptoms,
            predicted_disease: visit.predicted_disease,
            visit_date,
        };

        let report = self.formatter.render(
            &ReportSubject::from(&record),
            &record.predicted_disease,
            &guidance,
        )?;

        tracing::info!(id, disease = %record.predicted_disease, "prediction recorded");
        Ok(PredictionOutcome {
            record,
            guidance,
            report,
        })
    }

    /// Visit history for an exact name, most recent first.
    pub fn history(&self, name: &str) -> TriageResult<Vec<VisitRecord>> {
        Ok(Database::open(&self.store_path)?.visits_by_name(name)?)
    }

    /// Guidance for a disease label.
    pub fn guidance(&self, disease: &str) -> GuidanceLookup {
        self.advisor.lookup(disease)
    }

    /// The ordered symptom vocabulary offered for selection.
    pub fn symptom_vocabulary(&self) -> &'static [&'static str] {
        self.vocabulary.all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patient_triage_model::{ModelResult, SymptomVector};

    /// Classifier returning a fixed label.
    struct FixedClassifier(&'static str);

    impl Classifier for FixedClassifier {
        fn predict(&self, _symptoms: &SymptomVector) -> ModelResult<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn controller(dir: &tempfile::TempDir, label: &'static str) -> InteractionController {
        InteractionController::new(
            dir.path().join("patient_data.db"),
            Arc::new(FixedClassifier(label)),
            DiseaseAdvisor::builtin().unwrap(),
        )
    }

    fn request(age: i64, symptoms: &[&str]) -> VisitRequest {
        VisitRequest {
            name: "John Doe".into(),
            age,
            gender: Gender::Male,
            contact_info: "j@x.com".into(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            visit_date: None,
        }
    }

    #[test]
    fn test_validate_age() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir, "Flu");

        let err = ctl.validate(&request(0, &["cough", "chills", "headache"])).unwrap_err();
        assert_eq!(err, ValidationError::AgeTooLow { age: 0 });

        let err = ctl.validate(&request(-4, &["cough", "chills", "headache"])).unwrap_err();
        assert_eq!(err, ValidationError::AgeTooLow { age: -4 });

        let err = ctl
            .validate(&request(i64::MAX, &["cough", "chills", "headache"]))
            .unwrap_err();
        assert!(matches!(err, ValidationError::AgeOutOfRange { .. }));

        assert_eq!(ctl.validate(&request(1, &["cough", "chills", "headache"])), Ok(1));
    }

    #[test]
    fn test_validate_symptom_count() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir, "Flu");

        let err = ctl.validate(&request(30, &["cough", "chills"])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooFewSymptoms {
                selected: 2,
                required: 3
            }
        );

        // Repeats, blanks and names outside the vocabulary do not count
        let err = ctl
            .validate(&request(30, &["cough", "cough", " ", "chills"]))
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooFewSymptoms { selected: 2, .. }));

        let err = ctl
            .validate(&request(30, &["cough", "chills", " headache", "fever"]))
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooFewSymptoms { selected: 2, .. }));

        assert_eq!(
            ctl.validate(&request(30, &["cough", "chills", "headache", "fever"])),
            Ok(30)
        );
    }

    #[test]
    fn test_unknown_symptoms_alone_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir, "Flu");
        ctl.initialize_store().unwrap();

        let result = ctl.predict(request(30, &["foo", "bar", "baz"]));
        assert!(matches!(
            result,
            Err(TriageError::Validation(ValidationError::TooFewSymptoms {
                selected: 0,
                required: 3
            }))
        ));
        assert!(ctl.history("John Doe").unwrap().is_empty());
    }

    #[test]
    fn test_symptom_with_separator_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir, "Flu");
        ctl.initialize_store().unwrap();

        let result = ctl.predict(request(
            30,
            &["cough", "chills", "headache", "pain, left side"],
        ));
        assert!(matches!(
            result,
            Err(TriageError::Validation(ValidationError::InvalidSymptomName { ref name, .. }))
                if name == "pain, left side"
        ));
        assert!(ctl.history("John Doe").unwrap().is_empty());
    }

    #[test]
    fn test_validation_failure_has_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir, "Flu");

        let result = ctl.predict(request(30, &["cough"]));
        assert!(matches!(result, Err(TriageError::Validation(_))));
        assert!(!ctl.store_path().exists());
    }

    #[test]
    fn test_predict_records_visit() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir, "Flu");

        let outcome = ctl
            .predict(request(30, &["chills", "cough", "high_fever"]))
            .unwrap();

        assert_eq!(outcome.record.predicted_disease, "Flu");
        assert!(outcome.guidance.is_found());
        assert_eq!(outcome.report.file_name, "patient_report.txt");

        let history = ctl.history("John Doe").unwrap();
        assert_eq!(history, vec![outcome.record]);
    }

    #[test]
    fn test_lookup_miss_still_persists() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir, "Unlisted Disease");

        let outcome = ctl
            .predict(request(30, &["chills", "cough", "high_fever"]))
            .unwrap();

        assert!(!outcome.guidance.is_found());
        assert_eq!(ctl.history("John Doe").unwrap().len(), 1);

        let text = String::from_utf8(outcome.report.bytes).unwrap();
        assert!(text.contains("Disease not found in the dataset"));
    }

    #[test]
    fn test_classifier_failure_aborts_before_insert() {
        struct Failing;
        impl Classifier for Failing {
            fn predict(&self, _symptoms: &SymptomVector) -> ModelResult<String> {
                Err(ModelError::NoPrediction)
            }
            fn name(&self) -> &str {
                "failing"
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let ctl = InteractionController::new(
            dir.path().join("patient_data.db"),
            Arc::new(Failing),
            DiseaseAdvisor::builtin().unwrap(),
        );

        let result = ctl.predict(request(30, &["coma", "blister", "palpitations"]));
        assert!(matches!(result, Err(TriageError::Model(ModelError::NoPrediction))));
        assert!(ctl.history("John Doe").unwrap().is_empty());
    }

    #[test]
    fn test_storage_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file
        let ctl = InteractionController::new(
            dir.path(),
            Arc::new(FixedClassifier("Flu")),
            DiseaseAdvisor::builtin().unwrap(),
        );

        let result = ctl.predict(request(30, &["chills", "cough", "high_fever"]));
        assert!(matches!(result, Err(TriageError::Storage(_))));
    }
}
