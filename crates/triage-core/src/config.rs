//! Runtime configuration.
//!
//! Resolved once by the front end at startup and handed to the core. The core
//! never reads environment variables itself.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use patient_triage_model::{Classifier, ForestModel, ModelError, ProfileClassifier, SYMPTOM_COUNT};

use crate::advisor::DiseaseAdvisor;
use crate::controller::{InteractionController, TriageResult};
use crate::report::{ReportFormat, ReportFormatter};

/// Default visit store file name.
pub const DEFAULT_STORE_PATH: &str = "patient_data.db";

/// Where the store and reference data live, and how reports are rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriageConfig {
    store_path: PathBuf,
    model_path: Option<PathBuf>,
    profiles_path: Option<PathBuf>,
    guidance_path: Option<PathBuf>,
    report_format: ReportFormat,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_PATH)
    }
}

impl TriageConfig {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            model_path: None,
            profiles_path: None,
            guidance_path: None,
            report_format: ReportFormat::default(),
        }
    }

    /// Use a forest artifact instead of the built-in classifier.
    pub fn with_model_path(mut self, path: Option<PathBuf>) -> Self {
        self.model_path = path;
        self
    }

    /// Use a disease profile table instead of the built-in one.
    ///
    /// Ignored when a forest artifact is configured.
    pub fn with_profiles_path(mut self, path: Option<PathBuf>) -> Self {
        self.profiles_path = path;
        self
    }

    /// Use a guidance table file instead of the built-in table.
    pub fn with_guidance_path(mut self, path: Option<PathBuf>) -> Self {
        self.guidance_path = path;
        self
    }

    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.report_format = format;
        self
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    pub fn profiles_path(&self) -> Option<&Path> {
        self.profiles_path.as_deref()
    }

    pub fn guidance_path(&self) -> Option<&Path> {
        self.guidance_path.as_deref()
    }

    pub fn report_format(&self) -> ReportFormat {
        self.report_format
    }

    /// Load the configured collaborators and build a controller.
    pub fn build(&self) -> TriageResult<InteractionController> {
        let classifier: Arc<dyn Classifier> = match &self.model_path {
            Some(path) => {
                let model = ForestModel::from_path(path)?;
                if model.feature_count() != SYMPTOM_COUNT {
                    return Err(ModelError::FeatureMismatch {
                        expected: SYMPTOM_COUNT,
                        actual: model.feature_count(),
                    }
                    .into());
                }
                tracing::info!(path = %path.display(), trees = model.tree_count(), "loaded forest model");
                Arc::new(model)
            }
            None => match &self.profiles_path {
                Some(path) => {
                    let profiles = ProfileClassifier::from_path(path)?;
                    tracing::info!(path = %path.display(), diseases = profiles.diseases().count(), "loaded disease profiles");
                    Arc::new(profiles)
                }
                None => ProfileClassifier::builtin()?,
            },
        };

        let advisor = match &self.guidance_path {
            Some(path) => {
                let advisor = DiseaseAdvisor::from_path(path)?;
                tracing::info!(path = %path.display(), diseases = advisor.len(), "loaded guidance table");
                Arc::new(advisor)
            }
            None => DiseaseAdvisor::builtin()?,
        };

        Ok(
            InteractionController::new(self.store_path.clone(), classifier, advisor)
                .with_formatter(ReportFormatter::new(self.report_format)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::TriageError;

    #[test]
    fn test_defaults() {
        let config = TriageConfig::default();
        assert_eq!(config.store_path(), Path::new(DEFAULT_STORE_PATH));
        assert!(config.model_path().is_none());
        assert_eq!(config.report_format(), ReportFormat::Text);

        let controller = config.build().unwrap();
        assert_eq!(controller.classifier_name(), "profile");
    }

    #[test]
    fn test_forest_feature_count_must_match_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        std::fs::write(
            &model_path,
            r#"{"feature_count": 4, "labels": ["Flu"], "trees": [{"nodes": [{"leaf": {"label": 0}}]}]}"#,
        )
        .unwrap();

        let config = TriageConfig::new(dir.path().join("visits.db")).with_model_path(Some(model_path));
        assert!(matches!(
            config.build(),
            Err(TriageError::Model(ModelError::FeatureMismatch { .. }))
        ));
    }

    #[test]
    fn test_profiles_file_replaces_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let profiles_path = dir.path().join("profiles.json");
        std::fs::write(
            &profiles_path,
            r#"[{"disease": "Allergy", "symptoms": ["continuous_sneezing", "shivering", "chills"]}]"#,
        )
        .unwrap();

        let config = TriageConfig::new(dir.path().join("visits.db"))
            .with_profiles_path(Some(profiles_path.clone()));
        assert_eq!(config.profiles_path(), Some(profiles_path.as_path()));

        let controller = config.build().unwrap();
        let outcome = controller
            .predict(crate::controller::VisitRequest {
                name: "Ann".into(),
                age: 30,
                gender: crate::models::Gender::Female,
                contact_info: String::new(),
                symptoms: vec!["cough".into(), "headache".into(), "chills".into()],
                visit_date: None,
            })
            .unwrap();
        assert_eq!(outcome.record.predicted_disease, "Allergy");

        let bad = TriageConfig::new(dir.path().join("visits.db"))
            .with_profiles_path(Some(dir.path().join("missing.json")));
        assert!(matches!(bad.build(), Err(TriageError::Model(ModelError::Io(_)))));
    }

    #[test]
    fn test_missing_guidance_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = TriageConfig::new(dir.path().join("visits.db"))
            .with_guidance_path(Some(dir.path().join("missing.json")));
        assert!(matches!(config.build(), Err(TriageError::Advisor(_))));
    }
}
