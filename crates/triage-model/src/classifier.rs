//! Classifier contract shared by every disease model.

use thiserror::Error;

use crate::vocabulary::SymptomVector;

/// Model loading and inference errors.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("Model produced no prediction for the given symptoms")]
    NoPrediction,
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Maps a symptom vector to a single disease label.
pub trait Classifier: Send + Sync {
    /// Predict the most likely disease.
    fn predict(&self, symptoms: &SymptomVector) -> ModelResult<String>;

    /// Short human-readable name used in logs.
    fn name(&self) -> &str;
}

/// Reject vectors that do not match the expected feature count.
pub(crate) fn check_features(symptoms: &SymptomVector, expected: usize) -> ModelResult<()> {
    if symptoms.len() != expected {
        return Err(ModelError::FeatureMismatch {
            expected,
            actual: symptoms.len(),
        });
    }
    Ok(())
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict(&self, symptoms: &SymptomVector) -> ModelResult<String> {
        (**self).predict(symptoms)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
