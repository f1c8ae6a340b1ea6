//! Built-in nearest-profile classifier.
//!
//! Each disease carries a characteristic symptom set. A selection is scored
//! against every profile by Jaccard similarity and the best profile wins;
//! equal scores keep the earlier profile.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::classifier::{check_features, Classifier, ModelError, ModelResult};
use crate::vocabulary::{SymptomVector, SymptomVocabulary, SYMPTOM_COUNT};

const BUILTIN_PROFILES: &str = include_str!("../data/disease_profiles.json");

static BUILTIN: LazyLock<Result<Arc<ProfileClassifier>, String>> = LazyLock::new(|| {
    ProfileClassifier::from_json_str(BUILTIN_PROFILES)
        .map(Arc::new)
        .map_err(|e| e.to_string())
});

/// One disease and its characteristic symptoms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseProfile {
    pub disease: String,
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone)]
struct IndexedProfile {
    disease: String,
    features: HashSet<usize>,
}

/// Nearest-profile classifier over the symptom vocabulary.
#[derive(Debug, Clone)]
pub struct ProfileClassifier {
    profiles: Vec<IndexedProfile>,
}

impl ProfileClassifier {
    /// Shared instance built from the embedded profile table.
    pub fn builtin() -> ModelResult<Arc<Self>> {
        BUILTIN
            .as_ref()
            .map(Arc::clone)
            .map_err(|e| ModelError::InvalidArtifact(e.clone()))
    }

    /// Build from profiles; every symptom must be a vocabulary entry.
    pub fn new(profiles: Vec<DiseaseProfile>) -> ModelResult<Self> {
        if profiles.is_empty() {
            return Err(ModelError::InvalidArtifact("no disease profiles".into()));
        }

        let vocab = SymptomVocabulary;
        let mut seen = HashSet::new();
        let mut indexed = Vec::with_capacity(profiles.len());

        for profile in profiles {
            if !seen.insert(profile.disease.clone()) {
                return Err(ModelError::InvalidArtifact(format!(
                    "duplicate profile for {}",
                    profile.disease
                )));
            }
            if profile.symptoms.is_empty() {
                return Err(ModelError::InvalidArtifact(format!(
                    "profile for {} has no symptoms",
                    profile.disease
                )));
            }

            let features = profile
                .symptoms
                .iter()
                .map(|s| {
                    vocab.index_of(s).ok_or_else(|| {
                        ModelError::InvalidArtifact(format!(
                            "profile for {} uses unknown symptom {}",
                            profile.disease, s
                        ))
                    })
                })
                .collect::<ModelResult<HashSet<_>>>()?;

            indexed.push(IndexedProfile {
                disease: profile.disease,
                features,
            });
        }

        Ok(Self { profiles: indexed })
    }

    /// Parse profiles from JSON text.
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        let profiles: Vec<DiseaseProfile> = serde_json::from_str(json)?;
        Self::new(profiles)
    }

    /// Load profiles from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Diseases known to the classifier, in table order.
    pub fn diseases(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.disease.as_str())
    }

    /// Best matching disease with its similarity score.
    pub fn best_match(&self, symptoms: &SymptomVector) -> ModelResult<(String, f64)> {
        check_features(symptoms, SYMPTOM_COUNT)?;

        let selected: HashSet<usize> = symptoms.active_indices().collect();
        let mut best: Option<(&IndexedProfile, f64)> = None;

        for profile in &self.profiles {
            let score = jaccard(&selected, &profile.features);
            if score > 0.0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((profile, score));
            }
        }

        best.map(|(profile, score)| (profile.disease.clone(), score))
            .ok_or(ModelError::NoPrediction)
    }
}

impl Classifier for ProfileClassifier {
    fn predict(&self, symptoms: &SymptomVector) -> ModelResult<String> {
        self.best_match(symptoms).map(|(disease, _)| disease)
    }

    fn name(&self) -> &str {
        "profile"
    }
}

fn jaccard(a: &HashSet<usize>, b: &HashSet<usize>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
