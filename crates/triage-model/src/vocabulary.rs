//! Symptom vocabulary and feature encoding.
//!
//! The classifier input is a fixed-length boolean vector over an ordered
//! vocabulary. Position `i` is set when vocabulary entry `i` was selected.
//! The order is part of the model contract and must never change.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a vocabulary entry to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// The ordered symptom vocabulary the classifiers are trained against.
///
/// Entries are kept verbatim, including the irregular ones
/// (`dischromic _patches`, `fluid_overload.1`), because they are feature names.
pub const SYMPTOMS: &[&str] = &[
    "itching", "skin_rash", "nodal_skin_eruptions", "continuous_sneezing", "shivering", "chills",
    "joint_pain", "stomach_pain", "acidity", "ulcers_on_tongue", "muscle_wasting", "vomiting",
    "burning_micturition", "spotting_urination", "fatigue", "weight_gain", "anxiety",
    "cold_hands_and_feets", "mood_swings", "weight_loss", "restlessness", "lethargy",
    "patches_in_throat", "irregular_sugar_level", "cough", "high_fever", "sunken_eyes",
    "breathlessness", "sweating", "dehydration", "indigestion", "headache", "yellowish_skin",
    "dark_urine", "nausea", "loss_of_appetite", "pain_behind_the_eyes", "back_pain",
    "constipation", "abdominal_pain", "diarrhoea", "mild_fever", "yellow_urine",
    "yellowing_of_eyes", "acute_liver_failure", "fluid_overload", "swelling_of_stomach",
    "swelled_lymph_nodes", "malaise", "blurred_and_distorted_vision", "phlegm",
    "throat_irritation", "redness_of_eyes", "sinus_pressure", "runny_nose", "congestion",
    "chest_pain", "weakness_in_limbs", "fast_heart_rate", "pain_during_bowel_movements",
    "pain_in_anal_region", "bloody_stool", "irritation_in_anus", "neck_pain", "dizziness",
    "cramps", "bruising", "obesity", "swollen_legs", "swollen_blood_vessels",
    "puffy_face_and_eyes", "enlarged_thyroid", "brittle_nails", "swollen_extremeties",
    "excessive_hunger", "extra_marital_contacts", "drying_and_tingling_lips", "slurred_speech",
    "knee_pain", "hip_joint_pain", "muscle_weakness", "stiff_neck", "swelling_joints",
    "movement_stiffness", "spinning_movements", "loss_of_balance", "unsteadiness",
    "weakness_of_one_body_side", "loss_of_smell", "bladder_discomfort", "foul_smell_of_urine",
    "continuous_feel_of_urine", "passage_of_gases", "internal_itching", "toxic_look_(typhos)",
    "depression", "irritability", "muscle_pain", "altered_sensorium", "red_spots_over_body",
    "belly_pain", "abnormal_menstruation", "dischromic _patches", "watering_from_eyes",
    "increased_appetite", "polyuria", "family_history", "mucoid_sputum", "rusty_sputum",
    "lack_of_concentration", "visual_disturbances", "receiving_blood_transfusion",
    "receiving_unsterile_injections", "coma", "stomach_bleeding", "distention_of_abdomen",
    "history_of_alcohol_consumption", "fluid_overload.1", "blood_in_sputum",
    "prominent_veins_on_calf", "palpitations", "painful_walking", "pus_filled_pimples",
    "blackheads", "scurring", "skin_peeling", "silver_like_dusting", "small_dents_in_nails",
    "inflammatory_nails", "blister", "red_sore_around_nose", "yellow_crust_ooze",
];

/// Number of features in a [`SymptomVector`].
pub const SYMPTOM_COUNT: usize = SYMPTOMS.len();

/// Fixed-length boolean encoding of a symptom selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomVector {
    features: Vec<bool>,
}

impl SymptomVector {
    /// Wrap raw features. Length is checked by the classifier, not here.
    pub fn from_features(features: Vec<bool>) -> Self {
        Self { features }
    }

    /// Feature values in vocabulary order.
    pub fn features(&self) -> &[bool] {
        &self.features
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Whether feature `index` is set. Out-of-range indices read as absent.
    pub fn is_set(&self, index: usize) -> bool {
        self.features.get(index).copied().unwrap_or(false)
    }

    /// Indices of all set features.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.features
            .iter()
            .enumerate()
            .filter_map(|(i, &set)| set.then_some(i))
    }

    /// Number of set features.
    pub fn active_count(&self) -> usize {
        self.features.iter().filter(|&&set| set).count()
    }
}

/// Lookup helpers over the symptom vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymptomVocabulary;

impl SymptomVocabulary {
    /// All symptom names in feature order.
    pub fn all(&self) -> &'static [&'static str] {
        SYMPTOMS
    }

    /// Feature index of a symptom name (exact match).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        SYMPTOMS.iter().position(|s| *s == name)
    }

    /// Check if a symptom name is part of the vocabulary.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Encode a selection into a feature vector.
    ///
    /// Unknown names are skipped; selecting the same symptom twice sets the
    /// feature once.
    pub fn encode<S: AsRef<str>>(&self, selected: &[S]) -> SymptomVector {
        let mut features = vec![false; SYMPTOM_COUNT];
        for name in selected {
            if let Some(index) = self.index_of(name.as_ref()) {
                features[index] = true;
            }
        }
        SymptomVector { features }
    }

    /// Names in `selected` that are not part of the vocabulary, in input order.
    pub fn unknown<'a, S: AsRef<str>>(&self, selected: &'a [S]) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        selected
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !self.contains(name) && seen.insert(*name))
            .collect()
    }

    /// Closest vocabulary entries for a possibly misspelled name, best first.
    pub fn suggest(&self, name: &str, limit: usize) -> Vec<&'static str> {
        let needle = name.trim().to_lowercase().replace([' ', '-'], "_");
        let mut scored: Vec<(f64, &'static str)> = SYMPTOMS
            .iter()
            .map(|s| (jaro_winkler(&needle, s), *s))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(limit).map(|(_, s)| s).collect()
    }
}
