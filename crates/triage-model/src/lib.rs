//! Symptom vocabulary and disease classifiers for patient triage.
//!
//! A symptom selection is encoded into a fixed-length [`SymptomVector`] over
//! the ordered [`SYMPTOMS`] vocabulary and handed to a [`Classifier`], which
//! returns one disease label.
//!
//! Two classifiers ship with the crate:
//!
//! - [`ForestModel`]: decision-tree ensemble loaded from a JSON artifact
//! - [`ProfileClassifier`]: nearest-profile model over an embedded table

pub mod classifier;
pub mod forest;
pub mod profile;
pub mod vocabulary;

pub use classifier::*;
pub use forest::*;
pub use profile::*;
pub use vocabulary::*;
