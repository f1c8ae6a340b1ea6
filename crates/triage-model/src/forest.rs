//! Decision-tree ensemble loaded from a JSON artifact.
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "feature_count": 132,
//!   "labels": ["Flu", "Common Cold"],
//!   "trees": [
//!     { "nodes": [
//!         { "split": { "feature": 25, "absent": 1, "present": 2 } },
//!         { "leaf": { "label": 1 } },
//!         { "leaf": { "label": 0 } }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Node 0 is the root of each tree. Every tree casts one vote; the label with
//! the most votes wins and ties go to the lowest label index.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::{check_features, Classifier, ModelError, ModelResult};
use crate::vocabulary::SymptomVector;

/// Serialized forest artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestArtifact {
    pub feature_count: usize,
    pub labels: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

/// A single tree as a flat node list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Tree node: either a test on one feature or a terminal label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        /// Next node when the feature is not set
        absent: usize,
        /// Next node when the feature is set
        present: usize,
    },
    Leaf {
        label: usize,
    },
}

/// Validated forest ready for inference.
#[derive(Debug, Clone)]
pub struct ForestModel {
    artifact: ForestArtifact,
}

impl ForestModel {
    /// Validate an artifact and build the model.
    pub fn new(artifact: ForestArtifact) -> ModelResult<Self> {
        validate(&artifact)?;
        Ok(Self { artifact })
    }

    /// Parse an artifact from JSON text.
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        let artifact: ForestArtifact = serde_json::from_str(json)?;
        Self::new(artifact)
    }

    /// Load an artifact from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Labels the model can emit.
    pub fn labels(&self) -> &[String] {
        &self.artifact.labels
    }

    /// Number of trees in the ensemble.
    pub fn tree_count(&self) -> usize {
        self.artifact.trees.len()
    }

    /// Expected input length.
    pub fn feature_count(&self) -> usize {
        self.artifact.feature_count
    }

    /// Per-label vote counts for an input.
    pub fn votes(&self, symptoms: &SymptomVector) -> ModelResult<Vec<usize>> {
        check_features(symptoms, self.artifact.feature_count)?;

        let mut votes = vec![0usize; self.artifact.labels.len()];
        for tree in &self.artifact.trees {
            votes[evaluate(tree, symptoms)?] += 1;
        }
        Ok(votes)
    }
}

impl Classifier for ForestModel {
    fn predict(&self, symptoms: &SymptomVector) -> ModelResult<String> {
        let votes = self.votes(symptoms)?;

        // max_by_key keeps the last maximum, so walk in reverse to favour low indices
        let winner = votes
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|&(_, &count)| count)
            .map(|(index, _)| index)
            .ok_or(ModelError::NoPrediction)?;

        Ok(self.artifact.labels[winner].clone())
    }

    fn name(&self) -> &str {
        "forest"
    }
}

/// Walk one tree from the root to a leaf.
fn evaluate(tree: &DecisionTree, symptoms: &SymptomVector) -> ModelResult<usize> {
    let mut index = 0;
    // A well-formed tree reaches a leaf in fewer steps than it has nodes
    for _ in 0..tree.nodes.len() {
        match &tree.nodes[index] {
            TreeNode::Leaf { label } => return Ok(*label),
            TreeNode::Split {
                feature,
                absent,
                present,
            } => {
                index = if symptoms.is_set(*feature) {
                    *present
                } else {
                    *absent
                };
            }
        }
    }
    Err(ModelError::InvalidArtifact(
        "tree traversal did not reach a leaf (cycle in nodes)".into(),
    ))
}

fn validate(artifact: &ForestArtifact) -> ModelResult<()> {
    if artifact.feature_count == 0 {
        return Err(ModelError::InvalidArtifact("feature_count must be positive".into()));
    }
    if artifact.labels.is_empty() {
        return Err(ModelError::InvalidArtifact("no labels".into()));
    }
    if artifact.trees.is_empty() {
        return Err(ModelError::InvalidArtifact("no trees".into()));
    }

    for (t, tree) in artifact.trees.iter().enumerate() {
        if tree.nodes.is_empty() {
            return Err(ModelError::InvalidArtifact(format!("tree {} is empty", t)));
        }
        for (n, node) in tree.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { label } if *label >= artifact.labels.len() => {
                    return Err(ModelError::InvalidArtifact(format!(
                        "tree {} node {}: label {} out of range",
                        t, n, label
                    )));
                }
                TreeNode::Split {
                    feature,
                    absent,
                    present,
                } => {
                    if *feature >= artifact.feature_count {
                        return Err(ModelError::InvalidArtifact(format!(
                            "tree {} node {}: feature {} out of range",
                            t, n, feature
                        )));
                    }
                    if *absent >= tree.nodes.len() || *present >= tree.nodes.len() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "tree {} node {}: child index out of range",
                            t, n
                        )));
                    }
                }
                TreeNode::Leaf { .. } => {}
            }
        }
    }
    Ok(())
}
