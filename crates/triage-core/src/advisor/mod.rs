//! Diet and medication guidance lookup.
//!
//! The reference table maps a disease label to its guidance. It is loaded once
//! and only read afterwards; the built-in table is shared process-wide.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use thiserror::Error;

use crate::models::{DiseaseGuidance, GuidanceLookup};

const BUILTIN_TABLE: &str = include_str!("../../data/diet_guidance.json");

static BUILTIN: LazyLock<Result<Arc<DiseaseAdvisor>, String>> = LazyLock::new(|| {
    DiseaseAdvisor::from_json_str(BUILTIN_TABLE)
        .map(Arc::new)
        .map_err(|e| e.to_string())
});

/// Reference table errors.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read guidance table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid guidance table: {0}")]
    InvalidTable(String),
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;

/// Immutable disease → guidance table.
#[derive(Debug, Clone)]
pub struct DiseaseAdvisor {
    entries: HashMap<String, DiseaseGuidance>,
    /// Disease names in table order
    order: Vec<String>,
}

impl DiseaseAdvisor {
    /// Shared instance built from the embedded table.
    pub fn builtin() -> AdvisorResult<Arc<Self>> {
        BUILTIN
            .as_ref()
            .map(Arc::clone)
            .map_err(|e| AdvisorError::InvalidTable(e.clone()))
    }

    /// Build from table rows.
    ///
    /// Rejects duplicate diseases and rows with a blank required field, so a
    /// successful lookup always carries every required field.
    pub fn new(rows: Vec<DiseaseGuidance>) -> AdvisorResult<Self> {
        let mut entries = HashMap::with_capacity(rows.len());
        let mut order = Vec::with_capacity(rows.len());

        for row in rows {
            let blank = row.blank_fields();
            if !blank.is_empty() {
                return Err(AdvisorError::InvalidTable(format!(
                    "{:?}: blank {}",
                    row.disease,
                    blank.join(", ")
                )));
            }
            if entries.contains_key(&row.disease) {
                return Err(AdvisorError::InvalidTable(format!(
                    "duplicate disease {:?}",
                    row.disease
                )));
            }
            order.push(row.disease.clone());
            entries.insert(row.disease.clone(), row);
        }

        Ok(Self { entries, order })
    }

    /// Parse a table from JSON text (an array of rows).
    pub fn from_json_str(json: &str) -> AdvisorResult<Self> {
        let rows: Vec<DiseaseGuidance> = serde_json::from_str(json)?;
        Self::new(rows)
    }

    /// Load a table from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> AdvisorResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Look up guidance by exact disease label.
    pub fn lookup(&self, disease: &str) -> GuidanceLookup {
        match self.entries.get(disease) {
            Some(guidance) => GuidanceLookup::Found(guidance.clone()),
            None => GuidanceLookup::NotFound {
                disease: disease.to_string(),
            },
        }
    }

    /// Diseases covered by the table, in table order.
    pub fn diseases(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(disease: &str, tips: Option<&str>) -> DiseaseGuidance {
        DiseaseGuidance {
            disease: disease.into(),
            suggested_diet: "Light meals".into(),
            foods_to_eat: "Soup".into(),
            foods_to_avoid: "Fried food".into(),
            medication: "Rest".into(),
            additional_tips: tips.map(String::from),
        }
    }

    #[test]
    fn test_builtin_flu_fully_populated() {
        let advisor = DiseaseAdvisor::builtin().unwrap();

        let lookup = advisor.lookup("Flu");
        let guidance = lookup.guidance().expect("Flu is in the built-in table");
        assert_eq!(guidance.disease, "Flu");
        assert!(!guidance.suggested_diet.is_empty());
        assert!(!guidance.foods_to_eat.is_empty());
        assert!(!guidance.foods_to_avoid.is_empty());
        assert!(!guidance.medication.is_empty());
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = DiseaseAdvisor::builtin().unwrap();
        let b = DiseaseAdvisor::builtin().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_missing_disease_not_found() {
        let advisor = DiseaseAdvisor::builtin().unwrap();

        let lookup = advisor.lookup("Dragon pox");
        assert_eq!(
            lookup,
            GuidanceLookup::NotFound {
                disease: "Dragon pox".into()
            }
        );
    }

    #[test]
    fn test_lookup_is_exact() {
        let advisor = DiseaseAdvisor::new(vec![row("Flu", None)]).unwrap();
        assert!(advisor.lookup("Flu").is_found());
        assert!(!advisor.lookup("flu").is_found());
        assert!(!advisor.lookup("Flu ").is_found());
    }

    #[test]
    fn test_optional_tips() {
        let advisor = DiseaseAdvisor::builtin().unwrap();
        let lookup = advisor.lookup("Psoriasis");
        let guidance = lookup.guidance().unwrap();
        assert_eq!(guidance.additional_tips, None);
    }

    #[test]
    fn test_rejects_duplicates_and_blanks() {
        let dup = DiseaseAdvisor::new(vec![row("Flu", None), row("Flu", Some("x"))]);
        assert!(matches!(dup, Err(AdvisorError::InvalidTable(_))));

        let mut blank = row("Flu", None);
        blank.medication = String::new();
        assert!(DiseaseAdvisor::new(vec![blank]).is_err());
    }

    #[test]
    fn test_table_order_preserved() {
        let advisor = DiseaseAdvisor::new(vec![row("B", None), row("A", None)]).unwrap();
        assert_eq!(advisor.diseases().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(advisor.len(), 2);
    }
}
