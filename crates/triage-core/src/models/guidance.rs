//! Diet and medication guidance models.

use serde::{Deserialize, Serialize};

/// Shown when a disease has no additional tips.
pub const NO_ADDITIONAL_TIPS: &str = "No additional tips available.";

/// Shown when a predicted disease is missing from the reference table.
pub const DISEASE_NOT_FOUND: &str = "Disease not found in the dataset";

/// Guidance for one disease. Field names follow the reference table columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiseaseGuidance {
    #[serde(rename = "Disease")]
    pub disease: String,
    #[serde(rename = "Suggested Diet")]
    pub suggested_diet: String,
    #[serde(rename = "Foods to Eat")]
    pub foods_to_eat: String,
    #[serde(rename = "Foods to Avoid")]
    pub foods_to_avoid: String,
    #[serde(rename = "Medication")]
    pub medication: String,
    #[serde(
        rename = "Additional Tips",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_tips: Option<String>,
}

impl DiseaseGuidance {
    /// Tips text, falling back to the standard placeholder.
    pub fn tips_or_default(&self) -> &str {
        self.additional_tips.as_deref().unwrap_or(NO_ADDITIONAL_TIPS)
    }

    /// Names of required fields that are blank.
    pub fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("Disease", &self.disease),
            ("Suggested Diet", &self.suggested_diet),
            ("Foods to Eat", &self.foods_to_eat),
            ("Foods to Avoid", &self.foods_to_avoid),
            ("Medication", &self.medication),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Result of looking up a disease in the reference table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GuidanceLookup {
    Found(DiseaseGuidance),
    NotFound { disease: String },
}

impl GuidanceLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, GuidanceLookup::Found(_))
    }

    /// The guidance, if found.
    pub fn guidance(&self) -> Option<&DiseaseGuidance> {
        match self {
            GuidanceLookup::Found(guidance) => Some(guidance),
            GuidanceLookup::NotFound { .. } => None,
        }
    }

    /// User-facing message for a miss.
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            GuidanceLookup::Found(_) => None,
            GuidanceLookup::NotFound { .. } => Some(DISEASE_NOT_FOUND),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_without_tips() {
        let json = r#"{
            "Disease": "Psoriasis",
            "Suggested Diet": "Anti-inflammatory diet",
            "Foods to Eat": "Fish, leafy greens",
            "Foods to Avoid": "Alcohol, red meat",
            "Medication": "Topical corticosteroids"
        }"#;

        let guidance: DiseaseGuidance = serde_json::from_str(json).unwrap();
        assert_eq!(guidance.additional_tips, None);
        assert_eq!(guidance.tips_or_default(), NO_ADDITIONAL_TIPS);
        assert!(guidance.blank_fields().is_empty());
    }

    #[test]
    fn test_blank_fields_reported() {
        let guidance = DiseaseGuidance {
            disease: "Flu".into(),
            suggested_diet: " ".into(),
            foods_to_eat: "Soup".into(),
            foods_to_avoid: "".into(),
            medication: "Rest".into(),
            additional_tips: None,
        };
        assert_eq!(guidance.blank_fields(), vec!["Suggested Diet", "Foods to Avoid"]);
    }

    #[test]
    fn test_lookup_not_found_message() {
        let miss = GuidanceLookup::NotFound {
            disease: "Unknown".into(),
        };
        assert!(!miss.is_found());
        assert!(miss.guidance().is_none());
        assert_eq!(miss.error_message(), Some(DISEASE_NOT_FOUND));
    }
}
