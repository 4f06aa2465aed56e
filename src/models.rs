//! Data models for community assessments.
//!
//! This module contains the rubric structures (indicators and categories)
//! and the assessment record that is edited as a draft and persisted once
//! saved. Field names serialize in camelCase so stored records keep the
//! same shape as the browser version of the tool.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single measurable rubric item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Code, unique within its category (e.g. `A11`).
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// User-supplied value. `None` means not yet provided and serializes as `null`.
    pub value: Option<f64>,
    /// Unit the value is expressed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Longer explanation of the indicator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Indicator {
    /// Creates an unset indicator.
    pub fn new(code: &str, name: &str, unit: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            value: None,
            unit: Some(unit.to_string()),
            description: None,
        }
    }

    /// Whether a value has been provided.
    pub fn is_filled(&self) -> bool {
        self.value.is_some()
    }
}

/// A named, weighted group of indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// One of the fixed category letters.
    pub code: String,
    pub name: String,
    /// Share of the total score, in (0, 1].
    pub weight: f64,
    pub indicators: Vec<Indicator>,
    /// Cached score, written only when an assessment is finalized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Where the assessed community is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub province: String,
    pub city: String,
    pub district: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// `[lng, lat]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
}

/// One full evaluation of a community, draft or saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Empty while the assessment is a draft.
    pub id: String,
    pub name: String,
    pub location: Location,
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    /// `YYYY-MM-DD`
    pub assessment_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Assessment {
    /// Whether this record has been finalized.
    pub fn is_saved(&self) -> bool {
        !self.id.is_empty()
    }

    /// Looks up a category by code.
    pub fn category(&self, code: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.code == code)
    }

    /// Storage key for this record.
    pub fn storage_key(&self) -> String {
        storage_key(&self.id)
    }
}

/// Prefix shared by every persisted assessment key.
pub const KEY_PREFIX: &str = "assessment_";

/// Builds the store key for an assessment id.
pub fn storage_key(id: &str) -> String {
    format!("{}{}", KEY_PREFIX, id)
}

/// Qualitative band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// Below 40
    NeedsImprovement,
    /// 40 to below 60
    Fair,
    /// 60 to below 80
    Good,
    /// 80 and above
    Excellent,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Grade::Excellent
        } else if score >= 60.0 {
            Grade::Good
        } else if score >= 40.0 {
            Grade::Fair
        } else {
            Grade::NeedsImprovement
        }
    }

    /// Returns an emoji representation of the grade.
    pub fn emoji(&self) -> &'static str {
        match self {
            Grade::Excellent => "🟢",
            Grade::Good => "🟡",
            Grade::Fair => "🟠",
            Grade::NeedsImprovement => "🔴",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Excellent => write!(f, "Excellent"),
            Grade::Good => write!(f, "Good"),
            Grade::Fair => write!(f, "Fair"),
            Grade::NeedsImprovement => write!(f, "Needs improvement"),
        }
    }
}

/// How many indicators of a category have a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    pub filled: usize,
    pub total: usize,
}

impl fmt::Display for CategoryProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.filled, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Assessment {
        Assessment {
            id: String::new(),
            name: "Sunrise Garden".to_string(),
            location: Location {
                province: "Zhejiang".to_string(),
                city: "Hangzhou".to_string(),
                district: "Xihu".to_string(),
                address: None,
                coordinates: None,
            },
            categories: vec![Category {
                code: "A".to_string(),
                name: "Public space".to_string(),
                weight: 1.0,
                indicators: vec![Indicator::new("A11", "Leisure space", "分")],
                score: None,
            }],
            total_score: None,
            assessment_date: "2024-05-01".to_string(),
            assessor: None,
            notes: None,
        }
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::from_score(95.0), Grade::Excellent);
        assert_eq!(Grade::from_score(80.0), Grade::Excellent);
        assert_eq!(Grade::from_score(79.9), Grade::Good);
        assert_eq!(Grade::from_score(60.0), Grade::Good);
        assert_eq!(Grade::from_score(40.0), Grade::Fair);
        assert_eq!(Grade::from_score(0.0), Grade::NeedsImprovement);
    }

    #[test]
    fn test_grade_ordering() {
        assert!(Grade::NeedsImprovement < Grade::Fair);
        assert!(Grade::Good < Grade::Excellent);
    }

    #[test]
    fn test_unset_value_serializes_as_null() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"value\":null"));
        assert!(json.contains("\"assessmentDate\":\"2024-05-01\""));
        assert!(!json.contains("totalScore"));
    }

    #[test]
    fn test_parse_original_record_shape() {
        let raw = r#"{
            "id": "1717000000000",
            "name": "Lakeside",
            "location": {"province": "P", "city": "C", "district": "D", "address": "", "coordinates": [120.1, 30.2]},
            "categories": [{"code": "A", "name": "n", "weight": 0.125, "score": 85,
                "indicators": [{"code": "A11", "name": "x", "value": 80, "unit": "分"},
                               {"code": "A12", "name": "y", "value": null, "unit": "%"}]}],
            "totalScore": 10.6,
            "assessmentDate": "2024-05-30",
            "assessor": "",
            "notes": ""
        }"#;

        let record: Assessment = serde_json::from_str(raw).unwrap();
        assert!(record.is_saved());
        assert_eq!(record.total_score, Some(10.6));
        assert_eq!(record.location.coordinates, Some([120.1, 30.2]));
        assert_eq!(record.categories[0].indicators[0].value, Some(80.0));
        assert_eq!(record.categories[0].indicators[1].value, None);
        assert_eq!(record.storage_key(), "assessment_1717000000000");
    }

    #[test]
    fn test_draft_is_not_saved() {
        assert!(!sample().is_saved());
    }
}
