use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bumped whenever dictionaries or formulas change, so stored analyses can be told apart.
pub const EXTRACTOR_VERSION: &str = "1.0.0";

// ────────────────────────────────────────────────────────────────────────────
// Shared enums
// ────────────────────────────────────────────────────────────────────────────

/// Category of a job-side parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterCategory {
    Technical,
    Leadership,
    Domain,
    Soft,
    Location,
    Company,
}

/// Category of a CV-side parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvCategory {
    Technical,
    Leadership,
    Domain,
    Soft,
    Experience,
    Education,
}

/// Six-step seniority ladder. Ordering follows declaration order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityLevel {
    Junior,
    #[default]
    Mid,
    Senior,
    Lead,
    Director,
    Executive,
}

impl SeniorityLevel {
    /// Position on the ladder, 0 (junior) through 5 (executive).
    pub fn rank(self) -> i32 {
        match self {
            SeniorityLevel::Junior => 0,
            SeniorityLevel::Mid => 1,
            SeniorityLevel::Senior => 2,
            SeniorityLevel::Lead => 3,
            SeniorityLevel::Director => 4,
            SeniorityLevel::Executive => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeniorityLevel::Junior => "junior",
            SeniorityLevel::Mid => "mid",
            SeniorityLevel::Senior => "senior",
            SeniorityLevel::Lead => "lead",
            SeniorityLevel::Director => "director",
            SeniorityLevel::Executive => "executive",
        }
    }

    /// Ladder used when no title keyword decides: ≥10 director, ≥7 lead,
    /// ≥4 senior, ≥2 mid, else junior.
    pub fn from_years(years: f64) -> Self {
        if years >= 10.0 {
            SeniorityLevel::Director
        } else if years >= 7.0 {
            SeniorityLevel::Lead
        } else if years >= 4.0 {
            SeniorityLevel::Senior
        } else if years >= 2.0 {
            SeniorityLevel::Mid
        } else {
            SeniorityLevel::Junior
        }
    }
}

impl std::fmt::Display for SeniorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job side
// ────────────────────────────────────────────────────────────────────────────

/// Raw job posting as it arrives from a caller or the store.
/// Every field defaults so partial payloads still analyze.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobInput {
    pub id: Option<String>,
    pub title: String,
    pub company: String,
    pub description: String,
    pub location: Option<String>,
    pub url: Option<String>,
}

/// A weighted job requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub category: ParameterCategory,
    pub weight: f64,
    pub value: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub analyzed_at: DateTime<Utc>,
    pub text_length: usize,
    pub parameter_count: usize,
    pub extractor_version: String,
}

impl AnalysisMetadata {
    pub fn new(text_length: usize, parameter_count: usize) -> Self {
        Self {
            analyzed_at: Utc::now(),
            text_length,
            parameter_count,
            extractor_version: EXTRACTOR_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub title: String,
    pub company: String,
    pub parameters: Vec<Parameter>,
    pub key_requirements: Vec<String>,
    pub seniority_level: SeniorityLevel,
    pub analysis_metadata: AnalysisMetadata,
}

impl JobAnalysis {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Stable identifier for reports: the job id, or the title when none was given.
    pub fn display_id(&self) -> String {
        self.job_id.clone().unwrap_or_else(|| self.title.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CV side
// ────────────────────────────────────────────────────────────────────────────

/// A skill or trait found in a CV, with the snippets that support it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvParameter {
    pub name: String,
    pub category: CvCategory,
    pub strength: f64,
    pub value: String,
    pub evidence: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvAnalysis {
    pub cv_id: String,
    pub total_experience: f64,
    pub parameters: Vec<CvParameter>,
    pub key_strengths: Vec<String>,
    pub seniority_level: SeniorityLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_role: Option<String>,
    pub analysis_metadata: AnalysisMetadata,
}

impl CvAnalysis {
    #[allow(dead_code)]
    pub fn parameter(&self, name: &str) -> Option<&CvParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seniority_ordering_follows_ladder() {
        assert!(SeniorityLevel::Junior < SeniorityLevel::Mid);
        assert!(SeniorityLevel::Lead < SeniorityLevel::Director);
        assert_eq!(SeniorityLevel::Executive.rank() - SeniorityLevel::Junior.rank(), 5);
    }

    #[test]
    fn test_seniority_from_years_thresholds() {
        assert_eq!(SeniorityLevel::from_years(0.5), SeniorityLevel::Junior);
        assert_eq!(SeniorityLevel::from_years(2.0), SeniorityLevel::Mid);
        assert_eq!(SeniorityLevel::from_years(4.0), SeniorityLevel::Senior);
        assert_eq!(SeniorityLevel::from_years(7.5), SeniorityLevel::Lead);
        assert_eq!(SeniorityLevel::from_years(12.0), SeniorityLevel::Director);
    }

    #[test]
    fn test_job_input_defaults_missing_fields() {
        let job: JobInput = serde_json::from_str(r#"{"title": "Engineer"}"#).unwrap();
        assert_eq!(job.title, "Engineer");
        assert!(job.company.is_empty());
        assert!(job.description.is_empty());
        assert!(job.location.is_none());
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&ParameterCategory::Technical).unwrap();
        assert_eq!(json, r#""technical""#);
        let level: SeniorityLevel = serde_json::from_str(r#""director""#).unwrap();
        assert_eq!(level, SeniorityLevel::Director);
    }
}
