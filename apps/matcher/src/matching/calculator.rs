//! Match Calculator scores one CV matrix against every row of a job matrix.
//!
//! Per parameter, `match_score` rewards meeting or exceeding the job's weight,
//! gives nothing for zero evidence against a meaningful requirement, and caps
//! the over-qualification bonus. Per job, scores are weight-averaged into an
//! overall score and bucketed by category. Across jobs, recurring strengths and
//! gaps are surfaced with recommendations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::models::{JobAnalysis, ParameterCategory, SeniorityLevel};
use crate::analysis::text::round4;
use crate::matching::matrix::{CvMatrix, JobMatrix};

/// A job weight above this with zero CV evidence scores 0.
const CRITICAL_WEIGHT: f64 = 0.3;
const OVERQUALIFIED_BONUS: f64 = 0.1;

const STRENGTH_MIN_SCORE: f64 = 0.7;
/// Inclusive, so a fully met 0.5-weight requirement still counts as a strength.
const STRENGTH_MIN_WEIGHT: f64 = 0.5;
const GAP_MAX_SCORE: f64 = 0.3;
const GAP_MIN_WEIGHT: f64 = 0.6;

const MAX_STRENGTHS: usize = 5;
const MAX_GAPS: usize = 5;
const MAX_RECOMMENDATIONS: usize = 3;
const MAX_PARAMETER_MATCHES: usize = 10;

const TOP_SKILL_MIN_SCORE: f64 = 0.6;
const TOP_SKILL_MIN_STRENGTH: f64 = 0.5;
const MAX_TOP_SKILLS: usize = 10;
/// Share of jobs a gap must appear in to count as common.
const COMMON_GAP_SHARE: f64 = 0.3;
const WEAK_CATEGORY_SCORE: f64 = 0.5;
const LOW_AVERAGE_SCORE: f64 = 0.5;

/// Categories that get their own score bucket.
const SCORED_CATEGORIES: [ParameterCategory; 4] = [
    ParameterCategory::Technical,
    ParameterCategory::Leadership,
    ParameterCategory::Domain,
    ParameterCategory::Soft,
];

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub technical: f64,
    pub leadership: f64,
    pub domain: f64,
    pub soft: f64,
}

impl CategoryScores {
    fn get(&self, category: ParameterCategory) -> Option<f64> {
        match category {
            ParameterCategory::Technical => Some(self.technical),
            ParameterCategory::Leadership => Some(self.leadership),
            ParameterCategory::Domain => Some(self.domain),
            ParameterCategory::Soft => Some(self.soft),
            ParameterCategory::Location | ParameterCategory::Company => None,
        }
    }

    fn set(&mut self, category: ParameterCategory, value: f64) {
        match category {
            ParameterCategory::Technical => self.technical = value,
            ParameterCategory::Leadership => self.leadership = value,
            ParameterCategory::Domain => self.domain = value,
            ParameterCategory::Soft => self.soft = value,
            ParameterCategory::Location | ParameterCategory::Company => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMatch {
    pub parameter: String,
    pub job_weight: f64,
    pub cv_strength: f64,
    pub match_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetails {
    /// Top matches by score.
    pub parameter_matches: Vec<ParameterMatch>,
    /// Categories that had at least one weighted parameter for this job.
    pub evaluated_categories: Vec<ParameterCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    pub overall_score: f64,
    pub category_scores: CategoryScores,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub recommendations: Vec<String>,
    pub details: MatchDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestMatch {
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub average_score: f64,
    pub best_match: Option<BestMatch>,
    pub top_skills: Vec<String>,
    pub common_gaps: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveMatch {
    pub match_id: String,
    pub cv_id: String,
    pub job_matrix_id: String,
    pub cv_matrix_id: String,
    /// Sorted by `overall_score`, best first.
    pub matches: Vec<MatchResult>,
    pub summary: MatchSummary,
    pub generated_at: DateTime<Utc>,
}

/// Full per-job evaluation; `result` is what callers see.
struct JobEvaluation {
    result: MatchResult,
    all_matches: Vec<ParameterMatch>,
    seniority_gap: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Core formula
// ────────────────────────────────────────────────────────────────────────────

/// Compatibility of a CV strength with a job weight, in [0, 1].
///
/// - weight 0 → 1.0 (the job does not care)
/// - strength 0 against weight > 0.3 → 0.0 (critical gap)
/// - otherwise `min(1, min(s / w, 1) + 0.1 if s > w)`
pub fn match_score(job_weight: f64, cv_strength: f64) -> f64 {
    if job_weight <= 0.0 {
        return 1.0;
    }
    if cv_strength <= 0.0 && job_weight > CRITICAL_WEIGHT {
        return 0.0;
    }
    let cv_strength = cv_strength.max(0.0);
    let base = (cv_strength / job_weight).min(1.0);
    let bonus = if cv_strength > job_weight {
        OVERQUALIFIED_BONUS
    } else {
        0.0
    };
    (base + bonus).min(1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Per-job evaluation
// ────────────────────────────────────────────────────────────────────────────

fn evaluate_job(
    job: &JobAnalysis,
    weights: &[f64],
    parameters: &[String],
    cv: &CvMatrix,
) -> JobEvaluation {
    let mut weighted_total = 0.0;
    let mut weight_sum = 0.0;
    let mut buckets: HashMap<ParameterCategory, (f64, usize)> = HashMap::new();
    let mut all_matches = Vec::new();

    for (name, &job_weight) in parameters.iter().zip(weights.iter()) {
        if job_weight <= 0.0 {
            continue;
        }
        let cv_strength = cv.strength(name);
        let score = match_score(job_weight, cv_strength);

        weighted_total += score * job_weight;
        weight_sum += job_weight;

        if let Some(param) = job.parameter(name) {
            let bucket = buckets.entry(param.category).or_insert((0.0, 0));
            bucket.0 += score;
            bucket.1 += 1;
        }

        all_matches.push(ParameterMatch {
            parameter: name.clone(),
            job_weight,
            cv_strength,
            match_score: round4(score),
        });
    }

    let overall_score = if weight_sum > 0.0 {
        round4(weighted_total / weight_sum)
    } else {
        0.0
    };

    let mut category_scores = CategoryScores::default();
    let mut evaluated_categories = Vec::new();
    for category in SCORED_CATEGORIES {
        if let Some((sum, count)) = buckets.get(&category).filter(|(_, count)| *count > 0) {
            category_scores.set(category, round4(sum / *count as f64));
            evaluated_categories.push(category);
        }
    }

    let strengths = names_by_weight(&all_matches, |m| {
        m.match_score > STRENGTH_MIN_SCORE && m.job_weight >= STRENGTH_MIN_WEIGHT
    });
    let strengths: Vec<String> = strengths.into_iter().take(MAX_STRENGTHS).collect();

    // Location and company count toward the score but a CV never evidences them.
    let gap_matches: Vec<&ParameterMatch> = sorted_by_weight(&all_matches, |m| {
        m.match_score < GAP_MAX_SCORE
            && m.job_weight > GAP_MIN_WEIGHT
            && job
                .parameter(&m.parameter)
                .map_or(true, |p| SCORED_CATEGORIES.contains(&p.category))
    });
    let gaps: Vec<String> = gap_matches
        .iter()
        .take(MAX_GAPS)
        .map(|m| m.parameter.clone())
        .collect();

    let cv_level = cv.cv_analysis.seniority_level;
    let seniority_gap = job.seniority_level.rank() - cv_level.rank() > 1;

    let recommendations =
        job_recommendations(&gap_matches, &strengths, seniority_gap, job.seniority_level, cv_level);

    let mut parameter_matches = all_matches.clone();
    parameter_matches.sort_by(|a, b| {
        b.match_score
            .total_cmp(&a.match_score)
            .then_with(|| b.job_weight.total_cmp(&a.job_weight))
            .then_with(|| a.parameter.cmp(&b.parameter))
    });
    parameter_matches.truncate(MAX_PARAMETER_MATCHES);

    JobEvaluation {
        result: MatchResult {
            job_id: job.display_id(),
            job_title: job.title.clone(),
            company: job.company.clone(),
            overall_score,
            category_scores,
            strengths,
            gaps,
            recommendations,
            details: MatchDetails {
                parameter_matches,
                evaluated_categories,
            },
        },
        all_matches,
        seniority_gap,
    }
}

/// Matches passing `keep`, heaviest job weight first (ties by name).
fn sorted_by_weight<F>(matches: &[ParameterMatch], keep: F) -> Vec<&ParameterMatch>
where
    F: Fn(&ParameterMatch) -> bool,
{
    let mut kept: Vec<&ParameterMatch> = matches.iter().filter(|m| keep(m)).collect();
    kept.sort_by(|a, b| {
        b.job_weight
            .total_cmp(&a.job_weight)
            .then_with(|| a.parameter.cmp(&b.parameter))
    });
    kept
}

fn names_by_weight<F>(matches: &[ParameterMatch], keep: F) -> Vec<String>
where
    F: Fn(&ParameterMatch) -> bool,
{
    sorted_by_weight(matches, keep)
        .into_iter()
        .map(|m| m.parameter.clone())
        .collect()
}

fn job_recommendations(
    gaps: &[&ParameterMatch],
    strengths: &[String],
    seniority_gap: bool,
    job_level: SeniorityLevel,
    cv_level: SeniorityLevel,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    // The seniority note takes precedence; gaps fill the remaining slots.
    if seniority_gap {
        recommendations.push(format!(
            "This {job_level} role sits more than one level above your {cv_level} profile; \
             emphasise scope and leadership outcomes."
        ));
    }

    recommendations.extend(gaps.iter().map(|gap| {
        format!(
            "Build and surface evidence for '{}' (job weight {:.2}).",
            gap.parameter, gap.job_weight
        )
    }));

    if recommendations.is_empty() && !strengths.is_empty() {
        let lead: Vec<&str> = strengths.iter().take(3).map(String::as_str).collect();
        recommendations.push(format!(
            "Strong alignment. Lead your CV with: {}.",
            lead.join(", ")
        ));
    }

    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

// ────────────────────────────────────────────────────────────────────────────
// Cross-job aggregation
// ────────────────────────────────────────────────────────────────────────────

/// Scores the CV against every job of the matrix and aggregates the results.
pub fn calculate_match(job_matrix: &JobMatrix, cv_matrix: &CvMatrix) -> ComprehensiveMatch {
    let empty: Vec<f64> = Vec::new();
    let mut evaluations: Vec<JobEvaluation> = job_matrix
        .jobs
        .iter()
        .enumerate()
        .map(|(row, job)| {
            let weights = job_matrix.weight_matrix.get(row).unwrap_or(&empty);
            evaluate_job(job, weights, &job_matrix.parameters, cv_matrix)
        })
        .collect();

    evaluations.sort_by(|a, b| {
        b.result
            .overall_score
            .total_cmp(&a.result.overall_score)
            .then_with(|| a.result.job_id.cmp(&b.result.job_id))
    });

    let summary = summarize(&evaluations, cv_matrix);

    info!(
        cv_id = %cv_matrix.cv_analysis.cv_id,
        jobs = evaluations.len(),
        average_score = summary.average_score,
        "match calculated"
    );

    ComprehensiveMatch {
        match_id: Uuid::new_v4().to_string(),
        cv_id: cv_matrix.cv_analysis.cv_id.clone(),
        job_matrix_id: job_matrix.matrix_id.clone(),
        cv_matrix_id: cv_matrix.matrix_id.clone(),
        matches: evaluations.into_iter().map(|e| e.result).collect(),
        summary,
        generated_at: Utc::now(),
    }
}

fn summarize(evaluations: &[JobEvaluation], cv: &CvMatrix) -> MatchSummary {
    let job_count = evaluations.len();
    let average_score = if job_count == 0 {
        0.0
    } else {
        round4(evaluations.iter().map(|e| e.result.overall_score).sum::<f64>() / job_count as f64)
    };

    let best_match = evaluations.first().map(|e| BestMatch {
        job_id: e.result.job_id.clone(),
        job_title: e.result.job_title.clone(),
        company: e.result.company.clone(),
        score: e.result.overall_score,
    });

    let top_skills = collect_top_skills(evaluations, cv);
    let common_gaps = collect_common_gaps(evaluations);

    let mut recommendations = Vec::new();
    recommendations.extend(common_gaps.iter().take(MAX_RECOMMENDATIONS).map(|(gap, count)| {
        format!("'{gap}' is a gap in {count} of {job_count} jobs; prioritise building evidence for it.")
    }));

    let mismatched = evaluations.iter().filter(|e| e.seniority_gap).count();
    if mismatched > 0 {
        recommendations.push(format!(
            "{mismatched} of {job_count} roles expect seniority more than one level above your {} profile.",
            cv.cv_analysis.seniority_level
        ));
    }

    if let Some((category, score)) = weakest_category(evaluations) {
        if score < WEAK_CATEGORY_SCORE {
            recommendations.push(format!(
                "Weakest area across jobs is {} ({:.0}%); add concrete examples in this area.",
                category_label(category),
                score * 100.0
            ));
        }
    }

    if job_count > 0 && average_score < LOW_AVERAGE_SCORE {
        recommendations.push(format!(
            "Average match is low ({:.0}%); target roles closer to your current profile or expand the CV with concrete evidence.",
            average_score * 100.0
        ));
    }

    MatchSummary {
        average_score,
        best_match,
        top_skills,
        common_gaps: common_gaps.into_iter().map(|(gap, _)| gap).collect(),
        recommendations,
    }
}

/// Parameters scoring above 0.6 on average across the jobs that weight them,
/// backed by a CV strength above 0.5.
fn collect_top_skills(evaluations: &[JobEvaluation], cv: &CvMatrix) -> Vec<String> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for evaluation in evaluations {
        for m in &evaluation.all_matches {
            let entry = totals.entry(m.parameter.as_str()).or_insert((0.0, 0));
            entry.0 += m.match_score;
            entry.1 += 1;
        }
    }

    let mut skills: Vec<(&str, f64)> = totals
        .into_iter()
        .map(|(name, (sum, count))| (name, sum / count as f64))
        .filter(|(name, avg)| *avg > TOP_SKILL_MIN_SCORE && cv.strength(name) > TOP_SKILL_MIN_STRENGTH)
        .collect();
    skills.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    skills
        .into_iter()
        .take(MAX_TOP_SKILLS)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Gaps present in at least 30% of jobs, most frequent first.
fn collect_common_gaps(evaluations: &[JobEvaluation]) -> Vec<(String, usize)> {
    if evaluations.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for evaluation in evaluations {
        for gap in &evaluation.result.gaps {
            *counts.entry(gap.as_str()).or_insert(0) += 1;
        }
    }

    let job_count = evaluations.len() as f64;
    let mut gaps: Vec<(String, usize)> = counts
        .into_iter()
        .filter(|(_, count)| *count as f64 / job_count >= COMMON_GAP_SHARE)
        .map(|(gap, count)| (gap.to_string(), count))
        .collect();
    gaps.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    gaps
}

/// Lowest mean category score, counting only jobs where the category was evaluated.
fn weakest_category(evaluations: &[JobEvaluation]) -> Option<(ParameterCategory, f64)> {
    SCORED_CATEGORIES
        .iter()
        .filter_map(|&category| {
            let scores: Vec<f64> = evaluations
                .iter()
                .filter(|e| e.result.details.evaluated_categories.contains(&category))
                .filter_map(|e| e.result.category_scores.get(category))
                .collect();
            (!scores.is_empty())
                .then(|| (category, scores.iter().sum::<f64>() / scores.len() as f64))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn category_label(category: ParameterCategory) -> &'static str {
    match category {
        ParameterCategory::Technical => "technical skills",
        ParameterCategory::Leadership => "leadership",
        ParameterCategory::Domain => "domain knowledge",
        ParameterCategory::Soft => "soft skills",
        ParameterCategory::Location => "location",
        ParameterCategory::Company => "company fit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::{
        AnalysisMetadata, CvAnalysis, CvCategory, CvParameter, JobAnalysis, Parameter,
    };
    use crate::matching::matrix::{cv_matrix_from_analysis, job_matrix_from_analyses};

    fn job_analysis(
        id: &str,
        level: SeniorityLevel,
        params: &[(&str, ParameterCategory, f64)],
    ) -> JobAnalysis {
        JobAnalysis {
            job_id: Some(id.to_string()),
            title: format!("Job {id}"),
            company: "Acme".to_string(),
            parameters: params
                .iter()
                .map(|(name, category, weight)| Parameter {
                    name: name.to_string(),
                    category: *category,
                    weight: *weight,
                    value: name.to_string(),
                    confidence: 0.9,
                })
                .collect(),
            key_requirements: vec![],
            seniority_level: level,
            analysis_metadata: AnalysisMetadata::new(0, params.len()),
        }
    }

    fn cv_matrix(level: SeniorityLevel, params: &[(&str, f64)]) -> CvMatrix {
        cv_matrix_from_analysis(CvAnalysis {
            cv_id: "cv-1".to_string(),
            total_experience: 5.0,
            parameters: params
                .iter()
                .map(|(name, strength)| CvParameter {
                    name: name.to_string(),
                    category: CvCategory::Technical,
                    strength: *strength,
                    value: name.to_string(),
                    evidence: vec![],
                    years_of_experience: None,
                })
                .collect(),
            key_strengths: vec![],
            seniority_level: level,
            current_role: None,
            analysis_metadata: AnalysisMetadata::new(0, params.len()),
        })
    }

    use ParameterCategory::{Company, Domain, Leadership, Location, Soft, Technical};

    #[test]
    fn test_zero_weight_is_trivial_match() {
        for s in [0.0, 0.3, 1.0] {
            assert_eq!(match_score(0.0, s), 1.0);
        }
    }

    #[test]
    fn test_zero_strength_against_meaningful_weight_is_zero() {
        for w in [0.31, 0.5, 0.9, 1.0] {
            assert_eq!(match_score(w, 0.0), 0.0);
        }
    }

    #[test]
    fn test_zero_strength_against_light_weight_is_ratio() {
        assert_eq!(match_score(0.2, 0.0), 0.0);
        assert_eq!(match_score(0.2, 0.1), 0.5);
    }

    #[test]
    fn test_match_score_bounded_and_monotonic() {
        for wi in 1..=10 {
            let w = wi as f64 / 10.0;
            let mut previous = 0.0;
            for si in 0..=20 {
                let s = si as f64 / 20.0;
                let score = match_score(w, s);
                assert!((0.0..=1.0).contains(&score), "w={w} s={s} score={score}");
                assert!(score >= previous, "not monotonic at w={w} s={s}");
                previous = score;
            }
        }
    }

    #[test]
    fn test_overqualified_bonus_is_capped() {
        // base = min(0.95 / 0.5, 1) = 1, bonus 0.1 → capped at 1
        assert_eq!(match_score(0.5, 0.95), 1.0);
        // base = 0.9, no bonus while below the weight
        assert!((match_score(1.0, 0.9) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_missing_kubernetes_is_a_gap() {
        let jobs = job_matrix_from_analyses(vec![job_analysis(
            "k8s",
            SeniorityLevel::Senior,
            &[("kubernetes", Technical, 0.9), ("python", Technical, 0.5)],
        )]);
        let cv = cv_matrix(SeniorityLevel::Senior, &[("python", 0.95)]);

        let result = calculate_match(&jobs, &cv);
        let job = &result.matches[0];
        assert!(job.gaps.contains(&"kubernetes".to_string()));
        let k8s = job
            .details
            .parameter_matches
            .iter()
            .find(|m| m.parameter == "kubernetes")
            .unwrap();
        assert_eq!(k8s.match_score, 0.0);
    }

    #[test]
    fn test_overqualified_skill_is_a_strength() {
        let jobs = job_matrix_from_analyses(vec![job_analysis(
            "py",
            SeniorityLevel::Senior,
            &[("python", Technical, 0.5)],
        )]);
        let cv = cv_matrix(SeniorityLevel::Senior, &[("python", 0.95)]);

        let result = calculate_match(&jobs, &cv);
        assert_eq!(result.matches[0].strengths, vec!["python"]);
        assert_eq!(result.matches[0].overall_score, 1.0);
    }

    #[test]
    fn test_overall_score_is_weighted_average() {
        let jobs = job_matrix_from_analyses(vec![job_analysis(
            "mix",
            SeniorityLevel::Mid,
            &[("aws", Technical, 0.8), ("mentoring", Leadership, 0.4)],
        )]);
        // aws: 0.4/0.8 = 0.5; mentoring: 0 strength, 0.4 > 0.3 → 0
        let cv = cv_matrix(SeniorityLevel::Mid, &[("aws", 0.4)]);

        let result = calculate_match(&jobs, &cv);
        let expected = (0.5 * 0.8 + 0.0 * 0.4) / 1.2;
        assert!((result.matches[0].overall_score - round4(expected)).abs() < 1e-9);
        assert_eq!(result.matches[0].category_scores.technical, 0.5);
        assert_eq!(result.matches[0].category_scores.leadership, 0.0);
        assert_eq!(
            result.matches[0].details.evaluated_categories,
            vec![Technical, Leadership]
        );
    }

    #[test]
    fn test_all_zero_weights_score_zero() {
        let jobs = job_matrix_from_analyses(vec![job_analysis("none", SeniorityLevel::Mid, &[])]);
        let cv = cv_matrix(SeniorityLevel::Mid, &[("python", 0.9)]);

        let result = calculate_match(&jobs, &cv);
        assert_eq!(result.matches[0].overall_score, 0.0);
        assert!(!result.matches[0].overall_score.is_nan());
    }

    #[test]
    fn test_seniority_mismatch_recommendation() {
        let jobs = job_matrix_from_analyses(vec![job_analysis(
            "dir",
            SeniorityLevel::Director,
            &[("leadership", Leadership, 0.9)],
        )]);
        let cv = cv_matrix(SeniorityLevel::Mid, &[("leadership", 0.9)]);

        let result = calculate_match(&jobs, &cv);
        assert!(result.matches[0].recommendations[0].contains("director"));
        assert!(result
            .summary
            .recommendations
            .iter()
            .any(|r| r.contains("1 of 1 roles")));
    }

    #[test]
    fn test_seniority_note_precedes_the_heaviest_gaps() {
        let jobs = job_matrix_from_analyses(vec![job_analysis(
            "dir",
            SeniorityLevel::Director,
            &[
                ("kafka", Technical, 0.9),
                ("rust", Technical, 0.85),
                ("go", Technical, 0.8),
                ("scala", Technical, 0.75),
            ],
        )]);
        let cv = cv_matrix(SeniorityLevel::Mid, &[]);

        let result = calculate_match(&jobs, &cv);
        let recs = &result.matches[0].recommendations;
        assert_eq!(recs.len(), MAX_RECOMMENDATIONS);
        assert!(recs[0].contains("director"));
        assert!(recs[1].contains("'kafka'"));
        assert!(recs[2].contains("'rust'"));
        assert_eq!(result.matches[0].gaps[..3], ["kafka", "rust", "go"]);
    }

    #[test]
    fn test_location_and_company_are_scored_but_not_gaps() {
        let jobs = job_matrix_from_analyses(vec![job_analysis(
            "berlin",
            SeniorityLevel::Mid,
            &[
                ("python", Technical, 0.8),
                ("location", Location, 0.7),
                ("company", Company, 0.7),
            ],
        )]);
        let cv = cv_matrix(SeniorityLevel::Mid, &[("python", 0.9)]);

        let result = calculate_match(&jobs, &cv);
        let job = &result.matches[0];
        assert!(job.overall_score < 0.5);
        assert!(job.gaps.is_empty());
        assert!(!job.recommendations.iter().any(|r| r.contains("location")));
        assert!(result.summary.common_gaps.is_empty());
    }

    #[test]
    fn test_one_level_gap_is_not_flagged() {
        let jobs = job_matrix_from_analyses(vec![job_analysis(
            "lead",
            SeniorityLevel::Lead,
            &[("rust", Technical, 0.6)],
        )]);
        let cv = cv_matrix(SeniorityLevel::Senior, &[("rust", 0.9)]);

        let result = calculate_match(&jobs, &cv);
        assert!(!result.matches[0]
            .recommendations
            .iter()
            .any(|r| r.contains("more than one level")));
    }

    #[test]
    fn test_list_caps() {
        let params: Vec<(String, f64)> = (0..15).map(|i| (format!("skill{i:02}"), 0.9)).collect();
        let job_params: Vec<(&str, ParameterCategory, f64)> = params
            .iter()
            .map(|(n, w)| (n.as_str(), Technical, *w))
            .collect();
        let jobs =
            job_matrix_from_analyses(vec![job_analysis("big", SeniorityLevel::Mid, &job_params)]);
        let cv = cv_matrix(SeniorityLevel::Mid, &[]);

        let result = calculate_match(&jobs, &cv);
        let job = &result.matches[0];
        assert_eq!(job.gaps.len(), MAX_GAPS);
        assert_eq!(job.recommendations.len(), MAX_RECOMMENDATIONS);
        assert_eq!(job.details.parameter_matches.len(), MAX_PARAMETER_MATCHES);
    }

    #[test]
    fn test_comprehensive_summary() {
        let jobs = job_matrix_from_analyses(vec![
            job_analysis(
                "a",
                SeniorityLevel::Senior,
                &[("python", Technical, 0.8), ("kubernetes", Technical, 0.9)],
            ),
            job_analysis(
                "b",
                SeniorityLevel::Senior,
                &[("python", Technical, 0.7), ("communication", Soft, 0.6)],
            ),
            job_analysis(
                "c",
                SeniorityLevel::Senior,
                &[("kubernetes", Technical, 0.85), ("fintech", Domain, 0.7)],
            ),
        ]);
        let cv = cv_matrix(
            SeniorityLevel::Senior,
            &[("python", 0.9), ("communication", 0.6)],
        );

        let result = calculate_match(&jobs, &cv);

        let scores: Vec<f64> = result.matches.iter().map(|m| m.overall_score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(result.summary.best_match.as_ref().unwrap().job_id, "b");

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        assert!((result.summary.average_score - round4(mean)).abs() < 1e-9);

        assert!(result.summary.top_skills.contains(&"python".to_string()));
        assert!(!result.summary.top_skills.contains(&"kubernetes".to_string()));
        assert_eq!(result.summary.common_gaps, vec!["kubernetes", "fintech"]);
        assert!(result
            .summary
            .recommendations
            .iter()
            .any(|r| r.contains("'kubernetes' is a gap in 2 of 3 jobs")));
    }

    #[test]
    fn test_weak_category_and_low_average_notes() {
        let jobs = job_matrix_from_analyses(vec![job_analysis(
            "d",
            SeniorityLevel::Mid,
            &[("fintech", Domain, 0.7), ("python", Technical, 0.5)],
        )]);
        let cv = cv_matrix(SeniorityLevel::Mid, &[("python", 0.1)]);

        let result = calculate_match(&jobs, &cv);
        let recs = &result.summary.recommendations;
        assert!(recs.iter().any(|r| r.contains("domain knowledge")));
        assert!(recs.iter().any(|r| r.starts_with("Average match is low")));
    }

    #[test]
    fn test_empty_job_matrix() {
        let jobs = job_matrix_from_analyses(vec![]);
        let cv = cv_matrix(SeniorityLevel::Mid, &[("python", 0.9)]);

        let result = calculate_match(&jobs, &cv);
        assert!(result.matches.is_empty());
        assert_eq!(result.summary.average_score, 0.0);
        assert!(result.summary.best_match.is_none());
        assert!(result.summary.recommendations.is_empty());
    }

    #[test]
    fn test_unknown_cv_parameters_are_zero_strength() {
        let jobs = job_matrix_from_analyses(vec![job_analysis(
            "x",
            SeniorityLevel::Mid,
            &[("rust", Technical, 0.25)],
        )]);
        let cv = cv_matrix(SeniorityLevel::Mid, &[]);

        let result = calculate_match(&jobs, &cv);
        let m = &result.matches[0].details.parameter_matches[0];
        assert_eq!(m.cv_strength, 0.0);
        // 0.25 is not a critical weight, so the ratio applies: 0 / 0.25
        assert_eq!(m.match_score, 0.0);
    }
}
