//! Variant Generator: tailors CV markdown to a single job.
//!
//! Three passes, each gated by the `ModificationPolicy`:
//! 1. Vocabulary: spelling variants the job names canonically (`k8s`) are
//!    rewritten to the job's term (`kubernetes`).
//! 2. Skills: comma-separated skill lists are reordered by job weight.
//! 3. Summary: a key-skills line is placed under the summary heading, built
//!    only from match strengths the CV already evidences.
//!
//! Gaps never enter the content; they are returned as suggestions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::dictionaries::{
    Term, DOMAIN_TERMS, LEADERSHIP_TERMS, SOFT_SKILLS, TECHNICAL_SKILLS, TERM_INDEX,
};
use crate::analysis::models::JobAnalysis;
use crate::analysis::text::{contains_term, dedup_preserving_order, term_positions};
use crate::matching::calculator::MatchResult;
use crate::variants::policy::{ModificationPolicy, VariantSection};

const KEY_SKILLS_LABEL: &str = "**Key skills for this role:**";

const SKILL_HEADINGS: &[&str] = &["skill", "technolog", "tech stack", "toolbox"];
const SUMMARY_HEADINGS: &[&str] = &["summary", "profile", "about"];

/// CV spelling → job vocabulary. Applied only when the job carries the canonical term.
const SPELLING_VARIANTS: &[(&str, &str)] = &[
    ("k8s", "kubernetes"),
    ("postgres", "postgresql"),
    ("nodejs", "node.js"),
    ("reactjs", "react"),
    ("react.js", "react"),
    ("vuejs", "vue"),
    ("vue.js", "vue"),
    ("angularjs", "angular"),
    ("python3", "python"),
    ("ecmascript", "javascript"),
    ("amazon web services", "aws"),
    ("google cloud", "gcp"),
    ("mongo", "mongodb"),
];

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modification {
    pub section: VariantSection,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvVariant {
    pub variant_id: String,
    pub job_id: String,
    pub job_title: String,
    pub content: String,
    pub modifications: Vec<Modification>,
    /// Gaps and recommendations the candidate may act on; never applied to `content`.
    pub suggestions: Vec<String>,
    pub policy: String,
    pub generated_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

pub fn generate_variant(
    cv_content: &str,
    match_result: &MatchResult,
    job: &JobAnalysis,
    policy: &mut dyn ModificationPolicy,
) -> CvVariant {
    let mut lines: Vec<String> = cv_content.lines().map(str::to_string).collect();
    let mut modifications = Vec::new();

    if policy.should_modify(VariantSection::Vocabulary) {
        modifications.extend(normalise_vocabulary(&mut lines, job));
    }
    if policy.should_modify(VariantSection::Skills) {
        modifications.extend(reorder_skill_lines(&mut lines, job));
    }
    if policy.should_modify(VariantSection::Summary) {
        modifications.extend(highlight_key_skills(&mut lines, cv_content, match_result));
    }

    let mut content = lines.join("\n");
    if cv_content.ends_with('\n') {
        content.push('\n');
    }

    info!(
        job_id = %match_result.job_id,
        modifications = modifications.len(),
        policy = %policy.describe(),
        "cv variant generated"
    );

    CvVariant {
        variant_id: Uuid::new_v4().to_string(),
        job_id: match_result.job_id.clone(),
        job_title: match_result.job_title.clone(),
        content,
        modifications,
        suggestions: suggestions(match_result, job),
        policy: policy.describe(),
        generated_at: Utc::now(),
    }
}

fn normalise_vocabulary(lines: &mut [String], job: &JobAnalysis) -> Vec<Modification> {
    let mut modifications = Vec::new();

    for (variant, canonical) in SPELLING_VARIANTS {
        if job.parameter(canonical).is_none() {
            continue;
        }
        let mut replaced = 0;
        for line in lines.iter_mut() {
            if let Some((rewritten, count)) = replace_term(line, variant, canonical) {
                *line = rewritten;
                replaced += count;
            }
        }
        if replaced > 0 {
            modifications.push(Modification {
                section: VariantSection::Vocabulary,
                description: format!("Replaced '{variant}' with '{canonical}' ({replaced}x)"),
            });
        }
    }
    modifications
}

/// Replaces word-bounded, case-insensitive occurrences of `term`.
fn replace_term(line: &str, term: &str, replacement: &str) -> Option<(String, usize)> {
    // ASCII lowering keeps byte offsets aligned with `line`.
    let lower = line.to_ascii_lowercase();
    let positions = term_positions(&lower, term);
    if positions.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for start in &positions {
        out.push_str(&line[last..*start]);
        out.push_str(replacement);
        last = start + term.len();
    }
    out.push_str(&line[last..]);
    Some((out, positions.len()))
}

fn reorder_skill_lines(lines: &mut [String], job: &JobAnalysis) -> Vec<Modification> {
    let Some(range) = section_range(lines, SKILL_HEADINGS) else {
        debug!("no skills section found");
        return Vec::new();
    };

    let mut modifications = Vec::new();
    for line in &mut lines[range] {
        if let Some(reordered) = reorder_skill_line(line, job) {
            modifications.push(Modification {
                section: VariantSection::Skills,
                description: format!("Reordered skills: {}", reordered.trim()),
            });
            *line = reordered;
        }
    }
    modifications
}

/// Sorts the comma-separated items of a skill line by job weight, stable for ties.
/// Returns `None` when the line is not a list or the order is already right.
fn reorder_skill_line(line: &str, job: &JobAnalysis) -> Option<String> {
    if !line.contains(',') || line.trim_start().starts_with('#') {
        return None;
    }

    let body_start = match line.rfind(':') {
        Some(colon) => {
            let after = &line[colon + 1..];
            colon + 1 + (after.len() - after.trim_start_matches('*').len())
        }
        None => line.len() - line.trim_start_matches(['-', '*', '•', ' ', '\t']).len(),
    };
    let (head, body) = line.split_at(body_start);
    let lead = &body[..body.len() - body.trim_start().len()];
    let trailing_dot = body.trim_end().ends_with('.');

    let items: Vec<&str> = body
        .trim()
        .trim_end_matches('.')
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();
    if items.len() < 2 {
        return None;
    }

    let mut ranked: Vec<(&str, f64)> = items
        .iter()
        .map(|item| {
            let weight = canonical_term(item)
                .and_then(|name| job.parameter(name))
                .map_or(0.0, |p| p.weight);
            (*item, weight)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let reordered: Vec<&str> = ranked.into_iter().map(|(item, _)| item).collect();
    if reordered == items {
        return None;
    }

    Some(format!(
        "{head}{lead}{}{}",
        reordered.join(", "),
        if trailing_dot { "." } else { "" }
    ))
}

fn highlight_key_skills(
    lines: &mut Vec<String>,
    original: &str,
    match_result: &MatchResult,
) -> Option<Modification> {
    let Some(range) = section_range(lines, SUMMARY_HEADINGS) else {
        debug!("no summary section found");
        return None;
    };

    let lower = original.to_ascii_lowercase();
    let skills: Vec<&str> = match_result
        .strengths
        .iter()
        .filter_map(|name| TERM_INDEX.get(name.as_str()))
        .filter(|(_, term)| is_evidenced(&lower, term))
        .map(|(_, term)| term.name)
        .collect();
    if skills.is_empty() {
        return None;
    }

    let key_line = format!("{KEY_SKILLS_LABEL} {}", skills.join(", "));
    let existing = range
        .clone()
        .find(|&i| lines[i].trim_start().starts_with(KEY_SKILLS_LABEL));

    match existing {
        Some(i) if lines[i] == key_line => return None,
        Some(i) => lines[i] = key_line.clone(),
        None => {
            let heading = range.start - 1;
            lines.insert(heading + 1, key_line.clone());
            if lines.get(heading + 2).is_some_and(|next| !next.trim().is_empty()) {
                lines.insert(heading + 2, String::new());
            }
        }
    }

    Some(Modification {
        section: VariantSection::Summary,
        description: format!("Highlighted key skills: {}", skills.join(", ")),
    })
}

fn suggestions(match_result: &MatchResult, job: &JobAnalysis) -> Vec<String> {
    let mut out: Vec<String> = match_result
        .gaps
        .iter()
        .map(|gap| {
            let weight = job.parameter(gap).map_or(0.0, |p| p.weight);
            format!(
                "The role weights '{gap}' at {weight:.2} but the CV shows little evidence; add it only if you can back it up."
            )
        })
        .collect();
    out.extend(match_result.recommendations.iter().cloned());
    dedup_preserving_order(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Body lines (exclusive of the heading) of the first heading matching `keywords`,
/// up to the next heading of the same or higher level.
fn section_range(lines: &[String], keywords: &[&str]) -> Option<std::ops::Range<usize>> {
    let (start, level) = lines.iter().enumerate().find_map(|(i, line)| {
        let level = heading_level(line)?;
        let lower = line.to_lowercase();
        keywords.iter().any(|k| lower.contains(k)).then_some((i, level))
    })?;

    let end = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| heading_level(line).is_some_and(|l| l <= level))
        .map_or(lines.len(), |(i, _)| i);

    Some(start + 1..end)
}

fn heading_level(line: &str) -> Option<usize> {
    let trimmed = line.trim_start();
    let level = trimmed.len() - trimmed.trim_start_matches('#').len();
    (level > 0 && trimmed[level..].starts_with(' ')).then_some(level)
}

/// Dictionary name for a skill-list item written by name or known variant.
fn canonical_term(item: &str) -> Option<&'static str> {
    let item = item
        .trim_matches(|c: char| c == '*' || c == '`' || c.is_whitespace())
        .to_lowercase();
    [TECHNICAL_SKILLS, LEADERSHIP_TERMS, DOMAIN_TERMS, SOFT_SKILLS]
        .into_iter()
        .flatten()
        .find(|t| t.name == item || t.variants.contains(&item.as_str()))
        .map(|t| t.name)
}

fn is_evidenced(lower_cv: &str, term: &Term) -> bool {
    contains_term(lower_cv, term.name) || term.variants.iter().any(|v| contains_term(lower_cv, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::cv_extractor::CvAnalysisOptions;
    use crate::analysis::job_extractor::analyze_job;
    use crate::analysis::models::JobInput;
    use crate::matching::calculator::calculate_match;
    use crate::matching::matrix::{generate_cv_matrix, job_matrix_from_analyses};
    use crate::variants::policy::{AlwaysModify, SeededPolicy};

    const CV: &str = "# Jane Doe

## Summary
Platform engineer focused on reliable infrastructure.

## Skills
- **Languages:** Go, Python, Bash
- **Cloud:** Docker, k8s, AWS

## Experience
### Senior Engineer | 2018 - present
Built Python services and architected AWS infrastructure. Implemented k8s clusters.
";

    fn job_and_match() -> (JobAnalysis, MatchResult) {
        let job = analyze_job(&JobInput {
            id: Some("platform-1".to_string()),
            title: "Senior Platform Engineer".to_string(),
            company: "Acme".to_string(),
            description: "Kubernetes, Python and AWS required. Terraform experience essential."
                .to_string(),
            ..JobInput::default()
        });
        let job_matrix = job_matrix_from_analyses(vec![job.clone()]);
        let cv_matrix = generate_cv_matrix(CV, "jane", &CvAnalysisOptions::default());
        let report = calculate_match(&job_matrix, &cv_matrix);
        (job, report.matches[0].clone())
    }

    #[test]
    fn test_vocabulary_follows_the_job() {
        let (job, result) = job_and_match();
        let variant = generate_variant(CV, &result, &job, &mut AlwaysModify);

        assert!(!variant.content.contains("k8s"));
        assert!(variant.content.contains("Implemented kubernetes clusters"));
        assert!(variant
            .modifications
            .iter()
            .any(|m| m.section == VariantSection::Vocabulary && m.description.contains("(2x)")));
    }

    #[test]
    fn test_skill_lines_lead_with_weighted_skills() {
        let (job, result) = job_and_match();
        let variant = generate_variant(CV, &result, &job, &mut AlwaysModify);

        assert!(variant.content.contains("- **Languages:** Python, Go, Bash"));
        assert!(variant.content.contains("- **Cloud:** AWS, kubernetes, Docker"));
    }

    #[test]
    fn test_summary_gets_only_evidenced_strengths() {
        let (job, result) = job_and_match();
        assert!(result.strengths.iter().any(|s| s == "python"));
        let variant = generate_variant(CV, &result, &job, &mut AlwaysModify);

        let key_line = variant
            .content
            .lines()
            .find(|l| l.starts_with(KEY_SKILLS_LABEL))
            .expect("key skills line");
        assert!(key_line.contains("python"));
        assert!(!key_line.contains("terraform"));

        let lines: Vec<&str> = variant.content.lines().collect();
        let heading = lines.iter().position(|l| *l == "## Summary").unwrap();
        assert!(lines[heading + 1].starts_with(KEY_SKILLS_LABEL));
        assert_eq!(lines[heading + 2], "");
    }

    #[test]
    fn test_gaps_become_suggestions_not_content() {
        let (job, result) = job_and_match();
        assert!(result.gaps.iter().any(|g| g == "terraform"));
        let variant = generate_variant(CV, &result, &job, &mut AlwaysModify);

        assert!(!variant.content.to_lowercase().contains("terraform"));
        assert!(variant.suggestions.iter().any(|s| s.contains("'terraform'")));
    }

    #[test]
    fn test_seeded_policy_is_reproducible() {
        let (job, result) = job_and_match();
        let a = generate_variant(CV, &result, &job, &mut SeededPolicy::new(99, 0.5));
        let b = generate_variant(CV, &result, &job, &mut SeededPolicy::new(99, 0.5));
        assert_eq!(a.content, b.content);
        assert_eq!(a.modifications, b.modifications);
    }

    #[test]
    fn test_zero_probability_leaves_content_untouched() {
        let (job, result) = job_and_match();
        let variant = generate_variant(CV, &result, &job, &mut SeededPolicy::new(1, 0.0));
        assert_eq!(variant.content, CV);
        assert!(variant.modifications.is_empty());
        assert!(!variant.suggestions.is_empty());
    }

    #[test]
    fn test_regenerating_from_a_variant_is_stable() {
        let (job, result) = job_and_match();
        let first = generate_variant(CV, &result, &job, &mut AlwaysModify);
        let second = generate_variant(&first.content, &result, &job, &mut AlwaysModify);
        assert_eq!(first.content, second.content);
        assert!(second.modifications.is_empty());
    }

    #[test]
    fn test_replace_term_respects_word_boundaries() {
        assert_eq!(replace_term("Mongo and MongoDB", "mongo", "mongodb").map(|r| r.1), Some(1));
        assert!(replace_term("postgresql only", "postgres", "postgresql").is_none());
    }
}
