//! CV Parameter Extractor: strength-oriented counterpart of the job extractor.
//!
//! Strength blends how often a skill is mentioned with the verbs around it:
//! `min(1, frequency × 0.2 + context)`, where context rewards "strong" verbs
//! (implemented, architected, built, led, expertise) over "medium" ones.
//!
//! Positions are computed on an ASCII-lower-cased copy so byte offsets stay
//! valid in the original text, which is what evidence snippets are cut from.

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::dictionaries::{
    Term, DEGREES, DOMAIN_TERMS, LEADERSHIP_TERMS, MEDIUM_CONTEXT_VERBS, SCIENCE_FIELDS,
    SENIOR_ROLE_TITLES, SOFT_SKILLS, STRONG_CONTEXT_VERBS, TECHNICAL_SKILLS,
};
use crate::analysis::job_extractor::seniority_from_title;
use crate::analysis::models::{AnalysisMetadata, CvAnalysis, CvCategory, CvParameter, SeniorityLevel};
use crate::analysis::text::{contains_term, round4, squash_whitespace, term_positions, window};

/// Parameters weaker than this are noise and dropped.
const MIN_STRENGTH: f64 = 0.2;
const STRONG_VERB_BONUS: f64 = 0.3;
const MEDIUM_VERB_BONUS: f64 = 0.1;
const CONTEXT_CAP: f64 = 0.8;
const SOFT_SKILL_CAP: f64 = 0.8;
const SENIOR_SIGNAL_STRENGTH: f64 = 0.9;
/// Bytes of text considered on each side of a mention.
const CONTEXT_RADIUS: usize = 80;
const MAX_EVIDENCE: usize = 3;
const MAX_KEY_STRENGTHS: usize = 5;
/// Years at which the experience parameter saturates.
const EXPERIENCE_SATURATION_YEARS: f64 = 15.0;

static EXPERIENCE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^(#{1,3})\s*(?:work\s+|professional\s+)?experience\b.*$")
        .expect("valid experience heading regex")
});

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{1,6})\s+.*$").expect("valid heading regex"));

static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\d{1,2}/)?((?:19|20)\d{2})\s*(?:-|–|—|to|bis)\s*(?:\d{1,2}/)?((?:19|20)\d{2}|present|current|now|today|heute)",
    )
    .expect("valid date range regex")
});

static TEAM_SIZE_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)team of (\d+)").expect("valid team-of regex"),
        Regex::new(r"(?i)(\d+)\+?\s*(?:engineers|developers|people|members|direct reports)")
            .expect("valid team size regex"),
    ]
});

// ────────────────────────────────────────────────────────────────────────────
// Options
// ────────────────────────────────────────────────────────────────────────────

/// How overlapping employment ranges contribute to total experience.
///
/// `Sum` adds every range arithmetically, so concurrent roles count twice.
/// `Union` merges overlapping ranges before summing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    #[default]
    Sum,
    Union,
}

impl std::str::FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(OverlapPolicy::Sum),
            "union" => Ok(OverlapPolicy::Union),
            other => Err(format!("unknown overlap policy '{other}' (expected sum|union)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CvAnalysisOptions {
    pub overlap_policy: OverlapPolicy,
    /// Year substituted for "present"; `None` uses the current year.
    pub current_year: Option<i32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

#[allow(dead_code)] // default-options entry point; the service passes configured options
pub fn analyze_cv(content: &str, cv_id: &str) -> CvAnalysis {
    analyze_cv_with(content, cv_id, &CvAnalysisOptions::default())
}

pub fn analyze_cv_with(content: &str, cv_id: &str, options: &CvAnalysisOptions) -> CvAnalysis {
    let lower = content.to_ascii_lowercase();
    let current_year = options.current_year.unwrap_or_else(|| Utc::now().year());

    let experience_section = find_experience_section(content);
    let total_experience = experience_section
        .map(|section| total_experience_years(section, options.overlap_policy, current_year))
        .unwrap_or(0.0);
    let current_role = experience_section.and_then(extract_current_role);

    let mut parameters = Vec::new();
    parameters.extend(extract_technical(content, &lower));
    parameters.extend(extract_leadership(content, &lower));
    parameters.extend(extract_indicator_terms(
        content,
        &lower,
        DOMAIN_TERMS,
        CvCategory::Domain,
        0.9,
    ));
    parameters.extend(extract_indicator_terms(
        content,
        &lower,
        SOFT_SKILLS,
        CvCategory::Soft,
        SOFT_SKILL_CAP,
    ));
    if let Some(education) = extract_education(&lower) {
        parameters.push(education);
    }
    if total_experience > 0.0 {
        parameters.push(experience_parameter(total_experience));
    }

    parameters.retain(|p| p.strength >= MIN_STRENGTH);
    for param in parameters.iter_mut() {
        param.strength = round4(param.strength.clamp(0.0, 1.0));
    }
    parameters.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    let seniority_level = current_role
        .as_deref()
        .and_then(seniority_from_title)
        .unwrap_or_else(|| SeniorityLevel::from_years(total_experience));

    let key_strengths = parameters
        .iter()
        .take(MAX_KEY_STRENGTHS)
        .map(|p| p.name.clone())
        .collect();

    debug!(
        cv_id,
        parameters = parameters.len(),
        total_experience,
        seniority = %seniority_level,
        "cv analyzed"
    );

    CvAnalysis {
        cv_id: cv_id.to_string(),
        total_experience,
        analysis_metadata: AnalysisMetadata::new(content.len(), parameters.len()),
        parameters,
        key_strengths,
        seniority_level,
        current_role,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Experience section
// ────────────────────────────────────────────────────────────────────────────

/// Text under the Experience heading up to the next heading of higher level,
/// or of the same level unless that heading is a dated role line.
fn find_experience_section(content: &str) -> Option<&str> {
    let caps = EXPERIENCE_HEADING.captures(content)?;
    let level = caps.get(1)?.as_str().len();
    let body_start = caps.get(0)?.end();
    let body = &content[body_start..];

    let end = HEADING
        .captures_iter(body)
        .find(|c| {
            let heading_level = c.get(1).map_or(usize::MAX, |m| m.as_str().len());
            let is_role = c.get(0).is_some_and(|m| DATE_RANGE.is_match(m.as_str()));
            heading_level < level || (heading_level == level && !is_role)
        })
        .and_then(|c| c.get(0))
        .map(|m| m.start())
        .unwrap_or(body.len());

    Some(&body[..end])
}

/// First sub-heading or bold line of the section, minus markup and trailing dates.
fn extract_current_role(section: &str) -> Option<String> {
    section
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with('#') || line.starts_with("**"))
        .map(|line| {
            let stripped = line.trim_start_matches('#').replace("**", "");
            let title = stripped
                .split(['|', '(', '—'])
                .next()
                .unwrap_or_default()
                .trim();
            title.trim_end_matches([',', '-', '–']).trim().to_string()
        })
        .filter(|title| !title.is_empty())
}

/// Sums every `YYYY – YYYY|present` range in the section.
pub fn total_experience_years(section: &str, policy: OverlapPolicy, current_year: i32) -> f64 {
    let mut ranges: Vec<(i32, i32)> = DATE_RANGE
        .captures_iter(section)
        .filter_map(|caps| {
            let start: i32 = caps.get(1)?.as_str().parse().ok()?;
            let end_raw = caps.get(2)?.as_str();
            let end = end_raw.parse::<i32>().unwrap_or(current_year);
            (end >= start).then_some((start, end))
        })
        .collect();

    let years = match policy {
        OverlapPolicy::Sum => ranges.iter().map(|(s, e)| e - s).sum::<i32>(),
        OverlapPolicy::Union => {
            ranges.sort_unstable();
            let mut merged: Vec<(i32, i32)> = Vec::new();
            for (start, end) in ranges {
                match merged.last_mut() {
                    Some(last) if start <= last.1 => last.1 = last.1.max(end),
                    _ => merged.push((start, end)),
                }
            }
            merged.iter().map(|(s, e)| e - s).sum::<i32>()
        }
    };

    years.max(0) as f64
}

fn experience_parameter(years: f64) -> CvParameter {
    CvParameter {
        name: "years_experience".to_string(),
        category: CvCategory::Experience,
        strength: (years / EXPERIENCE_SATURATION_YEARS).min(1.0),
        value: format!("{years} years"),
        evidence: Vec::new(),
        years_of_experience: Some(years.round() as u32),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skill passes
// ────────────────────────────────────────────────────────────────────────────

/// Occurrences of any variant: (byte offset, match length).
fn variant_hits(lower: &str, term: &Term) -> Vec<(usize, usize)> {
    let mut hits: Vec<(usize, usize)> = term
        .variants
        .iter()
        .flat_map(|v| term_positions(lower, v).into_iter().map(move |pos| (pos, v.len())))
        .collect();
    hits.sort_unstable();
    // Variants like "spring" and "spring boot" start at the same offset.
    hits.dedup_by_key(|(pos, _)| *pos);
    hits
}

/// Strong and medium verbs present near the hits, scored once each.
pub fn context_strength(lower: &str, hits: &[(usize, usize)]) -> f64 {
    let nearby: String = hits
        .iter()
        .map(|(pos, len)| window(lower, *pos, *len, CONTEXT_RADIUS))
        .collect::<Vec<_>>()
        .join(" ");

    let strong = STRONG_CONTEXT_VERBS
        .iter()
        .filter(|v| contains_term(&nearby, v))
        .count() as f64;
    let medium = MEDIUM_CONTEXT_VERBS
        .iter()
        .filter(|v| contains_term(&nearby, v))
        .count() as f64;

    (strong * STRONG_VERB_BONUS + medium * MEDIUM_VERB_BONUS).min(CONTEXT_CAP)
}

fn evidence(content: &str, hits: &[(usize, usize)]) -> Vec<String> {
    hits.iter()
        .take(MAX_EVIDENCE)
        .map(|(pos, len)| squash_whitespace(window(content, *pos, *len, CONTEXT_RADIUS / 2)))
        .collect()
}

fn extract_technical(content: &str, lower: &str) -> Vec<CvParameter> {
    TECHNICAL_SKILLS
        .iter()
        .filter_map(|term| {
            let hits = variant_hits(lower, term);
            if hits.is_empty() {
                return None;
            }
            let frequency = hits.len() as f64;
            let strength = (frequency * 0.2 + context_strength(lower, &hits)).min(1.0);
            Some(CvParameter {
                name: term.name.to_string(),
                category: CvCategory::Technical,
                strength,
                value: format!("mentioned {}x", hits.len()),
                evidence: evidence(content, &hits),
                years_of_experience: None,
            })
        })
        .collect()
}

fn extract_leadership(content: &str, lower: &str) -> Vec<CvParameter> {
    let mut params: Vec<CvParameter> = LEADERSHIP_TERMS
        .iter()
        .filter_map(|term| {
            let hits = variant_hits(lower, term);
            if hits.is_empty() {
                return None;
            }
            Some(CvParameter {
                name: term.name.to_string(),
                category: CvCategory::Leadership,
                strength: (0.3 + 0.15 * hits.len() as f64).min(SENIOR_SIGNAL_STRENGTH),
                value: format!("{} indicators", hits.len()),
                evidence: evidence(content, &hits),
                years_of_experience: None,
            })
        })
        .collect();

    let team_size = TEAM_SIZE_PATTERNS
        .iter()
        .flat_map(|re| re.captures_iter(content))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max();
    if let Some(size) = team_size {
        params.push(CvParameter {
            name: "team_size".to_string(),
            category: CvCategory::Leadership,
            strength: SENIOR_SIGNAL_STRENGTH,
            value: size.to_string(),
            evidence: vec![format!("team of {size}")],
            years_of_experience: None,
        });
    }

    let senior_titles: Vec<String> = SENIOR_ROLE_TITLES
        .iter()
        .filter(|t| contains_term(lower, t))
        .map(|t| t.to_string())
        .collect();
    if !senior_titles.is_empty() {
        params.push(CvParameter {
            name: "senior_role".to_string(),
            category: CvCategory::Leadership,
            strength: SENIOR_SIGNAL_STRENGTH,
            value: senior_titles.join(", "),
            evidence: senior_titles,
            years_of_experience: None,
        });
    }

    params
}

fn extract_indicator_terms(
    content: &str,
    lower: &str,
    terms: &[Term],
    category: CvCategory,
    cap: f64,
) -> Vec<CvParameter> {
    terms
        .iter()
        .filter_map(|term| {
            let hits = variant_hits(lower, term);
            if hits.is_empty() {
                return None;
            }
            Some(CvParameter {
                name: term.name.to_string(),
                category,
                strength: (0.3 + 0.1 * hits.len() as f64).min(cap),
                value: term.name.to_string(),
                evidence: evidence(content, &hits),
                years_of_experience: None,
            })
        })
        .collect()
}

fn extract_education(lower: &str) -> Option<CvParameter> {
    let (degree, base, _) = DEGREES
        .iter()
        .find(|(_, _, keywords)| keywords.iter().any(|k| contains_term(lower, k)))?;

    let field = SCIENCE_FIELDS.iter().find(|f| contains_term(lower, f));
    let strength = if field.is_some() { *base } else { base * 0.8 };
    let value = match field {
        Some(field) => format!("{degree}, {field}"),
        None => degree.to_string(),
    };

    Some(CvParameter {
        name: "education".to_string(),
        category: CvCategory::Education,
        strength,
        value,
        evidence: Vec::new(),
        years_of_experience: None,
    })
}
