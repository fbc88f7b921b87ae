//! Job Parameter Extractor: turns a free-text posting into weighted parameters.
//!
//! Algorithm:
//! 1. Word-boundary search of the four dictionaries over `title + description`
//! 2. Technical weights boosted by frequency (capped at 1.2×)
//! 3. Synthetic `team_size`, `location` and `company` parameters
//! 4. Seniority from title keywords, falling back to "N years" ladders
//! 5. Global per-category rescale by seniority, clamped to [0, 1]
//!
//! Never fails: missing fields simply produce fewer parameters.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::analysis::dictionaries::{
    seniority_multipliers, Term, DOMAIN_TERMS, LEADERSHIP_TERMS, SENIORITY_KEYWORDS,
    SOFT_SKILLS, TECHNICAL_SKILLS,
};
use crate::analysis::models::{
    AnalysisMetadata, JobAnalysis, JobInput, Parameter, ParameterCategory, SeniorityLevel,
};
use crate::analysis::text::{contains_term, count_term, dedup_preserving_order, round4};

/// Upper bound on `key_requirements`.
const MAX_KEY_REQUIREMENTS: usize = 10;

/// Upper bound on the synthetic team-size weight.
const TEAM_SIZE_WEIGHT_CAP: f64 = 0.9;

static TEAM_SIZE_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(\d+)\+?\s*(?:members?|people|developers?|engineers?)")
            .expect("valid team size regex"),
        Regex::new(r"team of (\d+)").expect("valid team-of regex"),
    ]
});

static YEARS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\+?\s*(?:years?|yrs?)").expect("valid years regex"));

static BULLET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:[-*•]|\d+[.)])\s+(.+?)\s*$").expect("valid bullet regex")
});

static REQUIRED_SECTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:must[- ]haves?|required|requirements|essential)\s*:?\s*([^\n.;]+)")
        .expect("valid required-section regex")
});

/// `min(1.2, 1 + (f − 1) × 0.1)`, a diminishing boost for repeated mentions.
pub fn frequency_multiplier(frequency: usize) -> f64 {
    if frequency == 0 {
        return 1.0;
    }
    (1.0 + (frequency as f64 - 1.0) * 0.1).min(1.2)
}

/// Analyzes a single job posting.
pub fn analyze_job(job: &JobInput) -> JobAnalysis {
    let text = format!("{}\n{}", job.title, job.description).to_lowercase();

    let mut parameters = Vec::new();
    parameters.extend(extract_technical(&text));
    parameters.extend(extract_dictionary(&text, LEADERSHIP_TERMS, ParameterCategory::Leadership));
    if let Some(team) = extract_team_size(&text) {
        parameters.push(team);
    }
    parameters.extend(extract_dictionary(&text, DOMAIN_TERMS, ParameterCategory::Domain));
    parameters.extend(extract_dictionary(&text, SOFT_SKILLS, ParameterCategory::Soft));
    if let Some(location) = extract_location(job, &text) {
        parameters.push(location);
    }
    if let Some(company) = extract_company(job, &text) {
        parameters.push(company);
    }

    let seniority_level = determine_seniority(&job.title, &job.description);
    apply_seniority_scaling(&mut parameters, seniority_level);

    parameters.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    let key_requirements = extract_key_requirements(&job.description);

    debug!(
        title = %job.title,
        parameters = parameters.len(),
        seniority = %seniority_level,
        "job analyzed"
    );

    JobAnalysis {
        job_id: job.id.clone(),
        title: job.title.clone(),
        company: job.company.clone(),
        analysis_metadata: AnalysisMetadata::new(text.len(), parameters.len()),
        parameters,
        key_requirements,
        seniority_level,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dictionary passes
// ────────────────────────────────────────────────────────────────────────────

fn extract_technical(text: &str) -> Vec<Parameter> {
    TECHNICAL_SKILLS
        .iter()
        .filter_map(|term| {
            let frequency = count_term(text, term.name);
            if frequency == 0 {
                return None;
            }
            Some(Parameter {
                name: term.name.to_string(),
                category: ParameterCategory::Technical,
                weight: term.weight * frequency_multiplier(frequency),
                value: format!("mentioned {frequency}x"),
                confidence: confidence_for(frequency),
            })
        })
        .collect()
}

fn extract_dictionary(text: &str, terms: &[Term], category: ParameterCategory) -> Vec<Parameter> {
    terms
        .iter()
        .filter_map(|term| {
            let frequency = count_term(text, term.name);
            (frequency > 0).then(|| Parameter {
                name: term.name.to_string(),
                category,
                weight: term.weight,
                value: term.name.to_string(),
                confidence: confidence_for(frequency),
            })
        })
        .collect()
}

/// One mention is a fair signal; repeated mentions approach certainty.
fn confidence_for(frequency: usize) -> f64 {
    (0.7 + 0.1 * frequency as f64).min(1.0)
}

fn extract_team_size(text: &str) -> Option<Parameter> {
    let size = TEAM_SIZE_PATTERNS
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max()?;

    Some(Parameter {
        name: "team_size".to_string(),
        category: ParameterCategory::Leadership,
        weight: team_size_weight(size),
        value: size.to_string(),
        confidence: 0.9,
    })
}

/// `min(0.9, 0.6 + size / 50)`.
pub fn team_size_weight(size: u32) -> f64 {
    (0.6 + size as f64 / 50.0).min(TEAM_SIZE_WEIGHT_CAP)
}

fn extract_location(job: &JobInput, text: &str) -> Option<Parameter> {
    let location = job.location.as_deref().unwrap_or("").trim();
    let location_lower = location.to_lowercase();

    let weight = if location_lower.contains("remote") || contains_term(text, "remote") {
        0.9
    } else if location_lower.contains("berlin") {
        0.8
    } else if location_lower.contains("germany") || location_lower.contains("deutschland") {
        0.7
    } else if !location.is_empty() {
        0.5
    } else {
        return None;
    };

    let value = if location.is_empty() {
        "remote".to_string()
    } else {
        location.to_string()
    };

    Some(Parameter {
        name: "location".to_string(),
        category: ParameterCategory::Location,
        weight,
        value,
        confidence: if location.is_empty() { 0.6 } else { 0.9 },
    })
}

fn extract_company(job: &JobInput, text: &str) -> Option<Parameter> {
    let company = job.company.trim();
    if company.is_empty() {
        return None;
    }
    let company_lower = company.to_lowercase();

    let mut weight: f64 = 0.5;
    if contains_term(text, "startup") || company_lower.contains("startup") {
        weight += 0.2;
    }
    if contains_term(&company_lower, "gmbh") || contains_term(&company_lower, "ag") {
        weight += 0.1;
    }
    if company.chars().count() < 10 {
        weight += 0.1;
    }

    Some(Parameter {
        name: "company".to_string(),
        category: ParameterCategory::Company,
        weight: weight.min(1.0),
        value: company.to_string(),
        confidence: 0.8,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Seniority
// ────────────────────────────────────────────────────────────────────────────

/// Title keywords first (executive checked first), then the largest
/// "N years" figure in the description, else `mid`.
pub fn determine_seniority(title: &str, description: &str) -> SeniorityLevel {
    if let Some(level) = seniority_from_title(title) {
        return level;
    }

    let description = description.to_lowercase();
    YEARS_PATTERN
        .captures_iter(&description)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .map(|years| SeniorityLevel::from_years(years as f64))
        .unwrap_or_default()
}

/// Keyword match against a role title; shared with the CV extractor.
pub fn seniority_from_title(title: &str) -> Option<SeniorityLevel> {
    let title = title.to_lowercase();
    SENIORITY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_term(&title, k)))
        .map(|(level, _)| *level)
}

fn apply_seniority_scaling(parameters: &mut [Parameter], level: SeniorityLevel) {
    let multipliers = seniority_multipliers(level);
    for param in parameters.iter_mut() {
        let scaled = param.weight * multipliers.for_category(param.category);
        param.weight = round4(scaled.clamp(0.0, 1.0));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Key requirements
// ────────────────────────────────────────────────────────────────────────────

fn extract_key_requirements(description: &str) -> Vec<String> {
    let requirements: Vec<String> = BULLET_PATTERN
        .captures_iter(description)
        .chain(REQUIRED_SECTION_PATTERN.captures_iter(description))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect();

    let mut requirements: Vec<String> = dedup_preserving_order(
        requirements
            .into_iter()
            .filter(|r| r.chars().count() >= 3)
            .collect(),
    );
    requirements.truncate(MAX_KEY_REQUIREMENTS);
    requirements
}
