//! Static term tables shared by the job and CV extractors.
//!
//! Job and CV parameters must share names for the matrices to align, so every
//! term lives here once: `name` is the parameter name, `weight` is the job-side
//! base weight and `variants` are the spellings searched on the CV side.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::analysis::models::{ParameterCategory, SeniorityLevel};

#[derive(Debug, Clone, Copy)]
pub struct Term {
    pub name: &'static str,
    pub weight: f64,
    pub variants: &'static [&'static str],
}

const fn term(name: &'static str, weight: f64, variants: &'static [&'static str]) -> Term {
    Term {
        name,
        weight,
        variants,
    }
}

pub const TECHNICAL_SKILLS: &[Term] = &[
    term("python", 0.8, &["python", "python3"]),
    term("javascript", 0.7, &["javascript", "js", "ecmascript"]),
    term("typescript", 0.75, &["typescript", "ts"]),
    term("java", 0.7, &["java"]),
    term("golang", 0.7, &["golang"]),
    term("rust", 0.75, &["rust"]),
    term("c++", 0.7, &["c++", "cpp"]),
    term("c#", 0.7, &["c#", ".net", "dotnet"]),
    term("php", 0.6, &["php"]),
    term("ruby", 0.6, &["ruby", "rails"]),
    term("react", 0.7, &["react", "reactjs", "react.js"]),
    term("angular", 0.65, &["angular", "angularjs"]),
    term("vue", 0.65, &["vue", "vuejs", "vue.js"]),
    term("node.js", 0.7, &["node.js", "nodejs", "node"]),
    term("django", 0.65, &["django"]),
    term("flask", 0.6, &["flask"]),
    term("spring", 0.65, &["spring", "spring boot"]),
    term("aws", 0.9, &["aws", "amazon web services"]),
    term("azure", 0.85, &["azure"]),
    term("gcp", 0.85, &["gcp", "google cloud"]),
    term("docker", 0.8, &["docker", "containers"]),
    term("kubernetes", 0.85, &["kubernetes", "k8s"]),
    term("terraform", 0.8, &["terraform"]),
    term("ci/cd", 0.7, &["ci/cd", "continuous integration", "continuous delivery"]),
    term("microservices", 0.75, &["microservices", "microservice"]),
    term("sql", 0.7, &["sql"]),
    term("postgresql", 0.7, &["postgresql", "postgres"]),
    term("mongodb", 0.65, &["mongodb", "mongo"]),
    term("redis", 0.6, &["redis"]),
    term("kafka", 0.7, &["kafka"]),
    term("graphql", 0.6, &["graphql"]),
    term("machine learning", 0.8, &["machine learning", "ml"]),
    term("tensorflow", 0.75, &["tensorflow"]),
    term("pytorch", 0.75, &["pytorch"]),
    term("data engineering", 0.75, &["data engineering", "data pipelines", "etl"]),
    term("linux", 0.6, &["linux", "unix"]),
    term("git", 0.5, &["git", "github", "gitlab"]),
];

pub const LEADERSHIP_TERMS: &[Term] = &[
    term("leadership", 0.8, &["leadership", "led", "leading"]),
    term("team lead", 0.8, &["team lead", "tech lead", "technical lead"]),
    term("management", 0.7, &["management", "managed", "managing", "manager"]),
    term("people management", 0.85, &["people management", "line management", "direct reports"]),
    term("mentoring", 0.7, &["mentoring", "mentored", "mentor", "coached", "coaching"]),
    term("hiring", 0.65, &["hiring", "hired", "recruiting", "recruited"]),
    term("strategy", 0.6, &["strategy", "strategic", "roadmap"]),
    term("stakeholder management", 0.7, &["stakeholder", "stakeholders"]),
    term("cross-functional", 0.6, &["cross-functional", "cross functional"]),
];

pub const DOMAIN_TERMS: &[Term] = &[
    term("fintech", 0.7, &["fintech", "financial technology"]),
    term("banking", 0.65, &["banking", "bank"]),
    term("payments", 0.65, &["payments", "payment"]),
    term("insurance", 0.6, &["insurance", "insurtech"]),
    term("healthcare", 0.65, &["healthcare", "health", "medical"]),
    term("e-commerce", 0.6, &["e-commerce", "ecommerce", "online retail"]),
    term("saas", 0.6, &["saas", "software as a service"]),
    term("automotive", 0.6, &["automotive", "mobility"]),
    term("logistics", 0.55, &["logistics", "supply chain"]),
    term("energy", 0.55, &["energy", "renewables"]),
    term("telecommunications", 0.55, &["telecommunications", "telecom"]),
    term("gaming", 0.5, &["gaming", "games"]),
    term("blockchain", 0.6, &["blockchain", "web3", "crypto"]),
    term("artificial intelligence", 0.7, &["artificial intelligence", "ai"]),
];

pub const SOFT_SKILLS: &[Term] = &[
    term("communication", 0.6, &["communication", "communicated", "communicating"]),
    term("teamwork", 0.5, &["teamwork", "team player"]),
    term("collaboration", 0.55, &["collaboration", "collaborated", "collaborative"]),
    term("problem solving", 0.6, &["problem solving", "problem-solving", "solved"]),
    term("critical thinking", 0.55, &["critical thinking", "analytical"]),
    term("adaptability", 0.5, &["adaptability", "adaptable", "flexible"]),
    term("attention to detail", 0.5, &["attention to detail", "detail-oriented"]),
    term("ownership", 0.55, &["ownership", "self-motivated", "proactive"]),
    term("presentation", 0.5, &["presentation", "presented", "public speaking"]),
    term("english", 0.6, &["english"]),
    term("german", 0.6, &["german", "deutsch"]),
];

/// Name lookup across all four dictionaries.
pub static TERM_INDEX: Lazy<HashMap<&'static str, (ParameterCategory, &'static Term)>> =
    Lazy::new(|| {
        let tables = [
            (ParameterCategory::Technical, TECHNICAL_SKILLS),
            (ParameterCategory::Leadership, LEADERSHIP_TERMS),
            (ParameterCategory::Domain, DOMAIN_TERMS),
            (ParameterCategory::Soft, SOFT_SKILLS),
        ];
        tables
            .into_iter()
            .flat_map(|(category, terms)| terms.iter().map(move |t| (t.name, (category, t))))
            .collect()
    });

// ────────────────────────────────────────────────────────────────────────────
// Seniority
// ────────────────────────────────────────────────────────────────────────────

/// Title keywords per level, checked in this order (highest level first).
pub const SENIORITY_KEYWORDS: &[(SeniorityLevel, &[&str])] = &[
    (
        SeniorityLevel::Executive,
        &["chief", "cto", "ceo", "cio", "vp", "vice president", "executive"],
    ),
    (SeniorityLevel::Director, &["director", "head of"]),
    (SeniorityLevel::Lead, &["lead", "principal", "staff", "architect"]),
    (SeniorityLevel::Senior, &["senior", "sr", "sr."]),
    (SeniorityLevel::Mid, &["mid", "mid-level", "intermediate", "regular"]),
    (
        SeniorityLevel::Junior,
        &["junior", "jr", "jr.", "entry", "graduate", "intern", "trainee"],
    ),
];

/// Per-category weight multipliers applied after extraction.
/// Technical importance shrinks and leadership grows with seniority.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryMultipliers {
    pub technical: f64,
    pub leadership: f64,
    pub domain: f64,
    pub soft: f64,
}

pub fn seniority_multipliers(level: SeniorityLevel) -> CategoryMultipliers {
    let (technical, leadership, domain, soft) = match level {
        SeniorityLevel::Junior => (1.1, 0.6, 0.9, 1.0),
        SeniorityLevel::Mid => (1.05, 0.8, 1.0, 1.0),
        SeniorityLevel::Senior => (1.0, 1.0, 1.0, 1.0),
        SeniorityLevel::Lead => (0.9, 1.15, 1.05, 1.05),
        SeniorityLevel::Director => (0.8, 1.3, 1.1, 1.1),
        SeniorityLevel::Executive => (0.7, 1.4, 1.15, 1.1),
    };
    CategoryMultipliers {
        technical,
        leadership,
        domain,
        soft,
    }
}

impl CategoryMultipliers {
    pub fn for_category(&self, category: ParameterCategory) -> f64 {
        match category {
            ParameterCategory::Technical => self.technical,
            ParameterCategory::Leadership => self.leadership,
            ParameterCategory::Domain => self.domain,
            ParameterCategory::Soft => self.soft,
            ParameterCategory::Location | ParameterCategory::Company => 1.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CV-side indicator lists
// ────────────────────────────────────────────────────────────────────────────

pub const STRONG_CONTEXT_VERBS: &[&str] = &["implemented", "architected", "built", "led", "expertise"];

pub const MEDIUM_CONTEXT_VERBS: &[&str] = &["used", "worked with", "experience"];

/// Titles that mark a CV as having held a senior role.
pub const SENIOR_ROLE_TITLES: &[&str] = &["director", "head of", "cto", "vp", "chief"];

/// Degree keywords by level, highest first.
pub const DEGREES: &[(&str, f64, &[&str])] = &[
    ("phd", 0.8, &["phd", "ph.d", "doctorate", "doctoral"]),
    ("master", 0.7, &["master", "msc", "m.sc", "mba", "diplom"]),
    ("bachelor", 0.6, &["bachelor", "bsc", "b.sc", "b.s.", "b.a."]),
];

pub const SCIENCE_FIELDS: &[&str] = &[
    "computer science",
    "informatics",
    "software engineering",
    "engineering",
    "mathematics",
    "physics",
    "data science",
    "information systems",
    "science",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_names_are_unique_across_dictionaries() {
        let total = TECHNICAL_SKILLS.len()
            + LEADERSHIP_TERMS.len()
            + DOMAIN_TERMS.len()
            + SOFT_SKILLS.len();
        assert_eq!(TERM_INDEX.len(), total);
    }

    #[test]
    fn test_weights_within_unit_interval() {
        for (_, (_, t)) in TERM_INDEX.iter() {
            assert!((0.0..=1.0).contains(&t.weight), "{} out of range", t.name);
            assert!(!t.variants.is_empty(), "{} has no variants", t.name);
        }
    }

    #[test]
    fn test_senior_multipliers_are_neutral() {
        let m = seniority_multipliers(SeniorityLevel::Senior);
        assert_eq!(m.technical, 1.0);
        assert_eq!(m.leadership, 1.0);
    }

    #[test]
    fn test_multipliers_shift_towards_leadership() {
        let junior = seniority_multipliers(SeniorityLevel::Junior);
        let exec = seniority_multipliers(SeniorityLevel::Executive);
        assert!(junior.technical > exec.technical);
        assert!(junior.leadership < exec.leadership);
    }

    #[test]
    fn test_keyword_table_checks_highest_level_first() {
        assert_eq!(SENIORITY_KEYWORDS[0].0, SeniorityLevel::Executive);
        assert_eq!(SENIORITY_KEYWORDS.last().unwrap().0, SeniorityLevel::Junior);
    }
}
