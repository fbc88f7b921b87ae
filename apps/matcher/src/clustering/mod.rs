//! Job clustering: groups analyzed jobs by the role family their keywords
//! point to.
//!
//! Each job is scored against a fixed table of role families by counting
//! family keywords in its title, key requirements and parameter names. The
//! best-scoring family wins; the earlier entry wins a tie and jobs with no hit
//! land in `general`.

pub mod handlers;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::models::{JobAnalysis, SeniorityLevel};
use crate::analysis::text::{count_term, round4};

/// Share of a cluster's jobs that must carry a parameter for it to be common.
const COMMON_PARAMETER_SHARE: f64 = 0.5;
const MAX_COMMON_PARAMETERS: usize = 10;

struct ClusterPattern {
    id: &'static str,
    name: &'static str,
    keywords: &'static [&'static str],
}

const CLUSTER_PATTERNS: &[ClusterPattern] = &[
    ClusterPattern {
        id: "backend",
        name: "Backend Engineering",
        keywords: &[
            "backend", "back-end", "api", "microservices", "python", "java", "golang", "rust",
            "node.js", "django", "spring", "sql", "postgresql", "kafka",
        ],
    },
    ClusterPattern {
        id: "frontend",
        name: "Frontend Engineering",
        keywords: &[
            "frontend", "front-end", "react", "angular", "vue", "javascript", "typescript",
            "css", "ui", "ux",
        ],
    },
    ClusterPattern {
        id: "cloud_devops",
        name: "Cloud & DevOps",
        keywords: &[
            "devops", "sre", "cloud", "aws", "azure", "gcp", "kubernetes", "docker",
            "terraform", "ci/cd", "infrastructure", "platform",
        ],
    },
    ClusterPattern {
        id: "data_ml",
        name: "Data & ML",
        keywords: &[
            "data", "machine learning", "ml", "tensorflow", "pytorch", "data engineering",
            "analytics", "artificial intelligence", "scientist",
        ],
    },
    ClusterPattern {
        id: "leadership",
        name: "Leadership & Management",
        keywords: &[
            "head of", "director", "manager", "management", "people management", "leadership",
            "team lead", "vp", "cto", "hiring",
        ],
    },
];

const GENERAL_ID: &str = "general";
const GENERAL_NAME: &str = "General";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonParameter {
    pub name: String,
    /// Mean weight over the cluster jobs that carry the parameter.
    pub average_weight: f64,
    /// Fraction of the cluster's jobs that carry it.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCluster {
    pub cluster_id: String,
    pub name: String,
    pub job_ids: Vec<String>,
    pub job_titles: Vec<String>,
    pub common_parameters: Vec<CommonParameter>,
    pub dominant_seniority: SeniorityLevel,
}

// ────────────────────────────────────────────────────────────────────────────
// Clustering
// ────────────────────────────────────────────────────────────────────────────

/// Groups jobs into role-family clusters, largest first.
pub fn cluster_jobs(jobs: &[JobAnalysis]) -> Vec<JobCluster> {
    // Members per pattern index; `None` is the general bucket.
    let mut members: Vec<(Option<usize>, Vec<&JobAnalysis>)> = Vec::new();

    for job in jobs {
        let family = classify(job);
        debug!(
            job = %job.display_id(),
            cluster = family.map(|i| CLUSTER_PATTERNS[i].id).unwrap_or(GENERAL_ID),
            "job classified"
        );
        match members.iter_mut().find(|(key, _)| *key == family) {
            Some((_, list)) => list.push(job),
            None => members.push((family, vec![job])),
        }
    }

    // Table order first, general last, then a stable sort by size.
    members.sort_by_key(|(key, _)| key.unwrap_or(usize::MAX));
    members.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let clusters: Vec<JobCluster> = members
        .into_iter()
        .map(|(key, list)| build_cluster(key, &list))
        .collect();

    info!(jobs = jobs.len(), clusters = clusters.len(), "jobs clustered");
    clusters
}

/// Index of the best-matching pattern, or `None` when nothing matched.
fn classify(job: &JobAnalysis) -> Option<usize> {
    let mut haystack = job.title.to_lowercase();
    for requirement in &job.key_requirements {
        haystack.push('\n');
        haystack.push_str(&requirement.to_lowercase());
    }
    for parameter in &job.parameters {
        haystack.push('\n');
        haystack.push_str(&parameter.name);
    }

    let mut best: Option<(usize, usize)> = None;
    for (i, pattern) in CLUSTER_PATTERNS.iter().enumerate() {
        let score: usize = pattern.keywords.iter().map(|k| count_term(&haystack, k)).sum();
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

fn build_cluster(key: Option<usize>, jobs: &[&JobAnalysis]) -> JobCluster {
    let (cluster_id, name) = match key.and_then(|i| CLUSTER_PATTERNS.get(i)) {
        Some(pattern) => (pattern.id, pattern.name),
        None => (GENERAL_ID, GENERAL_NAME),
    };

    JobCluster {
        cluster_id: cluster_id.to_string(),
        name: name.to_string(),
        job_ids: jobs.iter().map(|j| j.display_id()).collect(),
        job_titles: jobs.iter().map(|j| j.title.clone()).collect(),
        common_parameters: common_parameters(jobs),
        dominant_seniority: dominant_seniority(jobs),
    }
}

fn common_parameters(jobs: &[&JobAnalysis]) -> Vec<CommonParameter> {
    if jobs.is_empty() {
        return Vec::new();
    }

    let mut weights: HashMap<&str, Vec<f64>> = HashMap::new();
    for job in jobs {
        for parameter in &job.parameters {
            weights.entry(parameter.name.as_str()).or_default().push(parameter.weight);
        }
    }

    let total = jobs.len() as f64;
    let mut common: Vec<CommonParameter> = weights
        .into_iter()
        .filter_map(|(name, ws)| {
            let share = ws.len() as f64 / total;
            (share >= COMMON_PARAMETER_SHARE).then(|| CommonParameter {
                name: name.to_string(),
                average_weight: round4(ws.iter().sum::<f64>() / ws.len() as f64),
                share: round4(share),
            })
        })
        .collect();

    common.sort_by(|a, b| {
        b.average_weight
            .total_cmp(&a.average_weight)
            .then_with(|| a.name.cmp(&b.name))
    });
    common.truncate(MAX_COMMON_PARAMETERS);
    common
}

/// Most frequent level; the more senior level wins a tie.
fn dominant_seniority(jobs: &[&JobAnalysis]) -> SeniorityLevel {
    let mut counts: HashMap<SeniorityLevel, usize> = HashMap::new();
    for job in jobs {
        *counts.entry(job.seniority_level).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
        .map(|(level, _)| level)
        .unwrap_or_default()
}
