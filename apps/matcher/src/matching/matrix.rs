//! Dense parameter matrices: the aligned inputs of the match calculator.
//!
//! A `JobMatrix` has one row per job over the sorted union of all job
//! parameter names; a `CvMatrix` is a single strength vector positionally
//! aligned with its own parameter list. Missing cells are zero.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::cv_extractor::{analyze_cv_with, CvAnalysisOptions};
use crate::analysis::job_extractor::analyze_job;
use crate::analysis::models::{CvAnalysis, JobAnalysis, JobInput};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixMetadata {
    pub created_at: DateTime<Utc>,
    pub row_count: usize,
    pub parameter_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatrix {
    pub matrix_id: String,
    pub jobs: Vec<JobAnalysis>,
    /// Sorted, duplicate-free union of every job's parameter names.
    pub parameters: Vec<String>,
    /// `weight_matrix[job][parameter]`; 0 where the job did not emit the parameter.
    pub weight_matrix: Vec<Vec<f64>>,
    pub metadata: MatrixMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvMatrix {
    pub matrix_id: String,
    pub cv_analysis: CvAnalysis,
    pub parameters: Vec<String>,
    pub strength_vector: Vec<f64>,
    pub metadata: MatrixMetadata,
}

/// Progress report emitted after each job of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub job_title: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Job matrix
// ────────────────────────────────────────────────────────────────────────────

#[allow(dead_code)] // the service always reports progress
pub fn generate_job_matrix(jobs: &[JobInput]) -> JobMatrix {
    generate_job_matrix_with_progress(jobs, |_| {})
}

/// Analyzes jobs sequentially in input order, reporting progress after each one.
pub fn generate_job_matrix_with_progress<F>(jobs: &[JobInput], mut on_progress: F) -> JobMatrix
where
    F: FnMut(BatchProgress),
{
    let total = jobs.len();
    let analyses = jobs
        .iter()
        .enumerate()
        .map(|(i, job)| {
            let analysis = analyze_job(job);
            on_progress(BatchProgress {
                completed: i + 1,
                total,
                percent: (((i + 1) * 100) / total) as u8,
                job_title: job.title.clone(),
            });
            analysis
        })
        .collect();

    job_matrix_from_analyses(analyses)
}

/// Builds the aligned matrix from analyses that were already computed.
pub fn job_matrix_from_analyses(jobs: Vec<JobAnalysis>) -> JobMatrix {
    let parameters: Vec<String> = jobs
        .iter()
        .flat_map(|job| job.parameters.iter().map(|p| p.name.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let weight_matrix: Vec<Vec<f64>> = jobs
        .iter()
        .map(|job| {
            parameters
                .iter()
                .map(|name| job.parameter(name).map(|p| p.weight).unwrap_or(0.0))
                .collect()
        })
        .collect();

    info!(
        jobs = jobs.len(),
        parameters = parameters.len(),
        "job matrix generated"
    );

    JobMatrix {
        matrix_id: Uuid::new_v4().to_string(),
        metadata: MatrixMetadata {
            created_at: Utc::now(),
            row_count: jobs.len(),
            parameter_count: parameters.len(),
        },
        jobs,
        parameters,
        weight_matrix,
    }
}

impl JobMatrix {
    /// Weight of `name` for the job at `row`; zero for unknown rows or names.
    #[allow(dead_code)]
    pub fn weight(&self, row: usize, name: &str) -> f64 {
        let Ok(col) = self.parameters.binary_search_by(|p| p.as_str().cmp(name)) else {
            return 0.0;
        };
        self.weight_matrix
            .get(row)
            .and_then(|weights| weights.get(col))
            .copied()
            .unwrap_or(0.0)
    }

    /// Checks the shape invariants of a matrix received from a caller.
    pub fn validate(&self) -> Result<(), String> {
        if self.weight_matrix.len() != self.jobs.len() {
            return Err(format!(
                "weightMatrix has {} rows but there are {} jobs",
                self.weight_matrix.len(),
                self.jobs.len()
            ));
        }
        if let Some((i, row)) = self
            .weight_matrix
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.parameters.len())
        {
            return Err(format!(
                "weightMatrix row {i} has {} cells but there are {} parameters",
                row.len(),
                self.parameters.len()
            ));
        }
        if self.parameters.windows(2).any(|w| w[0] >= w[1]) {
            return Err("parameters must be sorted and unique".to_string());
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CV matrix
// ────────────────────────────────────────────────────────────────────────────

pub fn generate_cv_matrix(content: &str, cv_id: &str, options: &CvAnalysisOptions) -> CvMatrix {
    cv_matrix_from_analysis(analyze_cv_with(content, cv_id, options))
}

pub fn cv_matrix_from_analysis(cv_analysis: CvAnalysis) -> CvMatrix {
    let parameters: Vec<String> = cv_analysis.parameters.iter().map(|p| p.name.clone()).collect();
    let strength_vector: Vec<f64> = cv_analysis.parameters.iter().map(|p| p.strength).collect();

    info!(
        cv_id = %cv_analysis.cv_id,
        parameters = parameters.len(),
        "cv matrix generated"
    );

    CvMatrix {
        matrix_id: Uuid::new_v4().to_string(),
        metadata: MatrixMetadata {
            created_at: Utc::now(),
            row_count: 1,
            parameter_count: parameters.len(),
        },
        cv_analysis,
        parameters,
        strength_vector,
    }
}

impl CvMatrix {
    /// Strength of `name`; zero when the CV did not emit it.
    pub fn strength(&self, name: &str) -> f64 {
        self.parameters
            .iter()
            .position(|p| p == name)
            .and_then(|i| self.strength_vector.get(i))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.strength_vector.len() != self.parameters.len() {
            return Err(format!(
                "strengthVector has {} entries but there are {} parameters",
                self.strength_vector.len(),
                self.parameters.len()
            ));
        }
        Ok(())
    }
}
