use axum::{extract::State, Json};

use crate::analysis::handlers::{resolve_jobs, JobsSource};
use crate::analysis::job_extractor::analyze_job;
use crate::analysis::models::JobAnalysis;
use crate::clustering::{cluster_jobs, JobCluster};
use crate::errors::AppError;
use crate::state::AppState;

pub async fn cluster_jobs_request(
    state: &AppState,
    source: JobsSource,
) -> Result<Vec<JobCluster>, AppError> {
    let jobs = resolve_jobs(state, source).await?;
    let analyses: Vec<JobAnalysis> = jobs.iter().map(analyze_job).collect();
    Ok(cluster_jobs(&analyses))
}

/// POST /api/v1/clusters
pub async fn handle_cluster_jobs(
    State(state): State<AppState>,
    Json(source): Json<JobsSource>,
) -> Result<Json<Vec<JobCluster>>, AppError> {
    Ok(Json(cluster_jobs_request(&state, source).await?))
}
