use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::analysis::handlers::{resolve_cv, resolve_jobs, CvSource, JobsSource};
use crate::errors::AppError;
use crate::matching::calculator::{calculate_match, ComprehensiveMatch};
use crate::matching::matrix::{
    generate_cv_matrix, generate_job_matrix_with_progress, CvMatrix, JobMatrix,
};
use crate::state::AppState;

/// Matrices may be passed inline or by the id they were persisted under.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalculateMatchRequest {
    pub job_matrix: Option<JobMatrix>,
    pub job_matrix_id: Option<String>,
    pub cv_matrix: Option<CvMatrix>,
    pub cv_matrix_id: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

/// Analyzes every job in input order, logs progress and persists the matrix.
pub async fn generate_job_matrix_request(
    state: &AppState,
    source: JobsSource,
) -> Result<JobMatrix, AppError> {
    let jobs = resolve_jobs(state, source).await?;

    let matrix = generate_job_matrix_with_progress(&jobs, |progress| {
        info!(
            completed = progress.completed,
            total = progress.total,
            percent = progress.percent,
            job = %progress.job_title,
            "job matrix progress"
        );
    });

    state.store.save_job_matrix(&matrix).await?;
    Ok(matrix)
}

pub async fn generate_cv_matrix_request(
    state: &AppState,
    source: CvSource,
) -> Result<CvMatrix, AppError> {
    let (cv_id, content) = resolve_cv(state, source).await?;
    let matrix = generate_cv_matrix(&content, &cv_id, &state.cv_options());
    state.store.save_cv_matrix(&matrix).await?;
    Ok(matrix)
}

pub async fn calculate_match_request(
    state: &AppState,
    req: CalculateMatchRequest,
) -> Result<ComprehensiveMatch, AppError> {
    let job_matrix = match (req.job_matrix, req.job_matrix_id) {
        (Some(matrix), _) => matrix,
        (None, Some(id)) => state.store.load_job_matrix(&id).await?,
        (None, None) => {
            return Err(AppError::Validation(
                "Either jobMatrix or jobMatrixId is required".to_string(),
            ))
        }
    };
    let cv_matrix = match (req.cv_matrix, req.cv_matrix_id) {
        (Some(matrix), _) => matrix,
        (None, Some(id)) => state.store.load_cv_matrix(&id).await?,
        (None, None) => {
            return Err(AppError::Validation(
                "Either cvMatrix or cvMatrixId is required".to_string(),
            ))
        }
    };

    job_matrix.validate().map_err(AppError::Validation)?;
    cv_matrix.validate().map_err(AppError::Validation)?;

    let report = calculate_match(&job_matrix, &cv_matrix);
    state.store.save_match(&report).await?;
    Ok(report)
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/matrices/jobs
pub async fn handle_generate_job_matrix(
    State(state): State<AppState>,
    Json(source): Json<JobsSource>,
) -> Result<Json<JobMatrix>, AppError> {
    Ok(Json(generate_job_matrix_request(&state, source).await?))
}

/// POST /api/v1/matrices/cv
pub async fn handle_generate_cv_matrix(
    State(state): State<AppState>,
    Json(source): Json<CvSource>,
) -> Result<Json<CvMatrix>, AppError> {
    Ok(Json(generate_cv_matrix_request(&state, source).await?))
}

/// POST /api/v1/match
pub async fn handle_calculate_match(
    State(state): State<AppState>,
    Json(req): Json<CalculateMatchRequest>,
) -> Result<Json<ComprehensiveMatch>, AppError> {
    Ok(Json(calculate_match_request(&state, req).await?))
}
