use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::cv_extractor::analyze_cv_with;
use crate::analysis::job_extractor::analyze_job;
use crate::analysis::models::{CvAnalysis, JobAnalysis, JobInput};
use crate::errors::AppError;
use crate::state::AppState;

/// Identifier given to CVs analyzed inline without an id.
pub const INLINE_CV_ID: &str = "inline";

/// A CV passed inline, by stored id, or both (content wins, id labels it).
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CvSource {
    pub cv_content: Option<String>,
    pub cv_id: Option<String>,
}

/// Jobs passed inline and/or by stored id. Omitting both means every stored
/// job; an explicit empty `jobs` list stays empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobsSource {
    pub jobs: Option<Vec<JobInput>>,
    pub job_ids: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Input resolution (shared with the RPC tools)
// ────────────────────────────────────────────────────────────────────────────

/// Returns `(cv_id, content)`. Inline content is used even when blank.
pub async fn resolve_cv(state: &AppState, source: CvSource) -> Result<(String, String), AppError> {
    match (source.cv_content, source.cv_id) {
        (Some(content), id) => Ok((id.unwrap_or_else(|| INLINE_CV_ID.to_string()), content)),
        (_, Some(id)) => {
            let content = state.store.load_cv(&id).await?;
            Ok((id, content))
        }
        _ => Err(AppError::Validation(
            "Either cvContent or cvId is required".to_string(),
        )),
    }
}

/// A job given only by id is loaded from the store; anything else is used as-is.
pub async fn resolve_job(state: &AppState, job: JobInput) -> Result<JobInput, AppError> {
    match &job.id {
        Some(id) if job.title.is_empty() && job.description.is_empty() => {
            state.store.load_job(id).await
        }
        _ => Ok(job),
    }
}

pub async fn resolve_jobs(state: &AppState, source: JobsSource) -> Result<Vec<JobInput>, AppError> {
    if source.jobs.is_none() && source.job_ids.is_empty() {
        let stored = state.store.list_jobs().await?;
        info!(jobs = stored.len(), "using every stored job");
        return Ok(stored);
    }

    let mut jobs = source.jobs.unwrap_or_default();
    for id in &source.job_ids {
        jobs.push(state.store.load_job(id).await?);
    }
    Ok(jobs)
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

pub async fn analyze_job_request(state: &AppState, job: JobInput) -> Result<JobAnalysis, AppError> {
    let job = resolve_job(state, job).await?;
    if job.title.is_empty() && job.description.is_empty() {
        warn!("analyzing a job with neither title nor description");
    }
    let analysis = analyze_job(&job);
    info!(
        job = %analysis.display_id(),
        parameters = analysis.parameters.len(),
        seniority = %analysis.seniority_level,
        "job analyzed"
    );
    Ok(analysis)
}

pub async fn analyze_cv_request(state: &AppState, source: CvSource) -> Result<CvAnalysis, AppError> {
    let (cv_id, content) = resolve_cv(state, source).await?;
    let analysis = analyze_cv_with(&content, &cv_id, &state.cv_options());
    info!(
        cv_id = %analysis.cv_id,
        parameters = analysis.parameters.len(),
        total_experience = analysis.total_experience,
        "cv analyzed"
    );
    Ok(analysis)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCvRequest {
    pub cv_id: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: String,
}

pub async fn store_job_request(state: &AppState, job: JobInput) -> Result<StoredDocument, AppError> {
    if job.title.trim().is_empty() && job.description.trim().is_empty() {
        return Err(AppError::Validation(
            "A job needs a title or a description".to_string(),
        ));
    }
    let id = state.store.save_job(&job).await?;
    Ok(StoredDocument { id })
}

pub async fn store_cv_request(
    state: &AppState,
    req: StoreCvRequest,
) -> Result<StoredDocument, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("CV content cannot be empty".to_string()));
    }
    let id = state.store.save_cv(&req.cv_id, &req.content).await?;
    Ok(StoredDocument { id })
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/analyze
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    Json(job): Json<JobInput>,
) -> Result<Json<JobAnalysis>, AppError> {
    Ok(Json(analyze_job_request(&state, job).await?))
}

/// POST /api/v1/cvs/analyze
pub async fn handle_analyze_cv(
    State(state): State<AppState>,
    Json(source): Json<CvSource>,
) -> Result<Json<CvAnalysis>, AppError> {
    Ok(Json(analyze_cv_request(&state, source).await?))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobInput>>, AppError> {
    Ok(Json(state.store.list_jobs().await?))
}

/// POST /api/v1/jobs
pub async fn handle_store_job(
    State(state): State<AppState>,
    Json(job): Json<JobInput>,
) -> Result<Json<StoredDocument>, AppError> {
    Ok(Json(store_job_request(&state, job).await?))
}

/// POST /api/v1/cvs
pub async fn handle_store_cv(
    State(state): State<AppState>,
    Json(req): Json<StoreCvRequest>,
) -> Result<Json<StoredDocument>, AppError> {
    Ok(Json(store_cv_request(&state, req).await?))
}
