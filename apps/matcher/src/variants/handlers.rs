use axum::{extract::State, Json};
use serde::Deserialize;

use crate::analysis::handlers::{resolve_cv, resolve_job, CvSource};
use crate::analysis::job_extractor::analyze_job;
use crate::analysis::models::JobInput;
use crate::errors::AppError;
use crate::matching::calculator::calculate_match;
use crate::matching::matrix::{generate_cv_matrix, job_matrix_from_analyses};
use crate::state::AppState;
use crate::variants::{generate_variant, policy_for, CvVariant};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateVariantRequest {
    #[serde(flatten)]
    pub cv: CvSource,
    pub job: Option<JobInput>,
    pub job_id: Option<String>,
    /// Overrides `VARIANT_SEED` for this request.
    pub seed: Option<u64>,
}

pub async fn generate_variant_request(
    state: &AppState,
    req: GenerateVariantRequest,
) -> Result<CvVariant, AppError> {
    let job = match (req.job, req.job_id) {
        (Some(job), _) => resolve_job(state, job).await?,
        (None, Some(id)) => state.store.load_job(&id).await?,
        (None, None) => {
            return Err(AppError::Validation(
                "Either job or jobId is required".to_string(),
            ))
        }
    };
    let (cv_id, content) = resolve_cv(state, req.cv).await?;

    let job_analysis = analyze_job(&job);
    let job_matrix = job_matrix_from_analyses(vec![job_analysis.clone()]);
    let cv_matrix = generate_cv_matrix(&content, &cv_id, &state.cv_options());
    let report = calculate_match(&job_matrix, &cv_matrix);
    let match_result = report
        .matches
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("match report for a single job was empty"))?;

    let mut policy = policy_for(
        req.seed.or(state.config.variant_seed),
        state.config.variant_modify_probability,
    );
    Ok(generate_variant(&content, &match_result, &job_analysis, policy.as_mut()))
}

/// POST /api/v1/variants
pub async fn handle_generate_variant(
    State(state): State<AppState>,
    Json(req): Json<GenerateVariantRequest>,
) -> Result<Json<CvVariant>, AppError> {
    Ok(Json(generate_variant_request(&state, req).await?))
}
