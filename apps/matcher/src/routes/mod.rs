pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::clustering::handlers as clustering;
use crate::matching::handlers as matching;
use crate::rpc::handlers as rpc;
use crate::state::AppState;
use crate::variants::handlers as variants;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Tool-call surface
        .route("/rpc", post(rpc::handle_rpc))
        // Documents
        .route(
            "/api/v1/jobs",
            get(analysis::handle_list_jobs).post(analysis::handle_store_job),
        )
        .route("/api/v1/cvs", post(analysis::handle_store_cv))
        // Analysis
        .route("/api/v1/jobs/analyze", post(analysis::handle_analyze_job))
        .route("/api/v1/cvs/analyze", post(analysis::handle_analyze_cv))
        // Matching
        .route(
            "/api/v1/matrices/jobs",
            post(matching::handle_generate_job_matrix),
        )
        .route("/api/v1/matrices/cv", post(matching::handle_generate_cv_matrix))
        .route("/api/v1/match", post(matching::handle_calculate_match))
        // Downstream of matching
        .route("/api/v1/clusters", post(clustering::handle_cluster_jobs))
        .route("/api/v1/variants", post(variants::handle_generate_variant))
        .with_state(state)
}
