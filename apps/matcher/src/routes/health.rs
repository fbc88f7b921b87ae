use axum::Json;
use serde_json::{json, Value};

use crate::analysis::models::EXTRACTOR_VERSION;

/// GET /health
/// Returns a simple status object with service and extractor versions.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cv-matcher",
        "extractorVersion": EXTRACTOR_VERSION
    }))
}
