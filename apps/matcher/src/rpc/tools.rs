//! Tool registry: descriptors for `tools/list` and dispatch by tool name.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::analysis::handlers::{
    analyze_cv_request, analyze_job_request, store_cv_request, store_job_request,
};
use crate::clustering::handlers::cluster_jobs_request;
use crate::errors::AppError;
use crate::matching::handlers::{
    calculate_match_request, generate_cv_matrix_request, generate_job_matrix_request,
};
use crate::rpc::{RpcError, INVALID_PARAMS, METHOD_NOT_FOUND};
use crate::state::AppState;
use crate::variants::handlers::generate_variant_request;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<ToolError> for RpcError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool(_) => RpcError::new(METHOD_NOT_FOUND, err.to_string()),
            ToolError::InvalidArguments(_) => RpcError::new(INVALID_PARAMS, err.to_string()),
            ToolError::App(app) => app.into(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Descriptors
// ────────────────────────────────────────────────────────────────────────────

fn job_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "title": { "type": "string" },
            "company": { "type": "string" },
            "description": { "type": "string" },
            "location": { "type": "string" },
            "url": { "type": "string" }
        }
    })
}

fn cv_source_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "cvContent": { "type": "string", "description": "CV markdown" },
            "cvId": { "type": "string", "description": "Stored CV id, or a label for cvContent" }
        }
    })
}

fn jobs_source_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "jobs": { "type": "array", "items": job_schema() },
            "jobIds": { "type": "array", "items": { "type": "string" } }
        }
    })
}

pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "analyze_job",
            description: "Extract weighted parameters, key requirements and seniority from a job posting",
            input_schema: job_schema(),
        },
        ToolDescriptor {
            name: "analyze_cv",
            description: "Extract skill strengths, experience and seniority from a CV",
            input_schema: cv_source_schema(),
        },
        ToolDescriptor {
            name: "generate_job_matrix",
            description: "Analyze jobs and align their weights on one parameter axis; stored jobs are used when none are given",
            input_schema: jobs_source_schema(),
        },
        ToolDescriptor {
            name: "generate_cv_matrix",
            description: "Analyze a CV into a strength vector",
            input_schema: cv_source_schema(),
        },
        ToolDescriptor {
            name: "calculate_match",
            description: "Score a CV matrix against every job of a job matrix",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "jobMatrix": { "type": "object" },
                    "jobMatrixId": { "type": "string" },
                    "cvMatrix": { "type": "object" },
                    "cvMatrixId": { "type": "string" }
                }
            }),
        },
        ToolDescriptor {
            name: "cluster_jobs",
            description: "Group jobs into role families with their common parameters",
            input_schema: jobs_source_schema(),
        },
        ToolDescriptor {
            name: "generate_cv_variant",
            description: "Tailor a CV to one job using only skills the CV already evidences",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "cvContent": { "type": "string" },
                    "cvId": { "type": "string" },
                    "job": job_schema(),
                    "jobId": { "type": "string" },
                    "seed": { "type": "integer", "minimum": 0 }
                }
            }),
        },
        ToolDescriptor {
            name: "store_job",
            description: "Persist a job posting",
            input_schema: job_schema(),
        },
        ToolDescriptor {
            name: "store_cv",
            description: "Persist CV markdown under an id",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "cvId": { "type": "string" },
                    "content": { "type": "string" }
                },
                "required": ["cvId", "content"]
            }),
        },
        ToolDescriptor {
            name: "list_jobs",
            description: "List every stored job posting",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}

pub fn is_tool(name: &str) -> bool {
    tool_descriptors().iter().any(|t| t.name == name)
}

// ────────────────────────────────────────────────────────────────────────────
// Dispatch
// ────────────────────────────────────────────────────────────────────────────

/// Runs a tool; `null` arguments are treated as an empty object.
pub async fn call_tool(state: &AppState, name: &str, arguments: Value) -> Result<Value, ToolError> {
    match name {
        "analyze_job" => to_json(analyze_job_request(state, parse(arguments)?).await?),
        "analyze_cv" => to_json(analyze_cv_request(state, parse(arguments)?).await?),
        "generate_job_matrix" => {
            to_json(generate_job_matrix_request(state, parse(arguments)?).await?)
        }
        "generate_cv_matrix" => to_json(generate_cv_matrix_request(state, parse(arguments)?).await?),
        "calculate_match" => to_json(calculate_match_request(state, parse(arguments)?).await?),
        "cluster_jobs" => to_json(cluster_jobs_request(state, parse(arguments)?).await?),
        "generate_cv_variant" => to_json(generate_variant_request(state, parse(arguments)?).await?),
        "store_job" => to_json(store_job_request(state, parse(arguments)?).await?),
        "store_cv" => to_json(store_cv_request(state, parse(arguments)?).await?),
        "list_jobs" => to_json(state.store.list_jobs().await?),
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

fn parse<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::App(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;

    #[test]
    fn test_descriptor_names_are_unique() {
        let descriptors = tool_descriptors();
        let mut names: Vec<&str> = descriptors.iter().map(|t| t.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), descriptors.len());
        assert!(is_tool("calculate_match"));
        assert!(!is_tool("tools/list"));
    }

    #[tokio::test]
    async fn test_every_listed_tool_dispatches() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        for tool in tool_descriptors() {
            let result = call_tool(&state, tool.name, Value::Null).await;
            assert!(
                !matches!(result, Err(ToolError::UnknownTool(_))),
                "{} is listed but not dispatched",
                tool.name
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_and_bad_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let err = call_tool(&state, "delete_everything", Value::Null).await.unwrap_err();
        assert_eq!(RpcError::from(err).code, METHOD_NOT_FOUND);

        let err = call_tool(&state, "store_cv", json!({ "cvId": 3 })).await.unwrap_err();
        assert_eq!(RpcError::from(err).code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_store_then_analyze_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        call_tool(
            &state,
            "store_cv",
            json!({ "cvId": "ada", "content": "## Experience\n### Engineer | 2015 - 2020\nBuilt Rust services." }),
        )
        .await
        .unwrap();

        let analysis = call_tool(&state, "analyze_cv", json!({ "cvId": "ada" })).await.unwrap();
        assert_eq!(analysis["cvId"], "ada");
        assert_eq!(analysis["totalExperience"], 5.0);
    }

    #[tokio::test]
    async fn test_explicit_empty_jobs_give_an_empty_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let matrix = call_tool(&state, "generate_job_matrix", json!({ "jobs": [] }))
            .await
            .unwrap();
        assert_eq!(matrix["jobs"], json!([]));
        assert_eq!(matrix["parameters"], json!([]));

        call_tool(
            &state,
            "store_job",
            json!({ "title": "Rust Developer", "description": "rust" }),
        )
        .await
        .unwrap();
        let matrix = call_tool(&state, "generate_job_matrix", json!({ "jobs": [] }))
            .await
            .unwrap();
        assert_eq!(matrix["jobs"], json!([]));

        let stored = call_tool(&state, "generate_job_matrix", json!({})).await.unwrap();
        assert_eq!(stored["jobs"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_store_gives_an_empty_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let matrix = call_tool(&state, "generate_job_matrix", Value::Null).await.unwrap();
        assert_eq!(matrix["weightMatrix"], json!([]));
        let clusters = call_tool(&state, "cluster_jobs", Value::Null).await.unwrap();
        assert_eq!(clusters, json!([]));
    }

    #[tokio::test]
    async fn test_blank_cv_content_is_analyzed_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let analysis = call_tool(&state, "analyze_cv", json!({ "cvContent": "" }))
            .await
            .unwrap();
        assert_eq!(analysis["cvId"], "inline");
        assert_eq!(analysis["totalExperience"], 0.0);
        assert_eq!(analysis["parameters"], json!([]));
    }
}
