use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::rpc::tools::{call_tool, is_tool, tool_descriptors};
use crate::rpc::{
    RpcError, RpcRequest, RpcResponse, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION,
    METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// POST /rpc
///
/// The body is taken as text so malformed JSON still gets a JSON-RPC error
/// instead of an extractor rejection. Notifications get `204 No Content`.
pub async fn handle_rpc(State(state): State<AppState>, body: String) -> Response {
    let raw: Value = match serde_json::from_str(&body) {
        Ok(raw) => raw,
        Err(e) => {
            let error = RpcError::new(PARSE_ERROR, format!("Parse error: {e}"));
            return Json(RpcResponse::failure(Value::Null, error)).into_response();
        }
    };

    let request: RpcRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            let error = RpcError::new(INVALID_REQUEST, format!("Invalid request: {e}"));
            return Json(RpcResponse::failure(Value::Null, error)).into_response();
        }
    };

    let is_notification = request.id.is_none();
    let response = dispatch(&state, request).await;
    if is_notification {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(response).into_response()
}

pub async fn dispatch(state: &AppState, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone().unwrap_or(Value::Null);

    if request.jsonrpc != JSONRPC_VERSION {
        return RpcResponse::failure(
            id,
            RpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\""),
        );
    }

    debug!(method = %request.method, "rpc request");
    let params = request.params.unwrap_or(Value::Null);

    let outcome = match request.method.as_str() {
        "tools/list" => Ok(json!({ "tools": tool_descriptors() })),
        "tools/call" => tools_call(state, params).await,
        method if is_tool(method) => call_tool(state, method, params).await.map_err(RpcError::from),
        method => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        )),
    };

    match outcome {
        Ok(result) => RpcResponse::success(id, result),
        Err(error) => {
            info!(method = %request.method, code = error.code, "rpc request failed");
            RpcResponse::failure(id, error)
        }
    }
}

/// `tools/call` wraps the tool output as text content plus the structured value.
async fn tools_call(state: &AppState, params: Value) -> Result<Value, RpcError> {
    let call: ToolCallParams = serde_json::from_value(params)
        .map_err(|e| RpcError::new(INVALID_PARAMS, format!("Invalid params: {e}")))?;

    let result = call_tool(state, &call.name, call.arguments)
        .await
        .map_err(RpcError::from)?;
    let text = serde_json::to_string_pretty(&result)
        .map_err(|e| RpcError::from(AppError::from(e)))?;

    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": result,
        "isError": false
    }))
}
