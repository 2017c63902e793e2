//! `POST /mcp`: JSON-RPC 2.0 endpoint speaking the tool subset of MCP.
//!
//! Supported methods: `initialize`, `ping`, `tools/list`, `tools/call`.
//! Notifications (no `id` key) are acknowledged with `202 Accepted`.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::AppState;
use crate::metrics::RPC_REQUESTS_TOTAL;
use crate::rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
use crate::tools;

pub const SERVER_NAME: &str = "Card Limit Manager";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-03-26";

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

fn reply(response: JsonRpcResponse) -> Response {
    (StatusCode::OK, Json(response)).into_response()
}

pub async fn handle(State(state): State<AppState>, body: Bytes) -> Response {
    RPC_REQUESTS_TOTAL.inc();

    let raw: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "unparseable json-rpc body");
            return reply(JsonRpcResponse::failure(Value::Null, JsonRpcError::parse_error(e)));
        }
    };
    let raw_id = raw.get("id").cloned().unwrap_or(Value::Null);

    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => return reply(JsonRpcResponse::failure(raw_id, JsonRpcError::invalid_request(e))),
    };
    if request.jsonrpc != JSONRPC_VERSION {
        return reply(JsonRpcResponse::failure(
            raw_id,
            JsonRpcError::invalid_request(format!("unsupported jsonrpc version {}", request.jsonrpc)),
        ));
    }

    let Some(id) = request.id else {
        debug!(method = %request.method, "notification acknowledged");
        return StatusCode::ACCEPTED.into_response();
    };

    match dispatch(&state, &request.method, request.params).await {
        Ok(result) => reply(JsonRpcResponse::success(id, result)),
        Err(error) => reply(JsonRpcResponse::failure(id, error)),
    }
}

async fn dispatch(state: &AppState, method: &str, params: Option<Value>) -> Result<Value, JsonRpcError> {
    match method {
        "initialize" => {
            let requested = params
                .as_ref()
                .and_then(|p| p.get("protocolVersion"))
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PROTOCOL_VERSION);
            Ok(json!({
                "protocolVersion": requested,
                "capabilities": {"tools": {}},
                "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")}
            }))
        }
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({"tools": tools::catalog()})),
        "tools/call" => {
            let params: ToolCallParams = serde_json::from_value(params.unwrap_or_else(|| json!({})))
                .map_err(JsonRpcError::invalid_params)?;
            let result = tools::call_tool(&*state.service, &params.name, params.arguments).await?;
            serde_json::to_value(result).map_err(JsonRpcError::internal)
        }
        other => Err(JsonRpcError::method_not_found(other)),
    }
}
