use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::api::server::AppState;
use crate::api::METHOD_GET_SYNC_STATUS;
use crate::jsonrpc::{self, Request, Response, RpcError};
use crate::observability::metrics;

/// JSON-RPC entry point. Protocol errors are returned in the envelope with
/// HTTP 200, as JSON-RPC clients expect.
pub async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Json<Response> {
    let request: Request = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed API request");
            return Json(Response::error(
                Value::Null,
                RpcError::new(jsonrpc::PARSE_ERROR, format!("parse error: {}", e)),
            ));
        }
    };

    if request.jsonrpc != jsonrpc::VERSION {
        return Json(Response::error(
            request.id,
            RpcError::new(jsonrpc::INVALID_REQUEST, "jsonrpc must be \"2.0\""),
        ));
    }

    metrics::record_api_request(&request.method);
    tracing::debug!(method = %request.method, "API call");

    let reply = match request.method.as_str() {
        METHOD_GET_SYNC_STATUS => serde_json::to_value(state.node.sync_status())
            .map_err(|e| RpcError::new(jsonrpc::INTERNAL_ERROR, e.to_string())),
        other => Err(RpcError::new(
            jsonrpc::METHOD_NOT_FOUND,
            format!("method not found: {}", other),
        )),
    };

    Json(match reply {
        Ok(result) => Response::result(request.id, result),
        Err(error) => Response::error(request.id, error),
    })
}
