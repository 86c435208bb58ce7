//! Client for a running daemon's API, used by auxiliary commands.

use serde_json::Value;

use crate::api::{ApiError, METHOD_GET_SYNC_STATUS, RPC_PATH};
use crate::jsonrpc::{Request, Response};
use crate::node::SyncStatus;

/// Ask the daemon at `endpoint` (no trailing slash) for its sync status.
pub async fn get_sync_status(endpoint: &str) -> Result<SyncStatus, ApiError> {
    let url = format!("{}{}", endpoint.trim_end_matches('/'), RPC_PATH);
    let request_failed = |reason: String| ApiError::Request {
        url: url.clone(),
        reason,
    };

    let response = reqwest::Client::new()
        .post(&url)
        .json(&Request::new(0, METHOD_GET_SYNC_STATUS, Value::Null))
        .send()
        .await
        .map_err(|e| request_failed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(request_failed(format!("HTTP {}", status)));
    }

    let reply: Response<SyncStatus> = response
        .json()
        .await
        .map_err(|e| request_failed(format!("malformed reply: {}", e)))?;
    Ok(reply.into_result()?)
}
