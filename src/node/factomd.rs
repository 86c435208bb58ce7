//! factomd v2 JSON-RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - POST JSON-RPC requests to the factomd endpoint
//! - Bound every call with a timeout
//! - Map transport, timeout and protocol failures onto `NodeError`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::timeout;
use url::Url;

use crate::jsonrpc::{Request, Response};
use crate::node::types::{Heights, NodeError, NodeResult};

/// Default per-request timeout.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// factomd RPC client.
#[derive(Clone)]
pub struct FactomClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout_duration: Duration,
    next_id: Arc<AtomicU64>,
}

impl FactomClient {
    pub fn new(endpoint: Url) -> Self {
        Self::with_timeout(endpoint, DEFAULT_RPC_TIMEOUT)
    }

    pub fn with_timeout(endpoint: Url, timeout_duration: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            timeout_duration,
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Current block heights of the connected node.
    pub async fn heights(&self) -> NodeResult<Heights> {
        self.request("heights", Value::Null).await
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> NodeResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = Request::new(id, method, params);

        let call = async {
            let response = self
                .http
                .post(self.endpoint.clone())
                .json(&body)
                .send()
                .await
                .map_err(|e| NodeError::Rpc(format!("{} {}: {}", method, self.endpoint, e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(NodeError::Rpc(format!("{} returned HTTP {}", method, status)));
            }

            response
                .json::<Response<T>>()
                .await
                .map_err(|e| NodeError::Rpc(format!("{}: malformed reply: {}", method, e)))
        };

        let reply = timeout(self.timeout_duration, call)
            .await
            .map_err(|_| NodeError::Timeout(self.timeout_duration.as_secs()))??;

        Ok(reply.into_result()?)
    }
}

impl std::fmt::Debug for FactomClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactomClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}
