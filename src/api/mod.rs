//! Pegnetd API subsystem.
//!
//! # Data Flow
//! ```text
//! POST /v1 (JSON-RPC 2.0)
//!     → server.rs (axum router, request tracing)
//!     → handlers.rs (method dispatch)
//!     → Pegnetd::sync_status
//!
//! client.rs: auxiliary commands query a running daemon over the same API
//! ```
//!
//! # Design Decisions
//! - The server runs on its own task until the root context is cancelled
//! - Server errors are reported to the caller, never escalated to exit

pub mod client;
pub mod handlers;
pub mod server;

use std::net::SocketAddr;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::validation::ValidationError;
use crate::jsonrpc::RpcError;

pub use server::ApiServer;

/// JSON-RPC method reporting sync progress.
pub const METHOD_GET_SYNC_STATUS: &str = "get-sync-status";

/// Path the JSON-RPC endpoint is mounted on.
pub const RPC_PATH: &str = "/v1";

/// Errors from serving or calling the API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Listen(#[from] ValidationError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("API server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// A server that runs until `done` is cancelled.
#[async_trait]
pub trait ApiService: Send + Sync + 'static {
    async fn start(&self, done: CancellationToken) -> Result<(), ApiError>;
}
