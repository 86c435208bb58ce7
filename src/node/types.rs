//! Node-specific types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::validation::ValidationError;
use crate::jsonrpc::RpcError;
use crate::node::activation::UnknownNetwork;

/// Errors that can occur while building or running the node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Endpoint or listen settings failed validation.
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),

    #[error(transparent)]
    Network(#[from] UnknownNetwork),

    /// The database location could not be prepared.
    #[error("database path {}: {source}", .path.display())]
    Database {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport-level RPC failure.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// factomd answered with a JSON-RPC error.
    #[error("factomd: {0}")]
    Factomd(#[from] RpcError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Heights reported by factomd's `heights` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heights {
    #[serde(rename = "directoryblockheight")]
    pub directory_block: u32,
    #[serde(rename = "leaderheight")]
    pub leader: u32,
    #[serde(rename = "entryblockheight", default)]
    pub entry_block: u32,
    #[serde(rename = "entryheight", default)]
    pub entry: u32,
}

/// Sync progress as reported over the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    #[serde(rename = "syncheight")]
    pub sync_height: u32,
    #[serde(rename = "factomheight")]
    pub factom_height: u32,
    #[serde(rename = "gradingversion")]
    pub grading_version: u8,
    #[serde(rename = "pegnetactive")]
    pub pegnet_active: bool,
}
