//! Pegnet node subsystem.
//!
//! # Data Flow
//! ```text
//! Config (server, wallet, db path, network, retry period)
//!     + ActivationParameters (bootstrap, maybe testing overrides)
//!     → pegnetd.rs Pegnetd::new
//!     → dblock_sync loop
//!         → factomd.rs heights() every retry period
//!         → sync height advances, metrics updated
//!     → returns when the root context is cancelled
//! ```
//!
//! # Design Decisions
//! - The node owns the root cancellation token it was built with
//! - RPC failures are logged and retried on the next tick, never fatal
//! - Activation parameters are passed in by value, never global

pub mod activation;
pub mod factomd;
pub mod pegnetd;
pub mod types;

use async_trait::async_trait;

pub use activation::{ActivationParameters, GradingSchedule, Network};
pub use factomd::FactomClient;
pub use pegnetd::Pegnetd;
pub use types::{Heights, NodeError, NodeResult, SyncStatus};

/// The long-running synchronization component driven by the daemon.
///
/// Implementations must watch the cancellation token they were built with
/// and return promptly once it fires.
#[async_trait]
pub trait Synchronizer: Send + Sync + 'static {
    /// Run the directory block sync loop until cancelled or a fatal error.
    async fn dblock_sync(&self) -> NodeResult<()>;
}
