//! Running the daemon: subsystem construction and the primary path.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiServer, ApiService};
use crate::config::{Config, ConfigError};
use crate::lifecycle::exit::ExitHandler;
use crate::node::{ActivationParameters, NodeError, Pegnetd, Synchronizer};

/// Failures that end the daemon with a non-zero exit status.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to load config: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to launch pegnet node: {0}")]
    NodeConstruction(#[source] NodeError),

    #[error("directory block sync failed: {0}")]
    Sync(#[source] NodeError),
}

/// Builds the subsystems the daemon runs.
pub trait NodeFactory: Send + Sync {
    type Node: Synchronizer;

    /// Construct the synchronizer bound to the root context.
    fn new_node(
        &self,
        ctx: &CancellationToken,
        config: &Config,
        params: ActivationParameters,
    ) -> Result<Arc<Self::Node>, NodeError>;

    /// Construct the API server around a handle to the synchronizer.
    fn new_api(&self, config: &Config, node: Arc<Self::Node>) -> Box<dyn ApiService>;
}

/// Production subsystems: [`Pegnetd`] and [`ApiServer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PegnetdFactory;

impl NodeFactory for PegnetdFactory {
    type Node = Pegnetd;

    fn new_node(
        &self,
        ctx: &CancellationToken,
        config: &Config,
        params: ActivationParameters,
    ) -> Result<Arc<Pegnetd>, NodeError> {
        Pegnetd::new(ctx, config, params).map(Arc::new)
    }

    fn new_api(&self, config: &Config, node: Arc<Pegnetd>) -> Box<dyn ApiService> {
        Box::new(ApiServer::new(config, node))
    }
}

/// Run the daemon until the synchronizer returns.
///
/// The root cancel is registered with `exit` before anything is started, so
/// a shutdown requested during construction is not lost. The API server
/// runs on its own task; its errors are logged and never end the daemon.
pub async fn run<F: NodeFactory>(
    factory: &F,
    ctx: CancellationToken,
    config: Arc<Config>,
    params: ActivationParameters,
    exit: &ExitHandler,
) -> Result<(), DaemonError> {
    let root = ctx.clone();
    exit.add_cancel(move || root.cancel());

    let node = factory.new_node(&ctx, &config, params).map_err(|e| {
        tracing::error!(error = %e, "failed to launch pegnet node");
        DaemonError::NodeConstruction(e)
    })?;

    let api = factory.new_api(&config, node.clone());
    let done = ctx.clone();
    tokio::spawn(async move {
        if let Err(e) = api.start(done).await {
            tracing::error!(error = %e, "API server failed");
        }
    });

    let result = node.dblock_sync().await;

    // Stops the API server when the loop ended on its own.
    ctx.cancel();

    result.map_err(|e| {
        tracing::error!(error = %e, "Directory block sync failed");
        DaemonError::Sync(e)
    })
}
