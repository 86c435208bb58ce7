//! The pegnet node: follows factomd's directory block height.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::{keys, loader::expand_home, validation, Config};
use crate::node::activation::{ActivationParameters, Network};
use crate::node::factomd::FactomClient;
use crate::node::types::{NodeError, NodeResult, SyncStatus};
use crate::node::Synchronizer;
use crate::observability::metrics;

/// Synchronizer tracking the pegnet chain on top of factomd.
#[derive(Debug)]
pub struct Pegnetd {
    ctx: CancellationToken,
    factomd: FactomClient,
    wallet: Url,
    db_path: PathBuf,
    network: Network,
    params: ActivationParameters,
    retry_period: Duration,
    sync_height: AtomicU32,
    factom_height: AtomicU32,
}

impl Pegnetd {
    /// Build the node from configuration.
    ///
    /// The node syncs until `ctx` is cancelled. Fails if the endpoints are
    /// not http(s) URLs, the network is unknown, or the database directory
    /// cannot be created.
    pub fn new(
        ctx: &CancellationToken,
        config: &Config,
        params: ActivationParameters,
    ) -> NodeResult<Self> {
        let (server, wallet) = match (
            validation::endpoint(config, keys::SERVER),
            validation::endpoint(config, keys::WALLET),
        ) {
            (Ok(server), Ok(wallet)) => (server, wallet),
            (server, wallet) => {
                let errors = server.err().into_iter().chain(wallet.err()).collect();
                return Err(NodeError::Config(errors));
            }
        };

        let network: Network = config.get_string(keys::NETWORK).parse()?;

        let db_path = expand_home(&config.get_string(keys::SQLITE_DB_PATH));
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| NodeError::Database {
                path: db_path.clone(),
                source,
            })?;
        }

        let mut retry_period = config.get_duration(keys::DBLOCK_SYNC_RETRY_PERIOD);
        if retry_period.is_zero() {
            retry_period = keys::DEFAULT_DBLOCK_SYNC_RETRY_PERIOD;
        }

        tracing::info!(
            server = %server,
            wallet = %wallet,
            network = %network,
            db = %db_path.display(),
            "Pegnet node initialized"
        );

        Ok(Self {
            ctx: ctx.clone(),
            factomd: FactomClient::new(server),
            wallet,
            db_path,
            network,
            params,
            retry_period,
            sync_height: AtomicU32::new(0),
            factom_height: AtomicU32::new(0),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn wallet(&self) -> &Url {
        &self.wallet
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn params(&self) -> &ActivationParameters {
        &self.params
    }

    pub fn retry_period(&self) -> Duration {
        self.retry_period
    }

    pub fn sync_status(&self) -> SyncStatus {
        let sync_height = self.sync_height.load(Ordering::Acquire);
        SyncStatus {
            sync_height,
            factom_height: self.factom_height.load(Ordering::Acquire),
            grading_version: self.params.grading_version(self.network, sync_height),
            pegnet_active: self.params.pegnet_active(sync_height),
        }
    }

    /// One pass: fetch factomd's height and advance to it.
    async fn sync_once(&self) -> NodeResult<()> {
        let heights = self.factomd.heights().await?;
        let target = heights.directory_block;
        self.factom_height.store(target, Ordering::Release);
        metrics::record_factom_height(target);

        let synced = self.sync_height.load(Ordering::Acquire);
        let start = synced
            .saturating_add(1)
            .max(self.params.activation_height(self.network));
        if target < start {
            tracing::trace!(synced, factom = target, "Nothing to sync");
            return Ok(());
        }

        let previous_grading = self.params.grading_version(self.network, synced);
        let grading = self.params.grading_version(self.network, target);
        if grading != previous_grading {
            tracing::info!(
                height = target,
                from = previous_grading,
                to = grading,
                "Grading version changed"
            );
        }
        if !self.params.pegnet_active(synced) && self.params.pegnet_active(target) {
            tracing::info!(height = self.params.pegnet_activation, "Pegnet transactions activated");
        }

        self.sync_height.store(target, Ordering::Release);
        metrics::record_sync_height(target);
        tracing::debug!(from = start, to = target, grading, "Synced directory blocks");
        Ok(())
    }
}

#[async_trait]
impl Synchronizer for Pegnetd {
    async fn dblock_sync(&self) -> NodeResult<()> {
        tracing::info!(retry = ?self.retry_period, "Directory block sync starting");

        loop {
            tokio::select! {
                biased;
                _ = self.ctx.cancelled() => break,
                result = self.sync_once() => {
                    if let Err(e) = result {
                        metrics::record_sync_error();
                        tracing::warn!(error = %e, "Sync attempt failed, will retry");
                    }
                }
            }

            tokio::select! {
                biased;
                _ = self.ctx.cancelled() => break,
                _ = tokio::time::sleep(self.retry_period) => {}
            }
        }

        tracing::info!(
            height = self.sync_height.load(Ordering::Acquire),
            "Directory block sync stopped"
        );
        Ok(())
    }
}
