//! Startup orchestration.
//!
//! # Responsibilities
//! - Apply testing overrides to the activation parameters
//! - Bind CLI flags and seed config defaults
//! - Install the interrupt listener
//! - Read the config file and set the log level before any subsystem exists
//!
//! # Design Decisions
//! - Bootstrap steps run in a fixed order, never concurrently
//! - The primary run path treats a missing config file as fatal, auxiliary
//!   commands fall back to defaults

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::{keys, validation, Config, ConfigError, FlagValue};
use crate::lifecycle::daemon::{self, DaemonError, NodeFactory};
use crate::lifecycle::exit::ExitHandler;
use crate::lifecycle::signals::{self, InterruptListener};
use crate::node::ActivationParameters;
use crate::observability::logging::{init_logger, LogThreshold};
use crate::observability::metrics;

/// Values of the global command line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Flags {
    pub log: FlagValue,
    pub server: FlagValue,
    pub wallet: FlagValue,
    pub pegnetd: FlagValue,
    pub api: FlagValue,
    pub testing: bool,
}

impl Default for Flags {
    /// Every flag at its default, none set by the user.
    fn default() -> Self {
        Self {
            log: FlagValue::unset(keys::DEFAULT_LOGGING_LEVEL),
            server: FlagValue::unset(keys::DEFAULT_SERVER),
            wallet: FlagValue::unset(keys::DEFAULT_WALLET),
            pegnetd: FlagValue::unset(keys::DEFAULT_PEGNETD),
            api: FlagValue::unset(keys::DEFAULT_API_LISTEN),
            testing: false,
        }
    }
}

/// Everything bootstrap produces for the commands that follow.
#[derive(Debug)]
pub struct Bootstrap {
    pub config: Config,
    pub params: ActivationParameters,
    pub exit: Arc<ExitHandler>,
    pub interrupt: InterruptListener,
}

/// Config search locations: `$HOME/.pegnetd` first, then the working
/// directory.
pub fn default_search_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("$HOME/.pegnetd"), PathBuf::from(".")]
}

/// Run the bootstrap steps, in order.
///
/// Each call of `interrupt` waits for one shutdown request; `terminate`
/// ends the process afterwards. Must be called within a Tokio runtime.
pub fn bootstrap<S, Fut, T>(
    flags: &Flags,
    search_paths: &[PathBuf],
    interrupt: S,
    terminate: T,
) -> Bootstrap
where
    S: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
    T: FnOnce() + Send + 'static,
{
    // 1. Testing mode
    let mut params = ActivationParameters::default();
    if flags.testing {
        tracing::info!("in testing mode, activation heights are 0");
        params.apply_testing_overrides();
    }

    // 2. Config search paths and flag bindings
    let mut config = Config::new(keys::CONFIG_NAME);
    for path in search_paths {
        config.add_search_path(path);
    }
    config.bind_flag(keys::LOGGING_LEVEL, flags.log.clone());
    config.bind_flag(keys::SERVER, flags.server.clone());
    config.bind_flag(keys::WALLET, flags.wallet.clone());
    config.bind_flag(keys::PEGNETD, flags.pegnetd.clone());
    config.bind_flag(keys::API_LISTEN, flags.api.clone());

    // 3. Defaults
    keys::seed_defaults(&mut config);

    // 4. Interrupt listener
    let exit = Arc::new(ExitHandler::new());
    let interrupt = InterruptListener::spawn(exit.clone(), interrupt, terminate);

    Bootstrap {
        config,
        params,
        exit,
        interrupt,
    }
}

/// Read the config file, then apply the configured log level.
///
/// Used by the primary run path: a missing or broken file is logged and
/// returned, and the log level is left alone.
pub fn read_config(config: &mut Config, threshold: &LogThreshold) -> Result<(), ConfigError> {
    config.read_in_config().map_err(|e| {
        tracing::error!(error = %e, "failed to load config");
        e
    })?;

    init_logger(config, threshold);
    Ok(())
}

/// Like [`read_config`], but a missing or broken file only logs at debug
/// level and the defaults stay in effect.
pub fn read_config_or_defaults(config: &mut Config, threshold: &LogThreshold) {
    if let Err(e) = config.read_in_config() {
        tracing::debug!(error = %e, "failed to load config");
    }
    init_logger(config, threshold);
}

/// Start the Prometheus exporter if `app.metricslisten` is set.
///
/// Failures are logged; the daemon runs on without metrics.
fn start_metrics(config: &Config) {
    if config.get_string(keys::METRICS_LISTEN).trim().is_empty() {
        return;
    }

    match validation::listen_address(config, keys::METRICS_LISTEN) {
        Ok(addr) => {
            if let Err(e) = metrics::init_metrics(addr) {
                tracing::error!(error = %e, address = %addr, "Failed to start metrics exporter");
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to parse metrics address"),
    }
}

/// The daemon's primary run path.
pub struct Daemon<F> {
    factory: F,
    threshold: LogThreshold,
    search_paths: Vec<PathBuf>,
}

impl<F: NodeFactory> Daemon<F> {
    pub fn new(factory: F, threshold: LogThreshold) -> Self {
        Self {
            factory,
            threshold,
            search_paths: default_search_paths(),
        }
    }

    /// Look for the config file in `paths` instead of the defaults.
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Run until the sync loop returns, shutting down on SIGINT.
    pub async fn execute(self, flags: &Flags) -> Result<(), DaemonError> {
        self.execute_with(flags, signals::interrupt, signals::exit_process).await
    }

    /// Run with a custom interrupt source and terminator.
    pub async fn execute_with<S, Fut, T>(
        self,
        flags: &Flags,
        interrupt: S,
        terminate: T,
    ) -> Result<(), DaemonError>
    where
        S: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
        T: FnOnce() + Send + 'static,
    {
        let Bootstrap {
            mut config,
            params,
            exit,
            interrupt,
        } = bootstrap(flags, &self.search_paths, interrupt, terminate);

        read_config(&mut config, &self.threshold)?;
        interrupt.set_grace(config.get_duration(keys::SHUTDOWN_GRACE));
        start_metrics(&config);

        tracing::info!(
            config = ?config.config_file_used(),
            level = %self.threshold.level(),
            "Configuration loaded"
        );

        let ctx = CancellationToken::new();
        daemon::run(&self.factory, ctx, Arc::new(config), params, &exit).await
    }
}
