//! Configuration keys and built-in defaults.
//!
//! Every key lives under the `app` table of `pegnetd-conf.toml`:
//!
//! ```toml
//! [app]
//! loglevel = "debug"
//! server = "http://localhost:8088/v2"
//! dbsyncretry = "5s"
//! ```

use std::time::Duration;

use crate::config::store::Config;

/// Name of the config file, without extension.
pub const CONFIG_NAME: &str = "pegnetd-conf";

/// Logging severity name (trace, debug, info, warn, error, fatal).
pub const LOGGING_LEVEL: &str = "app.loglevel";

/// factomd v2 API endpoint.
pub const SERVER: &str = "app.server";

/// factom-walletd v2 API endpoint.
pub const WALLET: &str = "app.wallet";

/// This daemon's own API endpoint, used by auxiliary commands.
pub const PEGNETD: &str = "app.pegnetd";

/// Port (or `host:port`) the API server listens on.
pub const API_LISTEN: &str = "app.apilisten";

/// Delay between directory block sync attempts.
pub const DBLOCK_SYNC_RETRY_PERIOD: &str = "app.dbsyncretry";

/// Path of the local database file. `$HOME` is expanded.
pub const SQLITE_DB_PATH: &str = "app.sqlitedbpath";

/// Network the node follows (`MainNet` or `TestNet`).
pub const NETWORK: &str = "app.network";

/// Address the Prometheus exporter listens on. Empty disables it.
pub const METRICS_LISTEN: &str = "app.metricslisten";

/// Upper bound between closing the exit handler and forcing process exit.
pub const SHUTDOWN_GRACE: &str = "app.shutdowngrace";

pub const DEFAULT_LOGGING_LEVEL: &str = "info";
pub const DEFAULT_SERVER: &str = "http://localhost:8088/v2";
pub const DEFAULT_WALLET: &str = "http://localhost:8089/v2";
pub const DEFAULT_PEGNETD: &str = "http://localhost:8070";
pub const DEFAULT_API_LISTEN: &str = "8070";
pub const DEFAULT_DBLOCK_SYNC_RETRY_PERIOD: Duration = Duration::from_secs(5);
pub const DEFAULT_SQLITE_DB_PATH: &str = "$HOME/.pegnetd/mainnet/sql.db";
pub const DEFAULT_NETWORK: &str = "MainNet";
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::ZERO;

/// Seed defaults for keys that no flag is guaranteed to supply.
pub fn seed_defaults(config: &mut Config) {
    config.set_default(DBLOCK_SYNC_RETRY_PERIOD, DEFAULT_DBLOCK_SYNC_RETRY_PERIOD);
    config.set_default(SQLITE_DB_PATH, DEFAULT_SQLITE_DB_PATH);
    config.set_default(NETWORK, DEFAULT_NETWORK);
    config.set_default(SHUTDOWN_GRACE, DEFAULT_SHUTDOWN_GRACE);
}
