//! Daemon lifecycle: bootstrap, primary path and interrupt-driven shutdown.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pegnetd::api::{ApiError, ApiService};
use pegnetd::config::{keys, Config, FlagValue};
use pegnetd::lifecycle::{
    self, Daemon, DaemonError, ExitHandler, Flags, NodeFactory, PegnetdFactory,
};
use pegnetd::node::{ActivationParameters, NodeError, NodeResult, Synchronizer};
use pegnetd::observability::logging::{LogLevel, LogThreshold};
use tokio_util::sync::CancellationToken;

use common::{counting_terminator, manual_interrupts, start_mock_factomd, wait_for, write_config};

/// A node that waits for its context.
struct IdleNode {
    ctx: CancellationToken,
}

#[async_trait]
impl Synchronizer for IdleNode {
    async fn dblock_sync(&self) -> NodeResult<()> {
        self.ctx.cancelled().await;
        Ok(())
    }
}

struct IdleApi;

#[async_trait]
impl ApiService for IdleApi {
    async fn start(&self, done: CancellationToken) -> Result<(), ApiError> {
        done.cancelled().await;
        Ok(())
    }
}

/// Records what the node saw when it was constructed.
#[derive(Clone)]
struct RecordingFactory {
    threshold: LogThreshold,
    level_at_construction: Arc<Mutex<Option<LogLevel>>>,
    server_at_construction: Arc<Mutex<Option<String>>>,
}

impl RecordingFactory {
    fn new(threshold: LogThreshold) -> Self {
        Self {
            threshold,
            level_at_construction: Arc::new(Mutex::new(None)),
            server_at_construction: Arc::new(Mutex::new(None)),
        }
    }
}

impl NodeFactory for RecordingFactory {
    type Node = IdleNode;

    fn new_node(
        &self,
        ctx: &CancellationToken,
        config: &Config,
        _params: ActivationParameters,
    ) -> Result<Arc<IdleNode>, NodeError> {
        *self.level_at_construction.lock().unwrap() = Some(self.threshold.level());
        *self.server_at_construction.lock().unwrap() = Some(config.get_string(keys::SERVER));
        Ok(Arc::new(IdleNode { ctx: ctx.clone() }))
    }

    fn new_api(&self, _config: &Config, _node: Arc<IdleNode>) -> Box<dyn ApiService> {
        Box::new(IdleApi)
    }
}

#[tokio::test]
async fn test_daemon_runs_until_interrupted() {
    let factomd = start_mock_factomd(206_500).await;
    let dir = tempfile::tempdir().unwrap();
    write_config(
        dir.path(),
        &[
            ("loglevel", "debug"),
            ("server", factomd.url.as_str()),
            ("apilisten", "127.0.0.1:0"),
            ("dbsyncretry", "20ms"),
        ],
    );

    let threshold = LogThreshold::detached(LogLevel::Info);
    let daemon = Daemon::new(PegnetdFactory, threshold.clone())
        .with_search_paths(vec![dir.path().to_path_buf()]);
    let (signals, interrupts) = manual_interrupts();
    let (terminated, terminate) = counting_terminator();

    let running = tokio::spawn(async move {
        daemon.execute_with(&Flags::default(), interrupts, terminate).await
    });

    let calls = factomd.calls.clone();
    assert!(wait_for(move || calls.load(Ordering::SeqCst) >= 2, Duration::from_secs(5)).await);
    assert_eq!(threshold.level(), LogLevel::Debug);
    assert_eq!(terminated.load(Ordering::SeqCst), 0);

    signals.notify_one();

    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());

    let count = terminated.clone();
    assert!(wait_for(move || count.load(Ordering::SeqCst) == 1, Duration::from_secs(5)).await);
    assert!(dir.path().join("db").is_dir());
}

#[tokio::test]
async fn test_second_interrupt_skips_configured_grace() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &[("shutdowngrace", "1h")]);

    let threshold = LogThreshold::detached(LogLevel::Info);
    let daemon = Daemon::new(RecordingFactory::new(threshold.clone()), threshold)
        .with_search_paths(vec![dir.path().to_path_buf()]);
    let (signals, interrupts) = manual_interrupts();
    let (terminated, terminate) = counting_terminator();

    let running = tokio::spawn(async move {
        daemon.execute_with(&Flags::default(), interrupts, terminate).await
    });

    signals.notify_one();
    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());

    // The primary path has returned but the grace keeps termination back.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(terminated.load(Ordering::SeqCst), 0);

    signals.notify_one();
    let count = terminated.clone();
    assert!(wait_for(move || count.load(Ordering::SeqCst) == 1, Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_log_level_is_set_before_node_construction() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &[("loglevel", "WARN"), ("server", "http://file:8088/v2")]);

    let threshold = LogThreshold::detached(LogLevel::Info);
    let factory = RecordingFactory::new(threshold.clone());
    let daemon = Daemon::new(factory.clone(), threshold)
        .with_search_paths(vec![dir.path().to_path_buf()]);
    let flags = Flags {
        server: FlagValue::set("http://flag:8088/v2"),
        ..Flags::default()
    };
    let (_, terminate) = counting_terminator();

    // Interrupts fire at once; the root cancel still reaches the node.
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        daemon.execute_with(&flags, || async {}, terminate),
    )
    .await
    .unwrap();

    assert!(result.is_ok());
    assert_eq!(*factory.level_at_construction.lock().unwrap(), Some(LogLevel::Warn));
    assert_eq!(
        factory.server_at_construction.lock().unwrap().as_deref(),
        Some("http://flag:8088/v2")
    );
}

#[tokio::test]
async fn test_missing_config_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let threshold = LogThreshold::detached(LogLevel::Info);
    let factory = RecordingFactory::new(threshold.clone());
    let daemon = Daemon::new(factory.clone(), threshold)
        .with_search_paths(vec![dir.path().to_path_buf()]);
    let (terminated, terminate) = counting_terminator();

    let result = daemon
        .execute_with(&Flags::default(), std::future::pending::<()>, terminate)
        .await;

    assert!(matches!(result, Err(DaemonError::Config(_))));
    assert!(factory.level_at_construction.lock().unwrap().is_none());
    assert_eq!(terminated.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancelled_root_context_returns_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::new(keys::CONFIG_NAME);
    config.bind_flag(keys::SERVER, FlagValue::unset(keys::DEFAULT_SERVER));
    config.bind_flag(keys::WALLET, FlagValue::unset(keys::DEFAULT_WALLET));
    config.bind_flag(keys::API_LISTEN, FlagValue::set("127.0.0.1:0"));
    keys::seed_defaults(&mut config);
    config.set_default(
        keys::SQLITE_DB_PATH,
        dir.path().join("sql.db").to_string_lossy().into_owned(),
    );

    let exit = ExitHandler::new();
    let callbacks = Arc::new(AtomicUsize::new(0));
    let counter = callbacks.clone();
    exit.add_cancel(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let ctx = CancellationToken::new();
    ctx.cancel();
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        lifecycle::run(
            &PegnetdFactory,
            ctx,
            Arc::new(config),
            ActivationParameters::default(),
            &exit,
        ),
    )
    .await
    .unwrap();
    assert!(result.is_ok());

    assert_eq!(exit.close(), 2);
    assert_eq!(exit.close(), 0);
    assert_eq!(callbacks.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_node_construction_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &[("network", "DevNet")]);

    let daemon = Daemon::new(PegnetdFactory, LogThreshold::detached(LogLevel::Info))
        .with_search_paths(vec![dir.path().to_path_buf()]);
    let (_, terminate) = counting_terminator();

    let result = daemon
        .execute_with(&Flags::default(), std::future::pending::<()>, terminate)
        .await;
    assert!(matches!(result, Err(DaemonError::NodeConstruction(NodeError::Network(_)))));
}
