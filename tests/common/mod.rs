//! Shared utilities for integration tests.

use std::fs;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// A fake factomd answering `heights` with a settable height.
#[allow(dead_code)]
#[derive(Clone)]
pub struct MockFactomd {
    pub url: String,
    pub height: Arc<AtomicU32>,
    pub calls: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct MockState {
    height: Arc<AtomicU32>,
    calls: Arc<AtomicUsize>,
}

async fn handle(State(state): State<MockState>, Json(req): Json<Value>) -> Json<Value> {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let height = state.height.load(Ordering::SeqCst);
    Json(json!({
        "jsonrpc": "2.0",
        "id": req["id"].clone(),
        "result": {
            "directoryblockheight": height,
            "leaderheight": height,
            "entryblockheight": height,
            "entryheight": height
        }
    }))
}

/// Start a mock factomd on an ephemeral port.
pub async fn start_mock_factomd(height: u32) -> MockFactomd {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = MockState {
        height: Arc::new(AtomicU32::new(height)),
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let app = Router::new().route("/v2", post(handle)).with_state(state.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockFactomd {
        url: format!("http://{}/v2", addr),
        height: state.height,
        calls: state.calls,
    }
}

/// Write a `pegnetd-conf.toml` whose `[app]` table holds `entries`, with the
/// database placed inside `dir`.
#[allow(dead_code)]
pub fn write_config(dir: &Path, entries: &[(&str, &str)]) {
    let db = dir.join("db").join("sql.db");
    let mut contents = format!("[app]\nsqlitedbpath = {:?}\n", db.to_string_lossy());
    for (key, value) in entries {
        contents.push_str(&format!("{} = {:?}\n", key, value));
    }
    fs::write(dir.join("pegnetd-conf.toml"), contents).unwrap();
}

/// Poll `check` until it holds or `timeout` passes.
pub async fn wait_for<F: Fn() -> bool>(check: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

pub type Signal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// An interrupt source delivering one signal per `notify_one`.
#[allow(dead_code)]
pub fn manual_interrupts() -> (Arc<Notify>, impl FnMut() -> Signal + Send + 'static) {
    let signals = Arc::new(Notify::new());
    let source = signals.clone();
    let next = move || -> Signal {
        let source = source.clone();
        Box::pin(async move { source.notified().await })
    };
    (signals, next)
}

/// A terminator that counts its calls instead of exiting.
#[allow(dead_code)]
pub fn counting_terminator() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    (count, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}
