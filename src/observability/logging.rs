//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber
//! - Map the configured severity name onto the process-wide threshold
//!
//! # Design Decisions
//! - The threshold is a reloadable `LevelFilter` so it can be set after the
//!   config file has been read, while the subscriber is installed first thing
//! - `RUST_LOG`, when present, can narrow output further per target
//! - `fatal` has no tracing equivalent and filters like `error`

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt as tracing_fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{keys, Config};

/// Severity names accepted in `app.loglevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Case-insensitive lookup of a level name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name.trim()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// The tracing filter enforcing this threshold.
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Fatal => LevelFilter::ERROR,
        }
    }

    fn from_u8(raw: u8) -> Self {
        Self::ALL
            .into_iter()
            .find(|level| *level as u8 == raw)
            .unwrap_or(LogLevel::Info)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle on the process-wide logging threshold.
///
/// Clones share the same threshold. A detached threshold tracks the level
/// without driving a subscriber, which keeps tests hermetic.
#[derive(Clone)]
pub struct LogThreshold {
    level: Arc<AtomicU8>,
    reload: Option<reload::Handle<LevelFilter, Registry>>,
}

impl LogThreshold {
    /// A threshold not attached to any subscriber.
    pub fn detached(level: LogLevel) -> Self {
        Self {
            level: Arc::new(AtomicU8::new(level as u8)),
            reload: None,
        }
    }

    /// Current threshold.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Acquire))
    }

    /// Replace the threshold.
    pub fn set(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Release);
        if let Some(handle) = &self.reload {
            if let Err(e) = handle.modify(|filter| *filter = level.filter()) {
                eprintln!("failed to update log level: {}", e);
            }
        }
    }
}

impl fmt::Debug for LogThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogThreshold")
            .field("level", &self.level())
            .field("attached", &self.reload.is_some())
            .finish()
    }
}

/// Install the global subscriber at `info` and return its threshold.
///
/// Must be called once, before anything logs.
pub fn init_tracing() -> LogThreshold {
    let (level_filter, reload_handle) = reload::Layer::new(LogLevel::Info.filter());

    tracing_subscriber::registry()
        .with(level_filter)
        .with(EnvFilter::try_from_default_env().ok())
        .with(tracing_fmt::layer())
        .init();

    LogThreshold {
        level: Arc::new(AtomicU8::new(LogLevel::Info as u8)),
        reload: Some(reload_handle),
    }
}

/// Apply `app.loglevel` to the threshold.
///
/// Unknown names leave the threshold untouched and are not reported.
/// Returns the level applied, if any.
pub fn init_logger(config: &Config, threshold: &LogThreshold) -> Option<LogLevel> {
    let level = LogLevel::from_name(&config.get_string(keys::LOGGING_LEVEL))?;
    threshold.set(level);
    Some(level)
}
