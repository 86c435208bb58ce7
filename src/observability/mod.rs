//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! main.rs
//!     → logging::init_tracing (global subscriber, reloadable level)
//!     → logging::init_logger (threshold from app.loglevel, once)
//!
//! All subsystems produce:
//!     → tracing events (structured fields)
//!     → metrics.rs (sync heights, API calls)
//!     → Prometheus exporter on `app.metricslisten`
//! ```
//!
//! # Design Decisions
//! - The level is set once after the config file is read; no hot reload
//! - Unknown level names keep the current threshold
//! - Metrics are exported only when `app.metricslisten` is set

pub mod logging;
pub mod metrics;
