//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags (clap)          → store.rs bind_flag (explicit flags win)
//! pegnetd-conf.toml         → loader.rs (search paths, parse & flatten)
//! built-in defaults         → keys.rs seed_defaults
//!     → Config (layered lookup, typed getters)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Lookup precedence: explicit flag > config file > default > flag default
//! - Keys are case-insensitive, nested tables flatten to `table.key`
//! - Missing keys resolve to the zero value of the requested type
//! - Config is immutable once the daemon starts; no reload

pub mod keys;
pub mod loader;
pub mod store;
pub mod validation;
pub mod value;

pub use loader::ConfigError;
pub use store::{Config, FlagValue};
pub use value::ConfigValue;
