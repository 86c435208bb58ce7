//! Pegnet daemon library: bootstrap, lifecycle and the subsystems it runs.

pub mod api;
pub mod cli;
pub mod config;
pub mod jsonrpc;
pub mod lifecycle;
pub mod node;
pub mod observability;

pub use config::Config;
pub use lifecycle::{Daemon, ExitHandler, Flags};
pub use node::Pegnetd;
