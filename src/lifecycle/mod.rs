//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Testing overrides → Bind flags → Seed defaults → Interrupt listener
//!     → Read config → Set log level
//!
//! Run (daemon.rs):
//!     Register root cancel → Build node → Spawn API server → Sync loop
//!
//! Shutdown (signals.rs + exit.rs):
//!     SIGINT → ExitHandler::close (cancels root context) → grace → Exit 0
//!     (a second SIGINT skips the grace)
//! ```
//!
//! # Design Decisions
//! - One root cancellation token shared by every subsystem
//! - The exit handler is owned by the daemon, not a global
//! - Close only delivers cancellation; it never waits on subsystems

pub mod daemon;
pub mod exit;
pub mod signals;
pub mod startup;

pub use daemon::{run, DaemonError, NodeFactory, PegnetdFactory};
pub use exit::ExitHandler;
pub use signals::InterruptListener;
pub use startup::{bootstrap, read_config, read_config_or_defaults, Bootstrap, Daemon, Flags};
