//! Exit handler: one-shot broadcast of cancellation.
//!
//! Anything holding a piece of the root context registers its cancel
//! function here; the interrupt listener closes the handler once.

use std::sync::{Mutex, MutexGuard, PoisonError};

type CancelFn = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct Registry {
    cancels: Vec<CancelFn>,
    closed: bool,
}

/// Registry of cancellation callbacks run at most once, on close.
///
/// Callbacks only deliver the cancellation; `close` does not wait for the
/// cancelled subsystems to finish.
#[derive(Default)]
pub struct ExitHandler {
    registry: Mutex<Registry>,
}

impl ExitHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cancellation callback.
    ///
    /// Once the handler is closed, the callback runs immediately on the
    /// caller instead of being queued, so a late registrant still observes
    /// the shutdown.
    pub fn add_cancel<F>(&self, cancel: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut registry = self.lock();
        if registry.closed {
            drop(registry);
            tracing::debug!("Exit handler already closed, cancelling immediately");
            cancel();
            return;
        }
        registry.cancels.push(Box::new(cancel));
    }

    /// Run every registered callback, in registration order.
    ///
    /// Only the first call does anything; it returns the number of callbacks
    /// run. Callbacks run outside the registry lock and may register more
    /// callbacks, which then run immediately.
    pub fn close(&self) -> usize {
        let cancels = {
            let mut registry = self.lock();
            if registry.closed {
                return 0;
            }
            registry.closed = true;
            std::mem::take(&mut registry.cancels)
        };

        let count = cancels.len();
        for cancel in cancels {
            cancel();
        }
        tracing::debug!(callbacks = count, "Exit handler closed");
        count
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of callbacks waiting for close.
    pub fn pending(&self) -> usize {
        self.lock().cancels.len()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ExitHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.lock();
        f.debug_struct("ExitHandler")
            .field("pending", &registry.cancels.len())
            .field("closed", &registry.closed)
            .finish()
    }
}
