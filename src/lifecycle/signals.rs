//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (ctrl+c) on a background task
//! - Close the exit handler exactly once
//! - Force process termination afterwards
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - No drain phase by default: termination follows close immediately, as
//!   a hung subsystem must not keep the process alive
//! - `app.shutdowngrace` bounds an optional wait before termination; if the
//!   primary path finishes first the process exits normally
//! - A second SIGINT during the wait forces termination

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::lifecycle::exit::ExitHandler;

/// Background task turning an interrupt into the teardown sequence.
#[derive(Debug)]
pub struct InterruptListener {
    grace: watch::Sender<Option<Duration>>,
    task: JoinHandle<()>,
}

impl InterruptListener {
    /// Spawn the listener.
    ///
    /// `interrupt` is called for each signal to wait for. On the first one
    /// the listener closes `exit`, waits for the grace period and then calls
    /// `terminate`. Another signal during the wait terminates at once.
    pub fn spawn<S, Fut, T>(exit: Arc<ExitHandler>, mut interrupt: S, terminate: T) -> Self
    where
        S: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
        T: FnOnce() + Send + 'static,
    {
        let (grace, configured) = watch::channel(None);

        let task = tokio::spawn(async move {
            interrupt().await;
            tracing::info!("Gracefully closing");
            let cancelled = exit.close();
            tracing::debug!(cancelled, "Cancellation delivered");

            tokio::select! {
                biased;
                _ = interrupt() => tracing::warn!("Interrupted again, forcing exit"),
                _ = wait_grace(configured) => {}
            }

            tracing::info!("closing application");
            terminate();
        });

        Self { grace, task }
    }

    /// Set the wait between close and termination.
    ///
    /// An interrupt that arrives before this is called waits for it, unless
    /// the listener is dropped first, in which case there is no wait.
    pub fn set_grace(&self, grace: Duration) {
        self.grace.send_replace(Some(grace));
    }

    /// The configured grace period, zero until set.
    pub fn grace(&self) -> Duration {
        self.grace.borrow().unwrap_or_default()
    }

    /// Whether the teardown sequence has run to completion.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn wait_grace(mut configured: watch::Receiver<Option<Duration>>) {
    let grace = configured
        .wait_for(Option::is_some)
        .await
        .map(|grace| grace.unwrap_or_default())
        .unwrap_or_default();

    if !grace.is_zero() {
        tracing::info!(grace = ?grace, "Waiting for subsystems to stop");
        tokio::time::sleep(grace).await;
    }
}

/// Resolves on the next SIGINT.
///
/// If the handler cannot be installed the error is logged and the future
/// never resolves, leaving shutdown to the primary path.
pub async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install interrupt handler");
        std::future::pending::<()>().await;
    }
}

/// Terminate the process after an interrupt.
pub fn exit_process() {
    std::process::exit(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{oneshot, Notify};
    use tokio_util::sync::CancellationToken;

    type Signal = Pin<Box<dyn Future<Output = ()> + Send>>;

    /// An interrupt source delivering one signal per `notify_one`.
    fn manual_interrupts() -> (Arc<Notify>, impl FnMut() -> Signal + Send + 'static) {
        let signals = Arc::new(Notify::new());
        let source = signals.clone();
        let next = move || -> Signal {
            let source = source.clone();
            Box::pin(async move { source.notified().await })
        };
        (signals, next)
    }

    fn counting_terminator() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let terminated = Arc::new(AtomicUsize::new(0));
        let counter = terminated.clone();
        (terminated, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn test_interrupt_closes_then_terminates() {
        let exit = Arc::new(ExitHandler::new());
        let ctx = CancellationToken::new();
        let cancel = ctx.clone();
        exit.add_cancel(move || cancel.cancel());

        let (signals, interrupts) = manual_interrupts();
        let (terminated_tx, terminated_rx) = oneshot::channel();
        let observed = ctx.clone();
        let listener = InterruptListener::spawn(exit.clone(), interrupts, move || {
            let _ = terminated_tx.send(observed.is_cancelled());
        });
        listener.set_grace(Duration::ZERO);

        assert!(!ctx.is_cancelled());
        signals.notify_one();

        let cancelled_before_terminate = tokio::time::timeout(Duration::from_secs(5), terminated_rx)
            .await
            .unwrap()
            .unwrap();
        assert!(cancelled_before_terminate);
        assert!(exit.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_grace_delays_termination() {
        let exit = Arc::new(ExitHandler::new());
        let (signals, interrupts) = manual_interrupts();
        let (terminated, terminate) = counting_terminator();

        let listener = InterruptListener::spawn(exit.clone(), interrupts, terminate);
        listener.set_grace(Duration::from_secs(10));
        assert_eq!(listener.grace(), Duration::from_secs(10));
        signals.notify_one();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(exit.is_closed());
        assert_eq!(terminated.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(terminated.load(Ordering::SeqCst), 1);
        assert!(listener.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_interrupt_waits_for_grace_setting() {
        let exit = Arc::new(ExitHandler::new());
        let (signals, interrupts) = manual_interrupts();
        let (terminated, terminate) = counting_terminator();

        let listener = InterruptListener::spawn(exit.clone(), interrupts, terminate);
        signals.notify_one();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(exit.is_closed());
        assert_eq!(terminated.load(Ordering::SeqCst), 0);

        listener.set_grace(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(terminated.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(terminated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_interrupt_forces_termination() {
        let exit = Arc::new(ExitHandler::new());
        let (signals, interrupts) = manual_interrupts();
        let (terminated, terminate) = counting_terminator();

        let listener = InterruptListener::spawn(exit.clone(), interrupts, terminate);
        listener.set_grace(Duration::from_secs(60));
        signals.notify_one();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(terminated.load(Ordering::SeqCst), 0);

        signals.notify_one();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(terminated.load(Ordering::SeqCst), 1);
        assert!(listener.is_finished());
    }

    #[tokio::test]
    async fn test_dropped_listener_does_not_wait() {
        let exit = Arc::new(ExitHandler::new());
        let (signals, interrupts) = manual_interrupts();
        let (terminated_tx, terminated_rx) = oneshot::channel();

        let listener = InterruptListener::spawn(exit.clone(), interrupts, move || {
            let _ = terminated_tx.send(());
        });
        drop(listener);
        signals.notify_one();

        tokio::time::timeout(Duration::from_secs(5), terminated_rx)
            .await
            .unwrap()
            .unwrap();
        assert!(exit.is_closed());
    }
}
