//! Shutdown coordination for the health server
//!
//! - `InterruptSource`: where the shutdown request comes from (OS or synthetic)
//! - `completion_signal`: one-shot notification fired when shutdown has finished

use crate::error::{ServerError, ShutdownError};
use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use tracing::info;

/// Source of the single interrupt that starts shutdown
#[async_trait]
pub trait InterruptSource: Send {
    /// Resolve once an interrupt has arrived
    async fn interrupted(&mut self);
}

/// Process interrupt (SIGINT / Ctrl+C)
///
/// The handler is registered on construction so a registration failure
/// surfaces before the server starts serving.
pub struct OsInterrupt {
    #[cfg(unix)]
    inner: tokio::signal::unix::Signal,
    #[cfg(windows)]
    inner: tokio::signal::windows::CtrlC,
}

impl OsInterrupt {
    #[cfg(unix)]
    pub fn install() -> Result<Self, ServerError> {
        use tokio::signal::unix::{signal, SignalKind};

        let inner = signal(SignalKind::interrupt()).map_err(ServerError::Signal)?;
        Ok(Self { inner })
    }

    #[cfg(windows)]
    pub fn install() -> Result<Self, ServerError> {
        let inner = tokio::signal::windows::ctrl_c().map_err(ServerError::Signal)?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl InterruptSource for OsInterrupt {
    async fn interrupted(&mut self) {
        // A closed signal stream can never deliver again; treat it as the interrupt.
        self.inner.recv().await;
        info!("Received SIGINT");
    }
}

/// Synthetic interrupt fed by an `InterruptTrigger`
#[derive(Clone)]
pub struct ManualInterrupt {
    receiver: watch::Receiver<bool>,
}

impl ManualInterrupt {
    /// Check if the interrupt was raised (non-blocking)
    pub fn is_raised(&self) -> bool {
        *self.receiver.borrow()
    }
}

#[async_trait]
impl InterruptSource for ManualInterrupt {
    async fn interrupted(&mut self) {
        while !*self.receiver.borrow() {
            if self.receiver.changed().await.is_err() {
                // Trigger dropped, treat as interrupt
                break;
            }
        }
        info!("Received synthetic interrupt");
    }
}

/// Raises the interrupt observed by a `ManualInterrupt`
pub struct InterruptTrigger {
    sender: watch::Sender<bool>,
}

impl InterruptTrigger {
    pub fn interrupt(&self) {
        let _ = self.sender.send(true);
    }
}

/// Create a synthetic interrupt pair
pub fn interrupt_channel() -> (InterruptTrigger, ManualInterrupt) {
    let (sender, receiver) = watch::channel(false);
    (InterruptTrigger { sender }, ManualInterrupt { receiver })
}

/// Result of a completed shutdown sequence
#[derive(Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Outcome of draining in-flight connections
    pub drain: Result<(), ShutdownError>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.drain.is_ok()
    }
}

/// Sending half of the completion signal; firing consumes it
#[derive(Debug)]
pub struct CompletionNotifier {
    sender: oneshot::Sender<ShutdownReport>,
}

impl CompletionNotifier {
    pub fn fire(self, report: ShutdownReport) {
        // Receiver gone means nobody waits for us anymore
        let _ = self.sender.send(report);
    }
}

/// Receiving half of the completion signal; waiting consumes it
#[derive(Debug)]
pub struct CompletionSignal {
    receiver: oneshot::Receiver<ShutdownReport>,
}

impl CompletionSignal {
    /// Block until shutdown has completed
    ///
    /// Fails with `CompletionLost` if the notifier was dropped unfired.
    pub async fn wait(self) -> Result<ShutdownReport, ServerError> {
        self.receiver.await.map_err(|_| ServerError::CompletionLost)
    }
}

/// Create the one-shot completion pair
pub fn completion_signal() -> (CompletionNotifier, CompletionSignal) {
    let (sender, receiver) = oneshot::channel();
    (CompletionNotifier { sender }, CompletionSignal { receiver })
}
