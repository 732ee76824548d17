//! Error types for the health server

use std::time::Duration;
use thiserror::Error;

use crate::server::LifecycleState;

/// Invalid server configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("write timeout must be greater than zero")]
    ZeroWriteTimeout,
}

/// Fatal server errors
///
/// Every variant terminates the process; the binary maps them to a
/// non-zero exit code and skips the exit log line.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("HTTP server bind on port {port} failed: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to register interrupt handler: {0}")]
    Signal(#[source] std::io::Error),

    #[error("HTTP server accept loop failed: {0}")]
    Accept(#[source] std::io::Error),

    #[error("Server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Shutdown task ended without signalling completion")]
    CompletionLost,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Non-fatal failure of the drain step during shutdown
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShutdownError {
    #[error("in-flight connections still open after {0:?}")]
    DeadlineExceeded(Duration),

    #[error("accept loop exited before draining finished")]
    AcceptLoopGone,
}

/// Rejected lifecycle transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },
}
