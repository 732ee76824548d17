//! Server lifecycle state machine
//!
//! `Starting -> Serving -> ShuttingDown -> Stopped`, one step at a time.

use crate::error::LifecycleError;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Phase of the server lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    Starting = 0,
    Serving = 1,
    ShuttingDown = 2,
    Stopped = 3,
}

impl LifecycleState {
    /// The only state allowed to transition into `self`
    fn predecessor(self) -> Option<Self> {
        match self {
            Self::Starting => None,
            Self::Serving => Some(Self::Starting),
            Self::ShuttingDown => Some(Self::Serving),
            Self::Stopped => Some(Self::ShuttingDown),
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Starting,
            1 => Self::Serving,
            2 => Self::ShuttingDown,
            3 => Self::Stopped,
            // Only `advance` writes the cell, and it stores valid discriminants
            other => unreachable!("invalid lifecycle discriminant {}", other),
        }
    }
}

/// Shared lifecycle cell owned by the server and its shutdown task
#[derive(Debug, Clone)]
pub(crate) struct Lifecycle {
    state: Arc<AtomicU8>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(LifecycleState::Starting as u8)),
        }
    }

    pub(crate) fn current(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Move to `next` if the current state is its direct predecessor
    pub(crate) fn advance(&self, next: LifecycleState) -> Result<(), LifecycleError> {
        let Some(from) = next.predecessor() else {
            return Err(LifecycleError::InvalidTransition {
                from: self.current(),
                to: next,
            });
        };

        self.state
            .compare_exchange(from as u8, next as u8, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| debug!(from = ?from, to = ?next, "Lifecycle transition"))
            .map_err(|actual| LifecycleError::InvalidTransition {
                from: LifecycleState::from_u8(actual),
                to: next,
            })
    }
}
