//! HTTP health server with graceful shutdown
//!
//! Serves `/helthz` until an interrupt arrives, then stops accepting,
//! drains in-flight requests within the write timeout and reports completion.

mod graceful;
mod health;
mod lifecycle;
pub mod shutdown;

pub use graceful::{start, BoundServer, GracefulServer};
pub use health::{build_router, HEALTH_PATH};
pub use lifecycle::LifecycleState;
pub use shutdown::{
    completion_signal, interrupt_channel, CompletionNotifier, CompletionSignal, InterruptSource,
    InterruptTrigger, ManualInterrupt, OsInterrupt, ShutdownReport,
};

#[cfg(test)]
#[path = "health_test.rs"]
mod health_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_tests;

#[cfg(test)]
#[path = "graceful_test.rs"]
mod graceful_tests;
