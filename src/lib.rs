//! Health-check HTTP server with interrupt-driven graceful shutdown,
//! plus a small external process launcher.

pub mod config;
pub mod error;
pub mod logging;
pub mod process;
pub mod server;
