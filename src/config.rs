//! Command-line flags and the server configuration built from them

use crate::error::ConfigError;
use clap::Parser;
use std::time::Duration;

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default per-request write timeout
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(4);

/// Health-check HTTP server with graceful shutdown on interrupt
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// http server port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Cli {
    pub fn into_config(self) -> ServerConfig {
        ServerConfig::new(self.port)
    }
}

/// Immutable server settings, built once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    port: u16,
    write_timeout: Duration,
}

impl ServerConfig {
    /// Configuration for `port` with the default write timeout
    pub fn new(port: u16) -> Self {
        Self {
            port,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Replace the write timeout; zero is rejected.
    pub fn with_write_timeout(self, write_timeout: Duration) -> Result<Self, ConfigError> {
        if write_timeout.is_zero() {
            return Err(ConfigError::ZeroWriteTimeout);
        }
        Ok(Self {
            write_timeout,
            ..self
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
