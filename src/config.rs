//! Configuration for shiftwire
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{Result, ShiftError};

/// Main configuration for a shiftwire server or client
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen port (0 lets the OS pick one)
    pub port: u16,

    /// Operation timeout applied to every field exchanged on a connection
    /// (milliseconds)
    pub io_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Session Pool Configuration
    // -------------------------------------------------------------------------
    /// Max sessions running at once (worker threads)
    pub max_sessions: usize,

    /// Accepted connections allowed to wait for a free worker.
    /// When this queue is full the accept loop blocks.
    pub pending_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            io_timeout_ms: 15_000,
            max_sessions: 64,
            pending_sessions: 2,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The per-connection operation timeout
    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.io_timeout_ms == 0 {
            return Err(ShiftError::Config("io_timeout_ms must be positive".to_string()));
        }
        if self.max_sessions == 0 {
            return Err(ShiftError::Config("max_sessions must be positive".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the operation timeout (in milliseconds)
    pub fn io_timeout_ms(mut self, ms: u64) -> Self {
        self.config.io_timeout_ms = ms;
        self
    }

    /// Set the number of session workers
    pub fn max_sessions(mut self, count: usize) -> Self {
        self.config.max_sessions = count;
        self
    }

    /// Set the capacity of the pending session queue
    pub fn pending_sessions(mut self, count: usize) -> Self {
        self.config.pending_sessions = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
