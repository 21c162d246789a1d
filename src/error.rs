//! Error types for shiftwire
//!
//! Provides a unified error type for all operations, plus a coarse
//! classification used for diagnostics.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::Validation;

/// Result type alias using ShiftError
pub type Result<T> = std::result::Result<T, ShiftError>;

/// Unified error type for shiftwire operations
#[derive(Debug, Error)]
pub enum ShiftError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Invalid address: {0}")]
    Address(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connection closed by peer after {received} of {expected} bytes")]
    Truncated { expected: usize, received: usize },

    #[error("Timed out after {timeout:?} with {received} of {expected} bytes transferred")]
    TimedOut {
        expected: usize,
        received: usize,
        timeout: Duration,
    },

    // -------------------------------------------------------------------------
    // Content Errors
    // -------------------------------------------------------------------------
    #[error("Validation error: expected {class} field, found byte 0x{byte:02x} at offset {offset}")]
    Validation {
        class: Validation,
        offset: usize,
        byte: u8,
    },

    #[error("Field too large: {declared} bytes declared (max {max})")]
    FieldTooLarge { declared: usize, max: usize },

    #[error("Protocol error: expected at least {expected} bytes, received {received}: \"{partial}\"")]
    Protocol {
        expected: usize,
        received: usize,
        partial: String,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure categories reported to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed arguments or configuration
    Input,
    /// Connection, send or receive failure, including truncation and timeout
    Transport,
    /// Received bytes outside the declared content class
    Validation,
    /// Reply shorter than the request
    Protocol,
}

impl ShiftError {
    /// Classify this error
    pub fn class(&self) -> ErrorClass {
        match self {
            ShiftError::Input(_) | ShiftError::Address(_) | ShiftError::Config(_) => {
                ErrorClass::Input
            }
            ShiftError::Io(_) | ShiftError::Truncated { .. } | ShiftError::TimedOut { .. } => {
                ErrorClass::Transport
            }
            ShiftError::Validation { .. } | ShiftError::FieldTooLarge { .. } => {
                ErrorClass::Validation
            }
            ShiftError::Protocol { .. } => ErrorClass::Protocol,
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorClass::Input => "input",
            ErrorClass::Transport => "transport",
            ErrorClass::Validation => "validation",
            ErrorClass::Protocol => "protocol",
        };
        f.write_str(name)
    }
}
