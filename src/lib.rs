//! # shiftwire
//!
//! A minimal request/response exchange over TCP:
//! - Length-delimited framing with partial-I/O and timeout handling
//! - Caesar-shift codec over lowercase ASCII
//! - One exchange per connection
//! - Bounded worker pool for server sessions
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────┐                     ┌──────────────────────────┐
//! │  ClientSession   │   len, key, text    │    ConnectionServer      │
//! │  (encode)        │ ──────────────────▶ │    (accept loop)         │
//! │                  │                     └────────────┬─────────────┘
//! │                  │                                  │
//! │                  │                     ┌────────────▼─────────────┐
//! │                  │     plaintext       │  WorkerPool              │
//! │                  │ ◀────────────────── │  └─ ServerSession        │
//! └──────────────────┘                     │     (decode)             │
//!          │                               └────────────┬─────────────┘
//!          └──────────────┐     ┌───────────────────────┘
//!                         ▼     ▼
//!                    ┌───────────────┐
//!                    │ FramedChannel │
//!                    └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod endpoint;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use endpoint::{resolve, Endpoint, Family};
pub use error::{ErrorClass, Result, ShiftError};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of shiftwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
