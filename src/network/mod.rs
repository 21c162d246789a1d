//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Bounded worker pool running one ServerSession per connection
//! - ClientSession for the outbound side of an exchange

mod client;
mod pool;
mod server;
mod session;

pub use client::{exchange, parse_key, validate_text, ClientSession};
pub use pool::WorkerPool;
pub use server::ConnectionServer;
pub use session::{ServerSession, SessionState};
