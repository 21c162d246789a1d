//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Exchange Format
//!
//! One exchange per TCP connection. Integers are 4 bytes, big-endian.
//!
//! ### Request (client → server)
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (4)  │ Key (4)  │   Ciphertext (Len bytes)    │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Response (server → client)
//! ```text
//! ┌─────────────────────────────┐
//! │   Plaintext (Len bytes)     │
//! └─────────────────────────────┘
//! ```
//!
//! Ciphertext must be lowercase `a`-`z`; the server closes the connection
//! after the response.

mod cipher;
mod framing;

pub use cipher::{decode, encode, CipherKey};
pub use framing::{FramedChannel, TimedStream, Validation, MAX_FIELD_SIZE, NUMERIC_FIELD_SIZE};
