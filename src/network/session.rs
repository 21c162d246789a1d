//! Server Session
//!
//! Handles the single exchange carried by one accepted connection.

use bytes::Bytes;

use crate::endpoint::Endpoint;
use crate::error::{ErrorClass, Result};
use crate::protocol::{self, CipherKey, FramedChannel, TimedStream, Validation};

/// Where a session is in its one pass over the exchange
#[derive(Debug)]
pub enum SessionState {
    ReceiveLength,
    ReceiveKey { length: usize },
    ReceiveText { length: usize, key: CipherKey },
    Decode { key: CipherKey, ciphertext: Bytes },
    SendResponse { plaintext: Vec<u8> },
    Done { plaintext: Vec<u8> },
}

/// One inbound exchange
///
/// Owns its connection for its whole lifetime; the connection is closed
/// when the session is dropped, whichever way `run` ends.
pub struct ServerSession<S> {
    channel: FramedChannel<S>,

    /// Peer endpoint for logging
    peer: Endpoint,
}

impl<S: TimedStream> ServerSession<S> {
    pub fn new(channel: FramedChannel<S>, peer: Endpoint) -> Self {
        Self { channel, peer }
    }

    /// Run the exchange, logging the outcome instead of returning it
    pub fn handle(self) {
        let peer = self.peer;
        tracing::debug!("Session started for {}", peer);

        match self.run() {
            Ok(plaintext) => {
                tracing::info!(
                    "Decoded text from {}: {}",
                    peer,
                    String::from_utf8_lossy(&plaintext)
                );
            }
            Err(e) => match e.class() {
                ErrorClass::Transport => {
                    tracing::warn!("Session with {} aborted: {}", peer, e);
                }
                class => {
                    tracing::warn!("Rejected {} request from {}: {}", class, peer, e);
                }
            },
        }
    }

    /// Drive the state machine to completion, returning the plaintext sent
    pub fn run(mut self) -> Result<Vec<u8>> {
        let mut state = SessionState::ReceiveLength;
        loop {
            state = match state {
                SessionState::Done { plaintext } => return Ok(plaintext),
                other => self.step(other)?,
            };
        }
    }

    fn step(&mut self, state: SessionState) -> Result<SessionState> {
        let next = match state {
            SessionState::ReceiveLength => {
                let length = self.channel.receive_numeric_field()? as usize;
                tracing::debug!("Text length from {}: {}", self.peer, length);
                SessionState::ReceiveKey { length }
            }
            SessionState::ReceiveKey { length } => {
                let key = CipherKey::new(self.channel.receive_numeric_field()?);
                tracing::debug!("Cipher key from {}: {}", self.peer, key.value());
                SessionState::ReceiveText { length, key }
            }
            SessionState::ReceiveText { length, key } => {
                let ciphertext = self.channel.receive_exact(length, Validation::Lowercase)?;
                SessionState::Decode { key, ciphertext }
            }
            SessionState::Decode { key, ciphertext } => SessionState::SendResponse {
                plaintext: protocol::decode(&ciphertext, key),
            },
            SessionState::SendResponse { plaintext } => {
                tracing::debug!("Sending {} bytes to {}", plaintext.len(), self.peer);
                self.channel.send_bytes(&plaintext)?;
                SessionState::Done { plaintext }
            }
            done @ SessionState::Done { .. } => done,
        };
        Ok(next)
    }
}
