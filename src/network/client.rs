//! Client Session
//!
//! One outbound exchange: send length, key and ciphertext, then collect
//! the decoded reply.

use std::net::TcpStream;
use std::time::Duration;

use crate::endpoint::{self, Endpoint};
use crate::error::{Result, ShiftError};
use crate::protocol::{self, CipherKey, FramedChannel, TimedStream, Validation, MAX_FIELD_SIZE};

/// An open connection to a server, good for a single exchange
pub struct ClientSession<S> {
    channel: FramedChannel<S>,
}

impl ClientSession<TcpStream> {
    /// Connect to `endpoint`, bounding the connect and every later
    /// operation by `timeout`
    pub fn connect(endpoint: Endpoint, timeout: Duration) -> Result<Self> {
        let stream = TcpStream::connect_timeout(&endpoint.socket_addr(), timeout)?;
        stream.set_nodelay(true)?;
        tracing::debug!("Connected to {}", endpoint);
        Ok(Self::new(FramedChannel::new(stream, timeout)))
    }
}

impl<S: TimedStream> ClientSession<S> {
    pub fn new(channel: FramedChannel<S>) -> Self {
        Self { channel }
    }

    /// Encipher `text` with `key`, send it, and return the server's reply
    ///
    /// The reply must be at least as long as `text`. Consumes the session,
    /// closing the connection.
    pub fn exchange(mut self, text: &str, key: CipherKey) -> Result<String> {
        validate_text(text)?;
        let length = u32::try_from(text.len()).map_err(|_| {
            ShiftError::Input(format!("text of {} bytes is too long", text.len()))
        })?;

        tracing::debug!("Sending message length {}", length);
        self.channel.send_numeric_field(length)?;

        tracing::debug!("Sending cipher key {}", key.value());
        self.channel.send_numeric_field(key.value())?;

        let ciphertext = protocol::encode(text.as_bytes(), key);
        tracing::debug!("Sending ciphertext {}", String::from_utf8_lossy(&ciphertext));
        self.channel.send_bytes(&ciphertext)?;

        let reply = self.channel.receive_at_least(text.len())?;
        tracing::debug!("Received {} bytes", reply.len());

        Ok(String::from_utf8_lossy(&reply).into_owned())
    }
}

/// Check that `text` can be sent: non-empty, at most `MAX_FIELD_SIZE`
/// bytes, and lowercase `a`-`z` only
pub fn validate_text(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(ShiftError::Input("text must not be empty".to_string()));
    }
    if text.len() > MAX_FIELD_SIZE {
        return Err(ShiftError::Input(format!(
            "text of {} bytes exceeds the {} byte limit",
            text.len(),
            MAX_FIELD_SIZE
        )));
    }
    Validation::Lowercase.check(text.as_bytes()).map_err(|e| {
        ShiftError::Input(format!(
            "text must be lowercase letters with no spaces ({})",
            e
        ))
    })
}

/// Parse a cipher key given as text
pub fn parse_key(text: &str) -> Result<CipherKey> {
    text.parse::<u32>()
        .map(CipherKey::new)
        .map_err(|_| {
            ShiftError::Input(format!("key \"{}\" is not a non-negative integer", text))
        })
}

/// Run one complete exchange from textual arguments
///
/// All arguments are checked before any connection is made.
pub fn exchange(
    address: &str,
    port: &str,
    text: &str,
    key: &str,
    timeout: Duration,
) -> Result<String> {
    let endpoint = endpoint::resolve(address, port)?;
    validate_text(text)?;
    let key = parse_key(key)?;

    ClientSession::connect(endpoint, timeout)?.exchange(text, key)
}
