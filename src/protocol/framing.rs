//! Framed channel
//!
//! Timeout-bounded send/receive of fixed-size numeric fields and
//! length-specified byte strings over a connected stream.
//!
//! Every field gets a single deadline, computed when the call starts.
//! Partial reads and writes are retried until the field is complete, the
//! peer closes, or the deadline passes. Content validation only runs once
//! the whole field has arrived, so a truncated field is always reported as
//! a transport failure and never as a validation failure.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, ShiftError};

/// Size of a numeric field on the wire
pub const NUMERIC_FIELD_SIZE: usize = 4;

/// Largest byte-string field accepted (16 MB)
pub const MAX_FIELD_SIZE: usize = 16 * 1024 * 1024;

/// Read chunk size used when the reply length is open-ended
const READ_CHUNK: usize = 4096;

// =============================================================================
// Stream abstraction
// =============================================================================

/// A byte stream whose blocking reads and writes can be bounded in time
pub trait TimedStream: Read + Write {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}

impl TimedStream for TcpStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, timeout)
    }
}

// =============================================================================
// Content validation
// =============================================================================

/// Content class a received field must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Any byte accepted
    None,
    /// ASCII digits `0`-`9` only
    Numeric,
    /// ASCII lowercase `a`-`z` only
    Lowercase,
}

impl Validation {
    /// Check every byte of a complete field
    pub fn check(&self, field: &[u8]) -> Result<()> {
        let accepts: fn(&u8) -> bool = match self {
            Validation::None => return Ok(()),
            Validation::Numeric => u8::is_ascii_digit,
            Validation::Lowercase => u8::is_ascii_lowercase,
        };

        match field.iter().position(|b| !accepts(b)) {
            Some(offset) => Err(ShiftError::Validation {
                class: *self,
                offset,
                byte: field[offset],
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Validation::None => "unvalidated",
            Validation::Numeric => "numeric",
            Validation::Lowercase => "lowercase",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Channel
// =============================================================================

/// A connected stream plus the operation timeout used for every field on it
///
/// The channel owns the stream; dropping it closes the connection.
pub struct FramedChannel<S> {
    stream: S,
    timeout: Duration,
}

impl<S: TimedStream> FramedChannel<S> {
    pub fn new(stream: S, timeout: Duration) -> Self {
        Self { stream, timeout }
    }

    /// The per-field timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Send a 4-byte big-endian integer
    pub fn send_numeric_field(&mut self, value: u32) -> Result<()> {
        let mut field = BytesMut::with_capacity(NUMERIC_FIELD_SIZE);
        field.put_u32(value);
        self.send_bytes(&field)
    }

    /// Send `data` in full, looping over partial writes
    pub fn send_bytes(&mut self, data: &[u8]) -> Result<()> {
        let deadline = Instant::now().checked_add(self.timeout);
        let mut sent = 0;

        while sent < data.len() {
            let remaining = time_left(deadline).ok_or(ShiftError::TimedOut {
                expected: data.len(),
                received: sent,
                timeout: self.timeout,
            })?;
            self.stream.set_write_timeout(remaining)?;

            match self.stream.write(&data[sent..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        format!("stream accepted {} of {} bytes", sent, data.len()),
                    )
                    .into())
                }
                Ok(n) => sent += n,
                Err(e) if is_retryable(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        self.stream.flush()?;
        tracing::trace!("Sent {} bytes", sent);
        Ok(())
    }

    /// Receive exactly `len` bytes, then apply `validation`
    pub fn receive_exact(&mut self, len: usize, validation: Validation) -> Result<Bytes> {
        if len > MAX_FIELD_SIZE {
            return Err(ShiftError::FieldTooLarge {
                declared: len,
                max: MAX_FIELD_SIZE,
            });
        }

        let deadline = Instant::now().checked_add(self.timeout);
        let mut field = BytesMut::zeroed(len);
        let mut received = 0;

        while received < len {
            let remaining = time_left(deadline).ok_or(ShiftError::TimedOut {
                expected: len,
                received,
                timeout: self.timeout,
            })?;
            self.stream.set_read_timeout(remaining)?;

            match self.stream.read(&mut field[received..]) {
                Ok(0) => {
                    return Err(ShiftError::Truncated {
                        expected: len,
                        received,
                    })
                }
                Ok(n) => received += n,
                Err(e) if is_retryable(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        validation.check(&field)?;
        tracing::trace!("Received {} byte {} field", len, validation);
        Ok(field.freeze())
    }

    /// Receive a 4-byte big-endian integer
    ///
    /// The field is binary, so no content class is enforced on it.
    pub fn receive_numeric_field(&mut self) -> Result<u32> {
        let mut field = self.receive_exact(NUMERIC_FIELD_SIZE, Validation::None)?;
        Ok(field.get_u32())
    }

    /// Receive until the peer closes, requiring at least `min` bytes
    ///
    /// Once `min` bytes are in hand the deadline ends the read without an
    /// error. A peer that closes early yields `ShiftError::Protocol`
    /// carrying what did arrive; one that stalls yields `TimedOut`.
    pub fn receive_at_least(&mut self, min: usize) -> Result<Bytes> {
        let deadline = Instant::now().checked_add(self.timeout);
        let mut reply = BytesMut::with_capacity(min.min(MAX_FIELD_SIZE));
        let mut chunk = [0u8; READ_CHUNK];
        let mut closed = false;

        while reply.len() < MAX_FIELD_SIZE {
            let remaining = match time_left(deadline) {
                Some(remaining) => remaining,
                None => break,
            };
            self.stream.set_read_timeout(remaining)?;

            let room = READ_CHUNK.min(MAX_FIELD_SIZE - reply.len());
            match self.stream.read(&mut chunk[..room]) {
                Ok(0) => {
                    closed = true;
                    break;
                }
                Ok(n) => reply.extend_from_slice(&chunk[..n]),
                Err(e) if is_retryable(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if reply.len() < min {
            if !closed {
                return Err(ShiftError::TimedOut {
                    expected: min,
                    received: reply.len(),
                    timeout: self.timeout,
                });
            }
            return Err(ShiftError::Protocol {
                expected: min,
                received: reply.len(),
                partial: String::from_utf8_lossy(&reply).into_owned(),
            });
        }

        tracing::trace!("Received {} byte reply", reply.len());
        Ok(reply.freeze())
    }
}

/// Socket timeout for the next blocking call, or `None` once `deadline`
/// has passed. A timeout too large to form a deadline leaves calls unbounded.
fn time_left(deadline: Option<Instant>) -> Option<Option<Duration>> {
    match deadline {
        None => Some(None),
        Some(deadline) => deadline
            .checked_duration_since(Instant::now())
            .filter(|d| !d.is_zero())
            .map(Some),
    }
}

/// Interrupted calls and socket timeouts go back to the deadline check.
/// Timeouts surface as WouldBlock on Unix and TimedOut on Windows.
fn is_retryable(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
