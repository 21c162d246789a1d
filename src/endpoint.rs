//! Endpoint resolution
//!
//! Turns a textual address and port into an address-family-tagged
//! endpoint. IPv4 is tried first, then IPv6.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

use crate::error::{Result, ShiftError};

/// Address family of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    V4,
    V6,
}

/// A resolved transport endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    V4 { addr: [u8; 4], port: u16 },
    V6 { addr: [u8; 16], port: u16 },
}

impl Endpoint {
    /// Address family tag
    pub fn family(&self) -> Family {
        match self {
            Endpoint::V4 { .. } => Family::V4,
            Endpoint::V6 { .. } => Family::V6,
        }
    }

    /// Raw address bytes (4 or 16 of them)
    pub fn address_bytes(&self) -> &[u8] {
        match self {
            Endpoint::V4 { addr, .. } => &addr[..],
            Endpoint::V6 { addr, .. } => &addr[..],
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            Endpoint::V4 { port, .. } | Endpoint::V6 { port, .. } => *port,
        }
    }

    /// Convert into a socket address for connecting
    pub fn socket_addr(&self) -> SocketAddr {
        match *self {
            Endpoint::V4 { addr, port } => {
                SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::from(addr), port))
            }
            Endpoint::V6 { addr, port } => {
                SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::from(addr), port, 0, 0))
            }
        }
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(v4) => Endpoint::V4 {
                addr: v4.ip().octets(),
                port: v4.port(),
            },
            SocketAddr::V6(v6) => Endpoint::V6 {
                addr: v6.ip().octets(),
                port: v6.port(),
            },
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.socket_addr().fmt(f)
    }
}

/// Resolve an address and port given as text.
///
/// Only literal addresses are accepted; no name lookup is done.
pub fn resolve(address: &str, port: &str) -> Result<Endpoint> {
    let port = parse_port(port)?;

    if let Ok(v4) = address.parse::<Ipv4Addr>() {
        return Ok(Endpoint::V4 {
            addr: v4.octets(),
            port,
        });
    }
    if let Ok(v6) = address.parse::<Ipv6Addr>() {
        return Ok(Endpoint::V6 {
            addr: v6.octets(),
            port,
        });
    }

    Err(ShiftError::Address(format!(
        "\"{}\" is neither an IPv4 nor an IPv6 address",
        address
    )))
}

fn parse_port(text: &str) -> Result<u16> {
    match text.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ShiftError::Address(format!(
            "port \"{}\" is not in [1, 65535]",
            text
        ))),
    }
}
