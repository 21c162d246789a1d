//! TCP Server
//!
//! Accepts connections and dispatches each to a pooled ServerSession.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener};

use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::protocol::FramedChannel;

use super::pool::WorkerPool;
use super::session::ServerSession;

/// TCP server accepting one exchange per connection
pub struct ConnectionServer {
    config: Config,
    listener: TcpListener,
    pool: WorkerPool,
}

impl ConnectionServer {
    /// Bind to `config.port` on the wildcard address
    ///
    /// Tries the IPv6 wildcard first (dual-stack where the host allows it)
    /// and falls back to IPv4 when IPv6 is unavailable.
    pub fn bind(config: Config) -> Result<Self> {
        let v6 = SocketAddr::from((Ipv6Addr::UNSPECIFIED, config.port));
        match TcpListener::bind(v6) {
            Ok(listener) => Self::with_listener(config, listener),
            Err(e) => {
                tracing::debug!("IPv6 bind on {} failed ({}), falling back to IPv4", v6, e);
                let v4 = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
                Self::bind_to(config, v4)
            }
        }
    }

    /// Bind to an explicit address, ignoring `config.port`
    pub fn bind_to(config: Config, addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Self::with_listener(config, listener)
    }

    fn with_listener(config: Config, listener: TcpListener) -> Result<Self> {
        config.validate()?;
        let pool = WorkerPool::new(config.max_sessions, config.pending_sessions)?;

        tracing::info!(
            "Listening on {} ({} session workers, {} pending)",
            listener.local_addr()?,
            pool.size(),
            config.pending_sessions
        );

        Ok(Self {
            config,
            listener,
            pool,
        })
    }

    /// The bound address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever
    ///
    /// Only returns on an accept or dispatch failure, which is fatal to the
    /// server. Failed sessions never end the loop.
    pub fn run(&self) -> Result<()> {
        let timeout = self.config.io_timeout();

        loop {
            let (stream, addr) = self.listener.accept()?;
            let peer = Endpoint::from(addr);
            tracing::info!("Accepted connection from {}", peer);

            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!("Could not disable Nagle for {}: {}", peer, e);
            }

            let session = ServerSession::new(FramedChannel::new(stream, timeout), peer);
            self.pool.execute(move || session.handle())?;
        }
    }
}
