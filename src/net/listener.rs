//! TCP listener.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections as [`Connection`]s
//!
//! # Design Decisions
//! - Blocking accept on a dedicated thread; backpressure is applied after
//!   accept by the admission queue, not by delaying accept

use std::net::{SocketAddr, TcpListener};

use thiserror::Error;

use crate::config::ListenerConfig;
use crate::net::connection::Connection;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(std::io::Error),
}

/// A bound listening socket.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to the configured host and port.
    pub fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let address = config.bind_address();
        let bind_err = |source| ListenerError::Bind {
            address: address.clone(),
            source,
        };

        let inner = TcpListener::bind(&address).map_err(bind_err)?;
        let local_addr = inner.local_addr().map_err(bind_err)?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Block until the next client connects.
    pub fn accept(&self) -> Result<Connection, ListenerError> {
        let (stream, peer_addr) = self.inner.accept().map_err(ListenerError::Accept)?;
        let conn = Connection::new(stream, peer_addr);

        tracing::debug!(
            connection_id = %conn.id(),
            peer_addr = %peer_addr,
            "Connection accepted"
        );

        Ok(conn)
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpStream;

    fn ephemeral() -> ListenerConfig {
        ListenerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            ..ListenerConfig::default()
        }
    }

    #[test]
    fn binds_ephemeral_port_and_accepts() {
        let listener = Listener::bind(&ephemeral()).unwrap();
        assert_ne!(listener.local_addr().port(), 0);

        let client = TcpStream::connect(listener.local_addr()).unwrap();
        let conn = listener.accept().unwrap();
        assert_eq!(conn.peer_addr(), client.local_addr().unwrap());
    }

    #[test]
    fn bind_conflict_is_reported() {
        let first = Listener::bind(&ephemeral()).unwrap();
        let taken = ListenerConfig {
            port: first.local_addr().port(),
            ..ephemeral()
        };
        assert!(matches!(
            Listener::bind(&taken),
            Err(ListenerError::Bind { .. })
        ));
    }
}
