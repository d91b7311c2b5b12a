//! Accepted connections.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Carry the socket from the acceptor to exactly one worker
//! - Close the socket exactly once, however the request ended
//!
//! # Design Decisions
//! - One request per connection; no keep-alive
//! - Closing happens on drop, so early returns and panics still close

use std::io::{self, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::http::request::{ParseError, Request};
use crate::http::response::Response;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A client socket between accept and close.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    stream: TcpStream,
    peer_addr: SocketAddr,
    accepted_at: Instant,
}

impl Connection {
    pub fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            stream,
            peer_addr,
            accepted_at: Instant::now(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Time since the acceptor took the connection.
    pub fn age(&self) -> Duration {
        self.accepted_at.elapsed()
    }

    /// Apply optional socket timeouts. `None` leaves reads/writes blocking.
    pub fn set_timeouts(&self, read: Option<Duration>, write: Option<Duration>) -> io::Result<()> {
        self.stream.set_read_timeout(read)?;
        self.stream.set_write_timeout(write)
    }

    /// Parse one request from the socket.
    pub fn read_request(&self) -> Result<Request, ParseError> {
        let mut reader = BufReader::new(&self.stream);
        Request::parse(&mut reader)
    }

    /// Serialize `response` onto the socket.
    pub fn write_response(&self, response: &Response) -> io::Result<()> {
        let mut out = io::BufWriter::new(&self.stream);
        response.write_to(&mut out)?;
        out.flush()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // The peer may already be gone; nothing useful to do with the error.
        let _ = self.stream.shutdown(Shutdown::Both);
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}
