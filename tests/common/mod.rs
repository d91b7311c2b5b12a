//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use wirepool::config::ServerConfig;
use wirepool::http::{Frontend, Server};

/// Config bound to an ephemeral loopback port.
pub fn test_config(worker_count: usize, max_waiting: usize) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.pool.worker_count = worker_count;
    config.pool.max_waiting = max_waiting;
    config
}

/// Bind and start a server in the background, returning its address.
pub fn start_server(config: &ServerConfig, frontend: impl Into<Frontend>) -> SocketAddr {
    let handle = Server::bind(config, frontend)
        .expect("server binds")
        .start()
        .expect("acceptor starts");
    handle.local_addr()
}

/// Read until the server closes. A reset after data is treated as close.
pub fn read_all(stream: &mut TcpStream) -> Vec<u8> {
    let mut received = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => return received,
            Ok(n) => received.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::ConnectionReset => return received,
            Err(e) => panic!("read failed: {e}"),
        }
    }
}

/// Open a connection, send `raw`, and collect everything the server sends back.
pub fn send(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("set timeout");
    stream.write_all(raw).expect("write request");
    read_all(&mut stream)
}

/// Status code from a raw response, if it has a status line.
pub fn status_of(response: &[u8]) -> Option<u16> {
    let text = std::str::from_utf8(response).ok()?;
    text.strip_prefix("HTTP/1.1 ")?.get(..3)?.parse().ok()
}

/// Body of a raw response, without the trailing CRLF.
pub fn body_of(response: &[u8]) -> &[u8] {
    let start = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| i + 4)
        .unwrap_or(response.len());
    let body = &response[start..];
    body.strip_suffix(b"\r\n").unwrap_or(body)
}

/// A client that sends half a request and then stalls, pinning a worker.
pub fn stalled_client(addr: SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("set timeout");
    stream.write_all(b"GET / HTTP/1.1\r\nHost:").expect("write partial");
    stream
}

/// Finish a stalled request and read the response.
pub fn finish_stalled(mut stream: TcpStream) -> Vec<u8> {
    stream.write_all(b" localhost\r\n\r\n").expect("write rest");
    read_all(&mut stream)
}

pub const BUSY: &[u8] = b"HTTP/1.1 503 Server too busy!\r\n\r\n\r\n";
