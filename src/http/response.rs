//! Response serialization.
//!
//! # Responsibilities
//! - Hold the status line, headers and body of one response
//! - Serialize to exact wire bytes
//!
//! # Design Decisions
//! - No header is computed or injected (no automatic content-length)
//! - Every line, including the body, is followed by CRLF
//! - The connection is closed after the write, so the peer reads to EOF

use std::io::{self, Write};

use crate::http::headers::Headers;

/// Reason phrase written when admission control turns a connection away.
pub const BUSY_REASON: &str = "Server too busy!";
/// Reason phrase written when no route matches.
pub const NOT_FOUND_REASON: &str = "No route found";

/// A complete HTTP response. Built once, then serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    version: String,
    status: u16,
    reason: String,
    headers: Headers,
    body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            version: "1.1".to_string(),
            status: 200,
            reason: "OK".to_string(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }
}

impl Response {
    /// A `200 OK` response with the given body and no headers.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// The fixed `503 Server too busy!` response with an empty body.
    pub fn busy() -> Self {
        Self::default().with_status(503, BUSY_REASON)
    }

    /// The fixed `404 No route found` response with an empty body.
    pub fn not_found() -> Self {
        Self::default().with_status(404, NOT_FOUND_REASON)
    }

    pub fn with_status(mut self, status: u16, reason: impl Into<String>) -> Self {
        self.status = status;
        self.reason = reason.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Write the wire form: status line, headers, blank line, body, CRLF.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "HTTP/{} {} {}\r\n", self.version, self.status, self.reason)?;
        for (name, value) in self.headers.iter() {
            write!(out, "{}: {}\r\n", name, value)?;
        }
        out.write_all(b"\r\n")?;
        out.write_all(&self.body)?;
        out.write_all(b"\r\n")?;
        out.flush()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.body.len());
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }
}

/// Canonical reason phrase for a status code, `"OK"` when unknown.
pub fn reason_phrase(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("OK")
}
