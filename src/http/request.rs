//! Request parsing.
//!
//! # Responsibilities
//! - Read the request line and extract method, URL and HTTP version
//! - Read the header block up to the first blank line
//! - Read a content-length-bounded body for form and octet-stream uploads
//! - Decode urlencoded form bodies
//!
//! # Design Decisions
//! - Header names are lowercased; values trimmed; last occurrence wins
//! - Only the two body-bearing content types consume bytes past the headers
//! - No header folding, chunked bodies or keep-alive
//! - A body-bearing content type without `content-length` is an error

use std::io::{self, BufRead, Read};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::http::form::FormData;
use crate::http::headers::Headers;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Errors produced while reading a request off the wire.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The peer closed the connection before sending anything.
    #[error("connection closed before a request line was received")]
    Empty,
    /// The request line could not be split into method, URL and version.
    #[error("can't parse request line: {0:?}")]
    MalformedRequestLine(String),
    /// A header line without a `:` separator.
    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),
    /// The stream ended inside the header block.
    #[error("connection closed inside the header block")]
    UnexpectedEof,
    /// A body-bearing content type arrived without a length.
    #[error("need content-length for {content_type} data")]
    MissingContentLength { content_type: String },
    #[error("invalid content-length: {0:?}")]
    InvalidContentLength(String),
    /// The stream ended before the declared body length was read.
    #[error("body truncated: expected {expected} bytes, received {received}")]
    IncompleteBody { expected: u64, received: u64 },
    #[error("I/O error while reading request: {0}")]
    Io(#[from] io::Error),
}

/// HTTP protocol version from the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HttpVersion {
    pub major: u32,
    pub minor: u32,
}

impl std::fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A parsed HTTP request. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    url: String,
    http_version: HttpVersion,
    headers: Headers,
    body: Vec<u8>,
    form_data: FormData,
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"HTTP/([0-9]+)\.([0-9]+)").expect("version pattern is valid"))
}

impl Request {
    /// Read one request from `reader`.
    ///
    /// Bytes after the header block are only consumed when the content type
    /// requires a body; anything else is left unread.
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Self, ParseError> {
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Err(ParseError::Empty);
        }
        let (method, url, http_version) = parse_request_line(&line)?;

        let headers = read_headers(reader)?;

        let content_type = headers.get("content-type");
        let mut body = Vec::new();
        let mut form_data = FormData::default();

        if let Some(ct) = content_type.filter(|ct| *ct == FORM_URLENCODED || *ct == OCTET_STREAM) {
            let declared = headers
                .get("content-length")
                .ok_or_else(|| ParseError::MissingContentLength {
                    content_type: ct.to_string(),
                })?;
            let expected = declared
                .parse::<u64>()
                .map_err(|_| ParseError::InvalidContentLength(declared.to_string()))?;

            reader.by_ref().take(expected).read_to_end(&mut body)?;
            let received = body.len() as u64;
            if received != expected {
                return Err(ParseError::IncompleteBody { expected, received });
            }

            if ct == FORM_URLENCODED {
                form_data = FormData::parse(&body);
            }
        }

        Ok(Self {
            method,
            url,
            http_version,
            headers,
            body,
            form_data,
        })
    }

    /// Parse a request held entirely in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut reader = bytes;
        Self::parse(&mut reader)
    }

    /// Request method, as received.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Raw request target, query string included.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn http_version(&self) -> HttpVersion {
        self.http_version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Body bytes; empty unless the content type carried a body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decoded form fields; empty unless the body was urlencoded.
    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Split into at most three whitespace-separated fields and find a
/// `HTTP/<digits>.<digits>` token in the last one.
fn parse_request_line(raw: &[u8]) -> Result<(String, String, HttpVersion), ParseError> {
    let line = String::from_utf8_lossy(trim_line_ending(raw)).into_owned();
    let malformed = || ParseError::MalformedRequestLine(line.clone());

    let mut fields = line.splitn(3, char::is_whitespace);
    let method = fields.next().filter(|m| !m.is_empty()).ok_or_else(malformed)?;
    let url = fields.next().ok_or_else(malformed)?;
    let rest = fields.next().ok_or_else(malformed)?;

    let caps = version_pattern().captures(rest).ok_or_else(malformed)?;
    let major = caps[1].parse().map_err(|_| malformed())?;
    let minor = caps[2].parse().map_err(|_| malformed())?;

    Ok((
        method.to_string(),
        url.to_string(),
        HttpVersion { major, minor },
    ))
}

fn read_headers<R: BufRead>(reader: &mut R) -> Result<Headers, ParseError> {
    let mut headers = Headers::new();
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            return Err(ParseError::UnexpectedEof);
        }
        let line = String::from_utf8_lossy(trim_line_ending(&raw));
        if line.trim().is_empty() {
            return Ok(headers);
        }
        let (field, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedHeader(line.to_string()))?;
        headers.insert(field.trim().to_lowercase(), value.trim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line_and_headers() {
        let req = Request::from_bytes(
            b"GET /search?q=rust HTTP/1.1\r\nHost: localhost:4321\r\nUser-Agent:  curl/8.0 \r\n\r\n",
        )
        .unwrap();

        assert_eq!(req.method(), "GET");
        assert_eq!(req.url(), "/search?q=rust");
        assert_eq!(req.http_version(), HttpVersion { major: 1, minor: 1 });
        assert_eq!(req.headers().get("host"), Some("localhost:4321"));
        assert_eq!(req.headers().get("user-agent"), Some("curl/8.0"));
        assert!(req.body().is_empty());
        assert!(req.form_data().is_empty());
    }

    #[test]
    fn recovers_arbitrary_version_numbers() {
        for (line, major, minor) in [
            ("GET / HTTP/1.0\n\n", 1, 0),
            ("PUT /x HTTP/2.0\r\n\r\n", 2, 0),
            ("DELETE /y/z HTTP/10.42\r\n\r\n", 10, 42),
        ] {
            let req = Request::from_bytes(line.as_bytes()).unwrap();
            assert_eq!(req.http_version(), HttpVersion { major, minor });
        }
    }

    #[test]
    fn missing_version_is_rejected() {
        let inputs: [&[u8]; 5] = [
            b"GET /\r\n\r\n",
            b"GET / HTTP/1\r\n\r\n",
            b"GET / FTP/1.1\r\n\r\n",
            b"garbage\r\n\r\n",
            b"\r\n\r\n",
        ];
        for input in inputs {
            let err = Request::from_bytes(input).unwrap_err();
            assert!(matches!(err, ParseError::MalformedRequestLine(_)), "{err:?}");
        }
    }

    #[test]
    fn empty_stream_is_reported() {
        assert!(matches!(Request::from_bytes(b""), Err(ParseError::Empty)));
    }

    #[test]
    fn truncated_header_block_fails() {
        let err = Request::from_bytes(b"GET / HTTP/1.1\r\nHost:").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof));
    }

    #[test]
    fn header_without_colon_fails() {
        let err = Request::from_bytes(b"GET / HTTP/1.1\r\nnot a header\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader(_)));
    }

    #[test]
    fn header_names_lowercased_and_last_wins() {
        let req = Request::from_bytes(
            b"GET / HTTP/1.1\r\nX-Thing: one\r\nx-thing: two\r\nRef: a:b:c\r\n\r\n",
        )
        .unwrap();
        assert_eq!(req.headers().get("x-thing"), Some("two"));
        assert_eq!(req.headers().len(), 2);
        assert_eq!(req.headers().get("ref"), Some("a:b:c"));
        let names: Vec<_> = req.headers().iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["x-thing", "ref"]);
    }

    #[test]
    fn bare_newlines_are_accepted() {
        let req = Request::from_bytes(b"GET /a HTTP/1.1\nHost: h\n\n").unwrap();
        assert_eq!(req.headers().get("host"), Some("h"));
    }

    #[test]
    fn urlencoded_body_is_decoded() {
        let req = Request::from_bytes(
            b"POST / HTTP/1.1\r\ncontent-type: application/x-www-form-urlencoded\r\ncontent-length: 23\r\n\r\nwho=Ann+Arbor&city=Ypsi",
        )
        .unwrap();
        assert_eq!(req.body(), b"who=Ann+Arbor&city=Ypsi");
        assert_eq!(req.form_data().get("who").as_deref(), Some("Ann Arbor"));
        assert_eq!(req.form_data().get("city").as_deref(), Some("Ypsi"));
    }

    #[test]
    fn body_reads_exactly_content_length() {
        let input = b"POST / HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 5\r\n\r\na=1&bEXTRA";
        let mut reader = &input[..];
        let req = Request::parse(&mut reader).unwrap();
        assert_eq!(req.body(), b"a=1&b");
        assert_eq!(reader, b"EXTRA");
    }

    #[test]
    fn form_without_length_fails() {
        let err = Request::from_bytes(
            b"POST / HTTP/1.1\r\ncontent-type: application/x-www-form-urlencoded\r\n\r\nwho=Dave",
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::MissingContentLength { .. }));
    }

    #[test]
    fn octet_stream_without_length_fails() {
        let err = Request::from_bytes(
            b"PUT /blob HTTP/1.1\r\ncontent-type: application/octet-stream\r\n\r\n",
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::MissingContentLength { .. }));
    }

    #[test]
    fn octet_stream_body_kept_raw() {
        let req = Request::from_bytes(
            b"PUT /blob HTTP/1.1\r\ncontent-type: application/octet-stream\r\ncontent-length: 4\r\n\r\n\x00\xff+%",
        )
        .unwrap();
        assert_eq!(req.body(), b"\x00\xff+%");
        assert!(req.form_data().is_empty());
    }

    #[test]
    fn short_body_fails() {
        let err = Request::from_bytes(
            b"POST / HTTP/1.1\r\ncontent-type: application/x-www-form-urlencoded\r\ncontent-length: 24\r\n\r\nwho=Ann+Arbor&city=Ypsi",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::IncompleteBody { expected: 24, received: 23 }
        ));
    }

    #[test]
    fn bad_content_length_fails() {
        let err = Request::from_bytes(
            b"POST / HTTP/1.1\r\ncontent-type: application/octet-stream\r\ncontent-length: lots\r\n\r\n",
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidContentLength(_)));
    }

    #[test]
    fn other_content_types_leave_body_unread() {
        let input = b"POST /api HTTP/1.1\r\ncontent-type: application/json\r\ncontent-length: 2\r\n\r\n{}";
        let mut reader = &input[..];
        let req = Request::parse(&mut reader).unwrap();
        assert!(req.body().is_empty());
        assert_eq!(reader, b"{}");
    }

    #[test]
    fn content_type_match_is_exact() {
        let req = Request::from_bytes(
            b"POST / HTTP/1.1\r\ncontent-type: application/x-www-form-urlencoded; charset=utf-8\r\n\r\n",
        )
        .unwrap();
        assert!(req.body().is_empty());
    }
}
