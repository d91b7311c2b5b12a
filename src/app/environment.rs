//! Request environment handed to applications.

use std::collections::BTreeMap;
use std::io::Cursor;

use crate::http::request::{HttpVersion, Request};

/// Interface revision reported to applications as `version`.
pub const INTERFACE_VERSION: (u32, u32) = (1, 3);

/// Everything an application learns about a request.
///
/// String variables follow CGI naming (`REQUEST_METHOD`, `PATH_INFO`,
/// `QUERY_STRING`, `HTTP_*`, ...) and live in [`vars`](Self::vars); the
/// protocol metadata is typed.
#[derive(Debug, Clone)]
pub struct Environment {
    vars: BTreeMap<String, String>,
    /// Request body as a readable stream.
    pub input: Cursor<Vec<u8>>,
    pub url_scheme: &'static str,
    pub version: (u32, u32),
    pub http_version: HttpVersion,
    pub multithread: bool,
    pub multiprocess: bool,
    pub run_once: bool,
}

impl Environment {
    /// Build the environment for `request` as served by `server_name:server_port`.
    pub fn from_request(request: &Request, server_name: &str, server_port: u16) -> Self {
        let (path, query) = request
            .url()
            .split_once('?')
            .unwrap_or((request.url(), ""));

        let mut vars = BTreeMap::new();
        vars.insert("REQUEST_METHOD".to_string(), request.method().to_string());
        vars.insert("SCRIPT_NAME".to_string(), String::new());
        vars.insert("PATH_INFO".to_string(), path.to_string());
        vars.insert("QUERY_STRING".to_string(), query.to_string());
        vars.insert("SERVER_NAME".to_string(), server_name.to_string());
        vars.insert("SERVER_PORT".to_string(), server_port.to_string());
        vars.insert("SERVER_PROTOCOL".to_string(), format!("HTTP/{}", request.http_version()));

        for (name, value) in request.headers().iter() {
            vars.insert(header_var(name), value.to_string());
        }

        Self {
            vars,
            input: Cursor::new(request.body().to_vec()),
            url_scheme: "http",
            version: INTERFACE_VERSION,
            http_version: request.http_version(),
            multithread: true,
            multiprocess: false,
            run_once: false,
        }
    }

    /// Look up a string variable such as `PATH_INFO` or `HTTP_HOST`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn request_method(&self) -> &str {
        self.get("REQUEST_METHOD").unwrap_or_default()
    }

    pub fn path_info(&self) -> &str {
        self.get("PATH_INFO").unwrap_or_default()
    }

    pub fn query_string(&self) -> &str {
        self.get("QUERY_STRING").unwrap_or_default()
    }

    /// All string variables in key order.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// `content-type` → `HTTP_CONTENT_TYPE`.
fn header_var(name: &str) -> String {
    format!("HTTP_{}", name.replace('-', "_").to_ascii_uppercase())
}
