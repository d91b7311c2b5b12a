//! Bridge between the worker pool and an external application.

use crate::app::environment::Environment;
use crate::http::handler::{Dispatcher, HandlerError};
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::{reason_phrase, Response};

/// What an application returns: status, headers and body chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<Vec<u8>>,
}

impl AppResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Append one body chunk.
    pub fn chunk(mut self, chunk: impl Into<Vec<u8>>) -> Self {
        self.body.push(chunk.into());
        self
    }
}

/// An application callable: environment in, status/headers/chunks out.
pub trait App: Send + Sync {
    fn call(&self, env: Environment) -> Result<AppResponse, HandlerError>;
}

impl<F> App for F
where
    F: Fn(Environment) -> Result<AppResponse, HandlerError> + Send + Sync,
{
    fn call(&self, env: Environment) -> Result<AppResponse, HandlerError> {
        self(env)
    }
}

/// Serves requests through an [`App`].
pub struct AppAdapter {
    app: Box<dyn App>,
    server_name: String,
    server_port: u16,
}

impl AppAdapter {
    pub fn new(app: Box<dyn App>, server_name: impl Into<String>, server_port: u16) -> Self {
        Self {
            app,
            server_name: server_name.into(),
            server_port,
        }
    }
}

impl Dispatcher for AppAdapter {
    fn dispatch(&self, request: &Request) -> Result<Response, HandlerError> {
        let env = Environment::from_request(request, &self.server_name, self.server_port);
        let AppResponse {
            status,
            headers,
            body,
        } = self.app.call(env)?;

        Ok(Response::new(body.concat())
            .with_status(status, reason_phrase(status))
            .with_headers(headers))
    }
}
