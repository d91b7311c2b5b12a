//! The seam between the worker pool and request handling code.

use crate::http::request::Request;
use crate::http::response::Response;

/// Error type returned by route handlers and applications.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Turns a parsed request into a response.
///
/// Implemented by the [`Router`](crate::routing::Router) and the
/// [`AppAdapter`](crate::app::AppAdapter). Shared by every worker, so
/// implementations must be thread-safe and must not rely on mutation.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, request: &Request) -> Result<Response, HandlerError>;
}
