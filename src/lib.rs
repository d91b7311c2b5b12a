//! Minimal HTTP/1.1 server with a fixed worker pool and bounded admission.

pub mod app;
pub mod config;
pub mod http;
pub mod net;
pub mod observability;
pub mod routing;

pub use app::{App, AppResponse, Environment};
pub use config::ServerConfig;
pub use http::{Frontend, Request, Response, Server, ServerHandle};
pub use routing::{RequestContext, Router};
