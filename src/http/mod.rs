//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (claimed by a worker)
//!     → request.rs (request line, headers, bounded body)
//!     → form.rs (urlencoded body decoding)
//!     → handler.rs (Dispatcher: router or application adapter)
//!     → response.rs (serialize status line, headers, body)
//!     → Send to client, close
//!
//! server.rs wires listener, queue, pool and front-end together.
//! ```

pub mod form;
pub mod handler;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use form::FormData;
pub use handler::{Dispatcher, HandlerError};
pub use headers::Headers;
pub use request::{HttpVersion, ParseError, Request};
pub use response::Response;
pub use server::{Frontend, Server, ServerError, ServerHandle};
