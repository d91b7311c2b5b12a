//! Application adapter subsystem.
//!
//! # Data Flow
//! ```text
//! Request
//!     → environment.rs (CGI-style environment: method, path, query,
//!                       server name/port, HTTP_* headers, body stream)
//!     → App::call (external application)
//!     → AppResponse (status, headers, body chunks)
//!     → adapter.rs (concatenate chunks into a Response)
//! ```
//!
//! # Design Decisions
//! - Applications are plain trait objects; closures implement the trait
//! - The environment owns a copy of the body so applications can read it
//!   as a stream without touching the socket

pub mod adapter;
pub mod environment;

pub use adapter::{App, AppAdapter, AppResponse};
pub use environment::Environment;
