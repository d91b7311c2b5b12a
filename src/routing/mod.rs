//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (before the server binds):
//!     Router::builder().get(..).post(..)
//!     → build() freezes an ordered, immutable Router
//!
//! Incoming Request (method, url)
//!     → router.rs (scan routes in registration order)
//!     → matcher.rs (prefix or pattern against the raw url)
//!     → handler(RequestContext) → 200 text/html
//!     → or the fixed 404 "No route found"
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod router;

pub use matcher::{IntoMatcher, Matcher, PathPrefixMatcher, PatternMatcher};
pub use router::{HandlerResult, RequestContext, Route, Router, RouterBuilder};
