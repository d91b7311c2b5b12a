//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Collect routes in registration order through [`RouterBuilder`]
//! - Find the first route whose method and matcher accept a request
//! - Run its handler and wrap the body in a `text/html` response
//!
//! # Design Decisions
//! - Immutable after `build()` (thread-safe without locks)
//! - First match wins; no specificity ranking
//! - Method comparison is case-insensitive
//! - Handler errors are returned, not converted into responses

use std::fmt;

use crate::http::form::FormData;
use crate::http::handler::{Dispatcher, HandlerError};
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::routing::matcher::{IntoMatcher, Matcher};

/// What a route handler sees of the matched request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub form_data: &'a FormData,
    pub headers: &'a Headers,
    pub body: &'a [u8],
}

impl<'a> RequestContext<'a> {
    pub fn new(request: &'a Request) -> Self {
        Self {
            method: request.method(),
            url: request.url(),
            form_data: request.form_data(),
            headers: request.headers(),
            body: request.body(),
        }
    }
}

/// Result of a route handler: the HTML body, or an error for the worker
/// to log.
pub type HandlerResult = Result<String, HandlerError>;

type BoxedHandler = Box<dyn Fn(&RequestContext<'_>) -> HandlerResult + Send + Sync>;

/// A registered route.
pub struct Route {
    matcher: Box<dyn Matcher>,
    method: String,
    handler: BoxedHandler,
}

impl Route {
    fn accepts(&self, request: &Request) -> bool {
        self.method.eq_ignore_ascii_case(request.method()) && self.matcher.matches(request.url())
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

/// Collects routes before the server starts.
#[derive(Debug, Default)]
pub struct RouterBuilder {
    routes: Vec<Route>,
}

impl RouterBuilder {
    /// Append a route for `method`.
    pub fn route<M, H>(mut self, method: &str, matcher: M, handler: H) -> Self
    where
        M: IntoMatcher,
        H: Fn(&RequestContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.routes.push(Route {
            matcher: matcher.into_matcher(),
            method: method.to_ascii_uppercase(),
            handler: Box::new(handler),
        });
        self
    }

    pub fn get<M, H>(self, matcher: M, handler: H) -> Self
    where
        M: IntoMatcher,
        H: Fn(&RequestContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.route("GET", matcher, handler)
    }

    pub fn post<M, H>(self, matcher: M, handler: H) -> Self
    where
        M: IntoMatcher,
        H: Fn(&RequestContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.route("POST", matcher, handler)
    }

    pub fn put<M, H>(self, matcher: M, handler: H) -> Self
    where
        M: IntoMatcher,
        H: Fn(&RequestContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.route("PUT", matcher, handler)
    }

    pub fn delete<M, H>(self, matcher: M, handler: H) -> Self
    where
        M: IntoMatcher,
        H: Fn(&RequestContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.route("DELETE", matcher, handler)
    }

    pub fn patch<M, H>(self, matcher: M, handler: H) -> Self
    where
        M: IntoMatcher,
        H: Fn(&RequestContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.route("PATCH", matcher, handler)
    }

    /// Freeze the route table.
    pub fn build(self) -> Router {
        Router {
            routes: self.routes,
        }
    }
}

/// Ordered, immutable route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Run the first matching route, or produce the fixed 404.
    pub fn match_request(&self, request: &Request) -> Result<Response, HandlerError> {
        let Some(route) = self.routes.iter().find(|route| route.accepts(request)) else {
            tracing::debug!(method = %request.method(), url = %request.url(), "No route matched");
            return Ok(Response::not_found());
        };

        let body = (route.handler)(&RequestContext::new(request))?;
        Ok(Response::new(body).with_header("content-type", "text/html"))
    }
}

impl Dispatcher for Router {
    fn dispatch(&self, request: &Request) -> Result<Response, HandlerError> {
        self.match_request(request)
    }
}
