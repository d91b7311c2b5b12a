//! Fixed pool of persistent worker threads.
//!
//! # Responsibilities
//! - Spawn `worker_count` named threads at startup
//! - Each worker: claim a connection → parse → dispatch → respond → close
//! - Contain every per-connection failure inside the worker that hit it
//!
//! # Design Decisions
//! - Workers never exit; there is no shutdown path
//! - Handler panics are caught and treated like handler errors
//! - A parse failure closes the connection without writing a response
//! - Without configured timeouts a stalled client holds its worker
//!   indefinitely, shrinking effective capacity by one

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use thiserror::Error;

use crate::config::TimeoutConfig;
use crate::http::handler::{Dispatcher, HandlerError};
use crate::http::request::ParseError;
use crate::net::connection::Connection;
use crate::net::queue::AdmissionQueue;
use crate::observability::metrics;

/// Why a connection ended without a complete response cycle.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("handler error: {0}")]
    Handler(HandlerError),
    #[error("handler panicked: {0}")]
    Panic(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConnectionError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            // A socket failure surfacing through the parser is still I/O.
            ConnectionError::Parse(ParseError::Io(_)) => "io",
            ConnectionError::Parse(_) => "parse",
            ConnectionError::Handler(_) => "handler",
            ConnectionError::Panic(_) => "panic",
            ConnectionError::Io(_) => "io",
        }
    }
}

/// The running worker threads.
#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `count` workers pulling from `queue`.
    pub fn spawn(
        count: usize,
        queue: Arc<AdmissionQueue<Connection>>,
        dispatcher: Arc<dyn Dispatcher>,
        timeouts: TimeoutConfig,
    ) -> io::Result<Self> {
        let workers = (0..count)
            .map(|index| {
                let queue = Arc::clone(&queue);
                let dispatcher = Arc::clone(&dispatcher);
                let timeouts = timeouts.clone();
                thread::Builder::new()
                    .name(format!("worker-{index}"))
                    .spawn(move || worker_loop(index, &queue, &*dispatcher, &timeouts))
            })
            .collect::<io::Result<Vec<_>>>()?;

        tracing::info!(workers = count, "Worker pool started");
        Ok(Self { workers })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

fn worker_loop(
    index: usize,
    queue: &AdmissionQueue<Connection>,
    dispatcher: &dyn Dispatcher,
    timeouts: &TimeoutConfig,
) {
    loop {
        let conn = queue.pop();
        metrics::record_queue_depth(queue.len());

        let span = tracing::info_span!(
            "connection",
            connection_id = %conn.id(),
            peer_addr = %conn.peer_addr(),
            worker = index
        );
        let _entered = span.enter();

        tracing::debug!(queued_for = ?conn.age(), "Connection claimed");

        if let Err(e) = serve_connection(&conn, dispatcher, timeouts) {
            metrics::record_connection_error(e.kind());
            match &e {
                ConnectionError::Handler(_) | ConnectionError::Panic(_) => {
                    tracing::error!(error = %e, kind = e.kind(), "Request failed")
                }
                _ => tracing::warn!(error = %e, kind = e.kind(), "Read error"),
            }
        }
        // `conn` drops here: the socket is closed on every path.
    }
}

/// One full request/response cycle on `conn`.
pub fn serve_connection(
    conn: &Connection,
    dispatcher: &dyn Dispatcher,
    timeouts: &TimeoutConfig,
) -> Result<(), ConnectionError> {
    let start = Instant::now();
    conn.set_timeouts(timeouts.read(), timeouts.write())?;

    let request = conn.read_request()?;
    tracing::debug!(method = %request.method(), url = %request.url(), "Request parsed");

    let response = panic::catch_unwind(AssertUnwindSafe(|| dispatcher.dispatch(&request)))
        .map_err(|payload| ConnectionError::Panic(panic_message(payload.as_ref())))?
        .map_err(ConnectionError::Handler)?;

    conn.write_response(&response)?;

    tracing::info!(
        method = %request.method(),
        url = %request.url(),
        status = response.status(),
        elapsed = ?start.elapsed(),
        "Request served"
    );
    metrics::record_request(request.method(), response.status(), start);
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
