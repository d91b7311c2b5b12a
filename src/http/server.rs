//! HTTP server setup and the accept loop.
//!
//! # Responsibilities
//! - Bind the listener and start the worker pool
//! - Pick the dispatch front-end (router or application adapter)
//! - Accept connections and admit them into the bounded queue
//! - Turn connections away with a fixed 503 when the queue is full
//!
//! # Design Decisions
//! - Workers are running before the first accept
//! - Admission is a single `try_admit` call: check and enqueue cannot race
//! - Rejected connections are answered by the acceptor itself and never
//!   reach the parser
//! - The front-end is fixed at bind time; routes cannot change while serving

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

use crate::app::{App, AppAdapter};
use crate::config::ServerConfig;
use crate::http::handler::Dispatcher;
use crate::http::response::Response;
use crate::net::{Admission, AdmissionQueue, Connection, Listener, ListenerError, WorkerPool};
use crate::observability::metrics;
use crate::routing::Router;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// What handles parsed requests.
pub enum Frontend {
    /// Ordered route table.
    Router(Router),
    /// External application behind the environment adapter.
    App(Box<dyn App>),
}

impl Frontend {
    pub fn app<A: App + 'static>(app: A) -> Self {
        Frontend::App(Box::new(app))
    }
}

impl From<Router> for Frontend {
    fn from(router: Router) -> Self {
        Frontend::Router(router)
    }
}

/// A bound server with its worker pool already running.
pub struct Server {
    listener: Listener,
    queue: Arc<AdmissionQueue<Connection>>,
    pool: WorkerPool,
    busy: Response,
}

impl Server {
    /// Bind the socket and spawn the workers.
    pub fn bind(config: &ServerConfig, frontend: impl Into<Frontend>) -> Result<Self, ServerError> {
        let listener = Listener::bind(&config.listener)?;

        let dispatcher: Arc<dyn Dispatcher> = match frontend.into() {
            Frontend::Router(router) => {
                tracing::info!(routes = router.len(), "Serving routes");
                Arc::new(router)
            }
            Frontend::App(app) => {
                tracing::info!("Serving application");
                Arc::new(AppAdapter::new(
                    app,
                    config.listener.server_name.clone(),
                    listener.local_addr().port(),
                ))
            }
        };

        let queue = Arc::new(AdmissionQueue::new(config.pool.max_waiting));
        let pool = WorkerPool::spawn(
            config.pool.worker_count,
            Arc::clone(&queue),
            dispatcher,
            config.timeouts.clone(),
        )
        .map_err(ServerError::Spawn)?;

        tracing::info!(
            address = %listener.local_addr(),
            workers = pool.size(),
            max_waiting = queue.capacity(),
            "HTTP server ready"
        );

        Ok(Self {
            listener,
            queue,
            pool,
            busy: Response::busy(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub fn worker_count(&self) -> usize {
        self.pool.size()
    }

    /// Run the accept loop on the current thread. Never returns.
    pub fn run(self) {
        tracing::info!(address = %self.local_addr(), "Accepting connections");
        let mut failures = 0u32;
        loop {
            match self.listener.accept() {
                Ok(conn) => {
                    failures = 0;
                    self.admit(conn);
                }
                Err(e) => {
                    // Persistent failures (e.g. out of file descriptors)
                    // would otherwise spin and flood the log.
                    failures = failures.saturating_add(1);
                    let delay = accept_backoff(failures);
                    tracing::error!(error = %e, failures, retry_in = ?delay, "Accept failed");
                    thread::sleep(delay);
                }
            }
        }
    }

    /// Run the accept loop on a dedicated thread.
    pub fn start(self) -> Result<ServerHandle, ServerError> {
        let local_addr = self.local_addr();
        let acceptor = thread::Builder::new()
            .name("acceptor".to_string())
            .spawn(move || self.run())
            .map_err(ServerError::Spawn)?;
        Ok(ServerHandle {
            local_addr,
            acceptor,
        })
    }

    fn admit(&self, conn: Connection) {
        match self.queue.try_admit(conn) {
            Admission::Admitted { depth } => {
                metrics::record_admission(true);
                metrics::record_queue_depth(depth);
            }
            Admission::Rejected(conn) => {
                metrics::record_admission(false);
                tracing::warn!(
                    connection_id = %conn.id(),
                    peer_addr = %conn.peer_addr(),
                    idle_workers = self.queue.idle_workers(),
                    "Queue full, rejecting connection"
                );
                if let Err(e) = conn.write_response(&self.busy) {
                    tracing::debug!(connection_id = %conn.id(), error = %e, "Busy response not delivered");
                }
            }
        }
    }
}

const ACCEPT_BACKOFF_BASE: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Pause before retrying after `failures` consecutive accept errors:
/// doubles from 10ms, capped at one second.
fn accept_backoff(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_BASE
        .saturating_mul(1 << exponent)
        .min(ACCEPT_BACKOFF_MAX)
}

/// Handle to a server whose acceptor runs on its own thread.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    acceptor: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Block on the acceptor thread.
    pub fn join(self) -> thread::Result<()> {
        self.acceptor.join()
    }
}
