//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (blocking accept)
//!     → queue.rs (atomic try-admit, or 503 from the acceptor)
//!     → pool.rs (a worker claims it: parse → dispatch → respond)
//!     → connection.rs (socket closed on drop)
//!
//! Worker states:
//!     Idle → Claimed → Parsing → Dispatching → Responding → Idle
//! ```
//!
//! # Design Decisions
//! - Bounded queue prevents unbounded resource growth
//! - One request per connection; failures never leave the worker
//! - Blocking I/O on OS threads; no async runtime

pub mod connection;
pub mod listener;
pub mod pool;
pub mod queue;

pub use connection::{Connection, ConnectionId};
pub use listener::{Listener, ListenerError};
pub use pool::{ConnectionError, WorkerPool};
pub use queue::{Admission, AdmissionQueue};
