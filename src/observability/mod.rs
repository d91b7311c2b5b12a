//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! acceptor / workers produce:
//!     → logging.rs (structured log events, per-connection spans)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log output (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (connection id, peer, status) rather than prose
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
