//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → CLI overrides applied by the binary
//!     → handed to Server::bind
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server is bound
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ServerConfig;
pub use schema::{ListenerConfig, ObservabilityConfig, PoolConfig, TimeoutConfig};
pub use validation::{validate_config, ValidationError};
