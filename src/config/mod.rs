//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EdgeConfig (validated, immutable)
//!     → compiled into RewriteTable / EdgeState
//!
//! On reload signal:
//!     watcher.rs detects change (or SIGHUP re-reads)
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the server's EdgeState
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A failed reload never disturbs the running configuration

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BrandConfig, EdgeConfig, ListenerConfig, ObservabilityConfig, OriginConfig, RetryConfig,
    RewriteConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
