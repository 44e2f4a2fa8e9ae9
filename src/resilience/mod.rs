//! Resilience subsystem for origin fetches.
//!
//! # Data Flow
//! ```text
//! Origin fetch fails (connect error or 502/503/504)
//!     → retries.rs (is this retryable? budget left?)
//!     → backoff.rs (how long to wait)
//!     → http server retries or gives up with 502
//! ```
//!
//! # Design Decisions
//! - Only idempotent methods are retried (static sites are GET/HEAD)
//! - Jittered exponential backoff prevents thundering herd
//! - A global retry budget prevents retry storms under load

pub mod backoff;
pub mod retries;

pub use backoff::calculate_backoff;
pub use retries::{is_retryable, RetryBudget};
