//! URI rewrite subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path)
//!     → table.rs (host → brand lookup)
//!     → rules.rs (prefix redirection + default-document resolution)
//!     → Return: rewritten origin path
//!
//! Table Compilation (at startup / reload):
//!     BrandConfig[]
//!     → Build exact host map
//!     → Freeze as immutable RewriteTable
//! ```
//!
//! # Design Decisions
//! - Table compiled from config, immutable at runtime (swap on reload)
//! - Pure string rules in the hot path, no regex, no I/O
//! - Deterministic: same (host, uri) always produces the same path
//! - Unknown hosts fall through to a prefix-less default brand

pub mod rules;
pub mod table;

pub use rules::RewriteRules;
pub use table::{host_without_port, Brand, RewriteTable};
