//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → request.rs (request ID)
//!     → server.rs (edge handler: host → rewrite → origin fetch)
//!     → headers.rs (forwarding headers, hop-by-hop stripping)
//!     → Response streamed back to the client
//! ```
//!
//! # Design Decisions
//! - One catch-all route; the rewrite table does the real routing
//! - Origin responses are streamed, not buffered
//! - Request ID added before anything can log about the request

pub mod headers;
pub mod request;
pub mod server;

pub use server::{AppState, EdgeState, HttpServer};
