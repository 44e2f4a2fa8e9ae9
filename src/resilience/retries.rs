//! Retry decisions and budget.
//!
//! # Responsibilities
//! - Determine if a failed origin fetch is retryable
//! - Enforce a global retry budget so retries stay a bounded fraction
//!   of overall traffic
//!
//! # Design Decisions
//! - Never retry non-idempotent methods
//! - Connect errors always retryable; of the statuses only 502/503/504
//! - Budget is a lock-free token bucket: each real request deposits
//!   `ratio` tokens, each retry spends one

use std::sync::atomic::{AtomicI64, Ordering};

use axum::http::{Method, StatusCode};

/// Token granularity. Tokens are stored in thousandths so fractional
/// deposit ratios stay exact enough without floats in the hot path.
const TOKEN_SCALE: i64 = 1000;

/// Global retry budget shared by all in-flight requests.
#[derive(Debug)]
pub struct RetryBudget {
    /// Current balance in milli-tokens.
    tokens: AtomicI64,
    /// Deposited per recorded request, in milli-tokens.
    deposit: i64,
    /// Balance cap in milli-tokens.
    max_tokens: i64,
}

impl RetryBudget {
    /// Create a budget depositing `ratio` tokens per request, with an
    /// initial balance (and cap) of `initial` retries.
    pub fn new(ratio: f32, initial: u32) -> Self {
        let max_tokens = i64::from(initial) * TOKEN_SCALE;
        Self {
            tokens: AtomicI64::new(max_tokens),
            deposit: (f64::from(ratio) * TOKEN_SCALE as f64) as i64,
            max_tokens,
        }
    }

    /// Record a real (non-retry) request, growing the budget.
    pub fn record_request(&self) {
        let balance = self.tokens.fetch_add(self.deposit, Ordering::Relaxed) + self.deposit;
        if balance > self.max_tokens {
            // May briefly overshoot under contention; the cap is advisory.
            self.tokens.store(self.max_tokens, Ordering::Relaxed);
        }
    }

    /// Try to spend one retry from the budget.
    pub fn can_retry(&self) -> bool {
        let previous = self.tokens.fetch_sub(TOKEN_SCALE, Ordering::Relaxed);
        if previous < TOKEN_SCALE {
            self.tokens.fetch_add(TOKEN_SCALE, Ordering::Relaxed);
            false
        } else {
            true
        }
    }
}

/// Whether a failed attempt may be tried again.
///
/// `connect_error` covers failures where no response was received.
pub fn is_retryable(method: &Method, status: Option<StatusCode>, connect_error: bool) -> bool {
    if !method.is_idempotent() {
        return false;
    }
    if connect_error {
        return true;
    }
    status.is_some_and(|s| {
        s == StatusCode::BAD_GATEWAY
            || s == StatusCode::SERVICE_UNAVAILABLE
            || s == StatusCode::GATEWAY_TIMEOUT
    })
}
