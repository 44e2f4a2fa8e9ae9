//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! edge router. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Branded sites and the hostnames that select them.
    pub brands: Vec<BrandConfig>,

    /// Origin the rewritten paths are fetched from.
    pub origin: OriginConfig,

    /// Rewrite rule parameters (default document, asset prefixes).
    pub rewrite: RewriteConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration for origin fetches.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// One branded static site.
///
/// Each brand owns a set of exact hostnames (typically the bare domain
/// and its `www.` variant) and a path prefix its content is rooted
/// under at the origin. Hosts matching no brand are served from the
/// origin root with no prefix.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrandConfig {
    /// Brand identifier for logging/metrics.
    pub name: String,

    /// Hostnames that select this brand (exact, case-sensitive).
    pub hosts: Vec<String>,

    /// Origin subtree root, e.g. "/moneyone". No trailing slash.
    pub path_prefix: String,
}

/// Origin server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL of the origin, e.g. "http://127.0.0.1:9000".
    /// Only scheme, host and port are used; rewritten paths are
    /// appended as-is.
    pub url: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9000".to_string(),
        }
    }
}

/// Rewrite rule parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Document served for directory-like paths.
    pub default_document: String,

    /// Path prefixes always treated as static assets (never
    /// brand-prefixed).
    pub asset_prefixes: Vec<String>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            default_document: "index.html".to_string(),
            asset_prefixes: vec![
                "/_next/".to_string(),
                "/favicon.ico".to_string(),
                "/icon.".to_string(),
            ],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Retry configuration for origin fetches.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts per request.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Fraction of requests that may be retries (retry budget),
    /// e.g. 0.1 for a 10% budget.
    pub budget_ratio: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
            budget_ratio: 0.1,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
