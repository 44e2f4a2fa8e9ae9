//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (no host claimed by two brands)
//! - Validate value shapes (prefixes, addresses, origin URL)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system, both at startup
//!   and on reload

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::EdgeConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    InvalidBindAddress(String),

    #[error("invalid metrics address `{0}`")]
    InvalidMetricsAddress(String),

    #[error("brand at index {0} has an empty name")]
    EmptyBrandName(usize),

    #[error("brand name `{0}` is defined more than once")]
    DuplicateBrandName(String),

    #[error("brand `{0}` lists no hosts")]
    NoHosts(String),

    #[error("brand `{0}` lists an empty host")]
    EmptyHost(String),

    #[error("host `{host}` is claimed by both `{first}` and `{second}`")]
    DuplicateHost {
        host: String,
        first: String,
        second: String,
    },

    #[error("brand `{brand}`: path prefix `{prefix}` must start with '/'")]
    PrefixMissingSlash { brand: String, prefix: String },

    #[error("brand `{brand}`: path prefix `{prefix}` must not be bare '/' or end with '/'")]
    PrefixTrailingSlash { brand: String, prefix: String },

    #[error("invalid origin url `{url}`: {reason}")]
    InvalidOrigin { url: String, reason: String },

    #[error("rewrite: default document must not be empty")]
    EmptyDefaultDocument,

    #[error("retries: max_attempts must be at least 1")]
    ZeroRetryAttempts,

    #[error("retries: budget_ratio must be within 0.0..=1.0, got {0}")]
    BadBudgetRatio(f32),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    validate_brands(config, &mut errors);
    validate_origin(config, &mut errors);

    if config.rewrite.default_document.is_empty() {
        errors.push(ValidationError::EmptyDefaultDocument);
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroRetryAttempts);
    }
    if !(0.0..=1.0).contains(&config.retries.budget_ratio) {
        errors.push(ValidationError::BadBudgetRatio(config.retries.budget_ratio));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_brands(config: &EdgeConfig, errors: &mut Vec<ValidationError>) {
    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut seen_hosts: HashMap<&str, &str> = HashMap::new();

    for (index, brand) in config.brands.iter().enumerate() {
        if brand.name.is_empty() {
            errors.push(ValidationError::EmptyBrandName(index));
        } else if !seen_names.insert(brand.name.as_str()) {
            errors.push(ValidationError::DuplicateBrandName(brand.name.clone()));
        }

        if brand.hosts.is_empty() {
            errors.push(ValidationError::NoHosts(brand.name.clone()));
        }
        for host in &brand.hosts {
            if host.is_empty() {
                errors.push(ValidationError::EmptyHost(brand.name.clone()));
                continue;
            }
            if let Some(first) = seen_hosts.insert(host.as_str(), brand.name.as_str()) {
                errors.push(ValidationError::DuplicateHost {
                    host: host.clone(),
                    first: first.to_string(),
                    second: brand.name.clone(),
                });
            }
        }

        if !brand.path_prefix.starts_with('/') {
            errors.push(ValidationError::PrefixMissingSlash {
                brand: brand.name.clone(),
                prefix: brand.path_prefix.clone(),
            });
        } else if brand.path_prefix.len() == 1 || brand.path_prefix.ends_with('/') {
            errors.push(ValidationError::PrefixTrailingSlash {
                brand: brand.name.clone(),
                prefix: brand.path_prefix.clone(),
            });
        }
    }
}

fn validate_origin(config: &EdgeConfig, errors: &mut Vec<ValidationError>) {
    match url::Url::parse(&config.origin.url) {
        Ok(parsed) => {
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                errors.push(ValidationError::InvalidOrigin {
                    url: config.origin.url.clone(),
                    reason: format!("unsupported scheme `{}`", parsed.scheme()),
                });
            } else if parsed.host_str().is_none() {
                errors.push(ValidationError::InvalidOrigin {
                    url: config.origin.url.clone(),
                    reason: "missing host".to_string(),
                });
            }
        }
        Err(e) => {
            errors.push(ValidationError::InvalidOrigin {
                url: config.origin.url.clone(),
                reason: e.to_string(),
            });
        }
    }
}
