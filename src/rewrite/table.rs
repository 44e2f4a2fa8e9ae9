//! Host classification and rewrite dispatch.
//!
//! # Responsibilities
//! - Store compiled brands and the host lookup map
//! - Resolve a Host header value to its brand
//! - Dispatch into the shared rewrite rules
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact host lookup via HashMap
//! - Host matching is exact and case-sensitive against configured
//!   host strings; callers strip the port first
//! - Unknown host resolves to no brand rather than an error

use std::collections::HashMap;

use crate::config::EdgeConfig;
use crate::rewrite::rules::RewriteRules;

/// A branded static site rooted under a path prefix at the origin.
#[derive(Debug, Clone)]
pub struct Brand {
    /// Brand identifier for logging and metrics labels.
    pub name: String,

    /// Origin subtree root, e.g. `/moneyone`. No trailing slash.
    pub path_prefix: String,
}

/// Compiled host → brand table plus the shared rewrite rules.
#[derive(Debug, Clone)]
pub struct RewriteTable {
    brands: Vec<Brand>,
    hosts: HashMap<String, usize>,
    rules: RewriteRules,
}

impl RewriteTable {
    /// Compile the table from configuration.
    ///
    /// Later brands never steal hosts from earlier ones; duplicate
    /// hosts are rejected by config validation before this runs.
    pub fn from_config(config: &EdgeConfig) -> Self {
        let mut brands = Vec::with_capacity(config.brands.len());
        let mut hosts = HashMap::new();

        for brand in &config.brands {
            let index = brands.len();
            brands.push(Brand {
                name: brand.name.clone(),
                path_prefix: brand.path_prefix.clone(),
            });
            for host in &brand.hosts {
                hosts.entry(host.clone()).or_insert(index);
            }
        }

        Self {
            brands,
            hosts,
            rules: RewriteRules::from_config(&config.rewrite),
        }
    }

    /// Look up the brand owning `host`, if any.
    pub fn resolve(&self, host: &str) -> Option<&Brand> {
        self.hosts.get(host).map(|&i| &self.brands[i])
    }

    /// Rewrite a request path for the given host.
    ///
    /// Returns the matched brand (None for the default branch) and the
    /// origin path to fetch.
    pub fn rewrite(&self, host: &str, uri: &str) -> (Option<&Brand>, String) {
        let brand = self.resolve(host);
        let prefix = brand.map(|b| b.path_prefix.as_str());
        (brand, self.rules.apply(prefix, uri))
    }

    pub fn rules(&self) -> &RewriteRules {
        &self.rules
    }

    /// Number of configured brands.
    pub fn brand_count(&self) -> usize {
        self.brands.len()
    }

    /// Number of recognized hostnames.
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }
}

/// Strip an optional `:port` suffix from a Host header value.
///
/// Handles bracketed IPv6 literals (`[::1]:8080`). The remaining host
/// string is matched exactly; no case folding is applied.
pub fn host_without_port(host: &str) -> &str {
    if host.starts_with('[') {
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        host.split(':').next().unwrap_or(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrandConfig;

    fn table() -> RewriteTable {
        let mut config = EdgeConfig::default();
        config.brands.push(BrandConfig {
            name: "moneyone".into(),
            hosts: vec!["moneyone.in".into(), "www.moneyone.in".into()],
            path_prefix: "/moneyone".into(),
        });
        config.brands.push(BrandConfig {
            name: "onemoney".into(),
            hosts: vec!["onemoney.in".into(), "www.onemoney.in".into()],
            path_prefix: "/onemoney".into(),
        });
        RewriteTable::from_config(&config)
    }

    #[test]
    fn test_host_resolution() {
        let t = table();
        assert_eq!(t.resolve("moneyone.in").unwrap().name, "moneyone");
        assert_eq!(t.resolve("www.moneyone.in").unwrap().name, "moneyone");
        assert_eq!(t.resolve("onemoney.in").unwrap().name, "onemoney");
        assert!(t.resolve("cdn123.cloudfront.net").is_none());
        // Exact match: case and subdomains are not folded.
        assert!(t.resolve("MONEYONE.IN").is_none());
        assert!(t.resolve("sub.moneyone.in").is_none());
    }

    #[test]
    fn test_rewrite_dispatch() {
        let t = table();
        let (brand, path) = t.rewrite("moneyone.in", "/team");
        assert_eq!(brand.unwrap().name, "moneyone");
        assert_eq!(path, "/moneyone/team/index.html");

        let (brand, path) = t.rewrite("cdn123.cloudfront.net", "/about");
        assert!(brand.is_none());
        assert_eq!(path, "/about/index.html");
    }

    #[test]
    fn test_rewrite_is_deterministic() {
        let t = table();
        for (host, uri) in [
            ("moneyone.in", "/"),
            ("moneyone.in", "/moneyone/team"),
            ("www.onemoney.in", "/pricing"),
            ("unknown.example", "/logo.png"),
        ] {
            let first = t.rewrite(host, uri).1;
            let second = t.rewrite(host, uri).1;
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_host_without_port() {
        assert_eq!(host_without_port("moneyone.in"), "moneyone.in");
        assert_eq!(host_without_port("moneyone.in:8080"), "moneyone.in");
        assert_eq!(host_without_port("127.0.0.1:29181"), "127.0.0.1");
        assert_eq!(host_without_port("[::1]:8080"), "[::1]");
        assert_eq!(host_without_port(""), "");
    }
}
