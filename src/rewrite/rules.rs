//! Path rewrite rules for static-site hosting.
//!
//! # Responsibilities
//! - Default-document resolution (directory-like paths get `index.html`)
//! - Static asset detection (assets are never brand-prefixed)
//! - Brand-prefix redirection for unprefixed routes
//!
//! # Design Decisions
//! - Total function over all string inputs: no error paths, a malformed
//!   URI just yields an odd path for the origin to 404 on
//! - Rule order is fixed: root, own prefix, asset, fallback prefix.
//!   Own-prefix must run before the asset check so `/moneyone/logo.png`
//!   keeps its prefix untouched.
//! - A path containing `.` anywhere is treated as a file. Inherited
//!   heuristic, kept for routing compatibility; it misclassifies route
//!   segments with a literal dot (e.g. `/v1.2/page`).

use crate::config::RewriteConfig;

/// The shared rewrite algorithm, parameterized by config.
///
/// One instance serves every brand; the brand only contributes its path
/// prefix at call time.
#[derive(Debug, Clone)]
pub struct RewriteRules {
    default_document: String,
    asset_prefixes: Vec<String>,
}

impl RewriteRules {
    pub fn from_config(config: &RewriteConfig) -> Self {
        Self {
            default_document: config.default_document.clone(),
            asset_prefixes: config.asset_prefixes.clone(),
        }
    }

    /// Append the default document where the path names a directory.
    ///
    /// Trailing slash: append directly. No dot anywhere: treat as a
    /// route and append `/<default_document>`. Otherwise the path
    /// already names a concrete file and is returned unchanged.
    pub fn resolve_default_document(&self, path: &str) -> String {
        if path.ends_with('/') {
            format!("{}{}", path, self.default_document)
        } else if !path.contains('.') {
            format!("{}/{}", path, self.default_document)
        } else {
            path.to_string()
        }
    }

    /// True if the path looks like a static asset rather than a route.
    pub fn is_asset_path(&self, path: &str) -> bool {
        self.asset_prefixes.iter().any(|p| path.starts_with(p.as_str())) || path.contains('.')
    }

    /// Apply the full rewrite for one request.
    ///
    /// `prefix` is the brand's subtree root (no trailing slash), or
    /// `None` for the default brand, which skips prefixing entirely.
    pub fn apply(&self, prefix: Option<&str>, uri: &str) -> String {
        let Some(prefix) = prefix else {
            return self.resolve_default_document(uri);
        };

        // Root request goes straight to the brand's default document.
        if uri.is_empty() || uri == "/" {
            return format!("{}/{}", prefix, self.default_document);
        }

        // Already inside the brand subtree: keep the prefix untouched,
        // only resolve the default document on the remainder.
        if uri.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/')) {
            return self.resolve_default_document(uri);
        }

        // Asset-like paths are served from the origin root, unprefixed.
        if self.is_asset_path(uri) {
            return self.resolve_default_document(uri);
        }

        // Anything else is an unprefixed brand route.
        let mut prefixed = String::with_capacity(prefix.len() + uri.len());
        prefixed.push_str(prefix);
        prefixed.push_str(uri);
        self.resolve_default_document(&prefixed)
    }
}

impl Default for RewriteRules {
    fn default() -> Self {
        Self::from_config(&RewriteConfig::default())
    }
}
