//! Route matching logic.
//!
//! # Responsibilities
//! - Decide whether a request falls under the proxied context
//!
//! # Design Decisions
//! - Prefix comparison ignores ASCII case, as Express mounts do by default
//! - Matching never alters the path; the original bytes are forwarded
//! - Prefixes match on segment boundaries: `/api` matches `/api/x`, not `/apix`
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    ///
    /// A trailing slash on the prefix is ignored, so `/api/` behaves like `/api`.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: trimmed.to_string(),
        }
    }

    /// The normalized prefix (empty for the root context).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Match a bare path.
    pub fn matches_path(&self, path: &str) -> bool {
        let len = self.prefix.len();
        match (path.get(..len), path.get(len..)) {
            (Some(head), Some(rest)) => {
                head.eq_ignore_ascii_case(&self.prefix) && (rest.is_empty() || rest.starts_with('/'))
            }
            _ => false,
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matches_path(req.uri().path())
    }
}
