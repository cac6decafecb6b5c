//! Compiled forwarding target.
//!
//! # Responsibilities
//! - Hold the context matcher, rewriter and parsed target together
//! - Build the upstream URI for a matched request
//!
//! # Design Decisions
//! - Immutable after construction; reloads build a new `Upstream`
//! - The original path is forwarded in full, prefix included

use std::str::FromStr;

use axum::body::Body;
use axum::http::uri::{Authority, InvalidUri, PathAndQuery, Scheme};
use axum::http::{Request, Uri};
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::routing::matcher::{Matcher, PathPrefixMatcher};
use crate::routing::rewrite::PathRewriter;

/// Errors building or applying an upstream.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid target '{0}'")]
    InvalidTarget(String),
    #[error("invalid upstream uri: {0}")]
    Uri(#[from] InvalidUri),
    #[error("failed to build upstream uri: {0}")]
    Build(#[from] axum::http::Error),
}

/// The compiled form of an [`UpstreamConfig`].
#[derive(Debug, Clone)]
pub struct Upstream {
    matcher: PathPrefixMatcher,
    rewriter: PathRewriter,
    target: String,
    scheme: Scheme,
    authority: Authority,
    base_path: String,
    change_origin: bool,
    xfwd: bool,
}

impl Upstream {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, RoutingError> {
        let url = Url::parse(&config.target)
            .map_err(|_| RoutingError::InvalidTarget(config.target.clone()))?;
        let host = url
            .host_str()
            .ok_or_else(|| RoutingError::InvalidTarget(config.target.clone()))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let scheme = Scheme::from_str(url.scheme())
            .map_err(|_| RoutingError::InvalidTarget(config.target.clone()))?;

        Ok(Self {
            matcher: PathPrefixMatcher::new(config.context.as_str()),
            rewriter: PathRewriter::new(&config.path_rewrite),
            target: config.target.clone(),
            scheme,
            authority: Authority::from_str(&authority)?,
            base_path: url.path().trim_end_matches('/').to_string(),
            change_origin: config.change_origin,
            xfwd: config.xfwd,
        })
    }

    /// Whether the request falls under the proxied context.
    pub fn matches(&self, req: &Request<Body>) -> bool {
        self.matcher.matches(req)
    }

    /// Target as configured.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Context prefix, normalized.
    pub fn context(&self) -> &str {
        self.matcher.prefix()
    }

    /// Target authority, also used as the Host header when changing origin.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn change_origin(&self) -> bool {
        self.change_origin
    }

    pub fn xfwd(&self) -> bool {
        self.xfwd
    }

    /// Build the URI to request from the backend for `original`.
    pub fn upstream_uri(&self, original: &Uri) -> Result<Uri, RoutingError> {
        let path = self.rewriter.rewrite(original.path());
        let mut path_and_query = format!("{}{}", self.base_path, path);
        if let Some(query) = original.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        Ok(Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(PathAndQuery::from_str(&path_and_query)?)
            .build()?)
    }
}
