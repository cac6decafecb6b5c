//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Target used when neither the config file nor `WF_SERVER` names one.
pub const DEFAULT_TARGET: &str = "http://localhost:8081";

/// Path prefix forwarded to the backend.
pub const DEFAULT_CONTEXT: &str = "/api";

/// Root configuration for the development proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single proxied context and its backend origin.
    pub proxy: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Forwarding rules for the proxied context.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Path prefix that selects requests for forwarding.
    pub context: String,

    /// Backend origin, e.g. "http://localhost:8081".
    pub target: String,

    /// Rewrite the Host header to the target's authority.
    pub change_origin: bool,

    /// Append X-Forwarded-For / -Proto / -Host headers.
    pub xfwd: bool,

    /// Path rewrites applied before forwarding. First match wins.
    pub path_rewrite: Vec<PathRewriteRule>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            context: DEFAULT_CONTEXT.to_string(),
            target: DEFAULT_TARGET.to_string(),
            change_origin: true,
            xfwd: false,
            path_rewrite: Vec::new(),
        }
    }
}

/// An anchored prefix rewrite, e.g. `"^/api/" -> "/"`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PathRewriteRule {
    /// Prefix to replace. A leading `^` is accepted and ignored.
    pub pattern: String,

    /// Replacement for the matched prefix.
    pub replacement: String,
}

impl PathRewriteRule {
    /// The prefix this rule matches, with any `^` anchor removed.
    pub fn prefix(&self) -> &str {
        self.pattern.strip_prefix('^').unwrap_or(&self.pattern)
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
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
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
