//! Environment overrides.

use crate::config::schema::ProxyConfig;

/// Variable naming the backend origin.
pub const TARGET_ENV: &str = "WF_SERVER";

/// Resolves an environment variable by name.
pub type EnvLookup = fn(&str) -> Option<String>;

/// Lookup backed by the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Apply environment overrides using `lookup` to resolve variables.
///
/// An unset or empty `WF_SERVER` leaves the configured target untouched.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(target) = lookup(TARGET_ENV).filter(|v| !v.is_empty()) {
        tracing::debug!(env = TARGET_ENV, target = %target, "Target overridden from environment");
        config.proxy.target = target;
    }
}
