//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize)
//!     → env.rs (WF_SERVER overrides the target)
//!     → overrides.rs (command-line flags win over both)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → sent to the server, which swaps its compiled upstream
//! ```
//!
//! # Design Decisions
//! - All fields have defaults, so running with no file at all is the common case
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod overrides;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, resolve_config, resolve_config_with_env, ConfigError};
pub use overrides::Overrides;
pub use schema::{
    ListenerConfig, ObservabilityConfig, PathRewriteRule, ProxyConfig, TimeoutConfig,
    UpstreamConfig,
};
