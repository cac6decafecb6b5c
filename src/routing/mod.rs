//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → matcher.rs (is the path under the context?)
//!     → rewrite.rs (optional prefix rewrite)
//!     → upstream.rs (join with target origin)
//!     → Return: upstream URI, or no match
//!
//! Compilation (at startup and on reload):
//!     UpstreamConfig
//!     → parse target, normalize context
//!     → Freeze as immutable Upstream
//! ```
//!
//! # Design Decisions
//! - One context, one target
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always yields the same upstream URI

pub mod matcher;
pub mod rewrite;
pub mod upstream;

pub use matcher::{Matcher, PathPrefixMatcher};
pub use rewrite::PathRewriter;
pub use upstream::{RoutingError, Upstream};
