//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and background tasks produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape), off by default
//! ```
//!
//! # Design Decisions
//! - Request ID flows through log fields and is forwarded to the backend
//! - Metrics macros are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
