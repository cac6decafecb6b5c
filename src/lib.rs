//! Development reverse proxy.
//!
//! Requests under one path prefix (`/api` by default) are forwarded to a
//! backend origin taken from `WF_SERVER`, falling back to
//! `http://localhost:8081`. Everything else answers 404.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
