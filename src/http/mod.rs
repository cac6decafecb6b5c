//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request-ID and trace layers)
//!     → [routing decides whether the path is proxied]
//!     → request.rs (rewrite URI and headers for the backend)
//!     → hyper client → backend origin
//!     → response.rs (strip hop-by-hop headers, map failures)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::UpstreamFailure;
pub use server::{HttpServer, ServerError};
