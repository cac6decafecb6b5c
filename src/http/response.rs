//! Response handling and transformation.
//!
//! # Responsibilities
//! - Transform backend response for client
//! - Strip hop-by-hop headers in both directions
//! - Map upstream failures to gateway status codes
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Connect failures and timeouts answer 504, anything else 500

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use hyper::body::Incoming;

/// Headers meaningful only for a single transport-level connection.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Why forwarding a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// The backend could not be reached.
    Connect,
    /// The backend did not answer in time.
    Timeout,
    /// Anything else: protocol errors, resets mid-response, bad request URI.
    Other,
}

impl UpstreamFailure {
    pub fn from_client_error(err: &hyper_util::client::legacy::Error) -> Self {
        if err.is_connect() {
            UpstreamFailure::Connect
        } else {
            UpstreamFailure::Other
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            UpstreamFailure::Connect | UpstreamFailure::Timeout => StatusCode::GATEWAY_TIMEOUT,
            UpstreamFailure::Other => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Plain-text error returned to the client when the backend is unusable.
pub fn proxy_error_response(failure: UpstreamFailure, host: &str, path: &str) -> Response<Body> {
    (
        failure.status(),
        format!("Error occurred while trying to proxy: {host}{path}"),
    )
        .into_response()
}

/// Convert a backend response into a client response, streaming the body.
pub fn into_client_response(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
