//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Prepare request for forwarding to the backend
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing, and forwarded upstream
//! - The body is streamed through, never buffered

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use axum::http::{Request, Version};
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::strip_hop_by_hop;
use crate::routing::{RoutingError, Upstream};

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Generates `x-request-id` values for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID set by the request-ID layer.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Errors turning a client request into a backend request.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// Rewrite a client request so it can be sent to `upstream`.
pub fn prepare_forward_request(
    request: Request<Body>,
    upstream: &Upstream,
    client_addr: SocketAddr,
) -> Result<Request<Body>, ForwardError> {
    let (mut parts, body) = request.into_parts();

    let original_host = parts
        .headers
        .get(header::HOST)
        .cloned()
        .or_else(|| parts.uri.authority().and_then(|a| HeaderValue::from_str(a.as_str()).ok()));

    parts.uri = upstream.upstream_uri(&parts.uri)?;
    // The backend connection is HTTP/1.1 regardless of how the client spoke to us.
    parts.version = Version::HTTP_11;
    strip_hop_by_hop(&mut parts.headers);

    if upstream.change_origin() {
        parts
            .headers
            .insert(header::HOST, HeaderValue::from_str(upstream.authority().as_str())?);
    } else if let Some(host) = original_host.clone() {
        parts.headers.insert(header::HOST, host);
    }

    if upstream.xfwd() {
        append_forwarded(&mut parts.headers, client_addr, original_host)?;
    }

    Ok(Request::from_parts(parts, body))
}

fn append_forwarded(
    headers: &mut HeaderMap,
    client_addr: SocketAddr,
    original_host: Option<HeaderValue>,
) -> Result<(), InvalidHeaderValue> {
    let client_ip = client_addr.ip().to_string();
    let forwarded_for = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(existing) => format!("{existing}, {client_ip}"),
        None => client_ip,
    };
    headers.insert(X_FORWARDED_FOR, HeaderValue::from_str(&forwarded_for)?);

    if !headers.contains_key(&X_FORWARDED_PROTO) {
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    }
    if let Some(host) = original_host {
        if !headers.contains_key(&X_FORWARDED_HOST) {
            headers.insert(X_FORWARDED_HOST, host);
        }
    }
    Ok(())
}
