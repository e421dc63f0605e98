//! Request preparation for the daemon.
//!
//! # Responsibilities
//! - Read the request ID assigned by the request-id layer
//! - Re-target the request URI at the daemon
//! - Strip hop-by-hop headers before forwarding
//!
//! # Design Decisions
//! - Path and query are forwarded verbatim, including the API version prefix
//! - The body is never touched here; mungers run before this step

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{header, HeaderMap, HeaderName, Request, Uri};

use crate::http::error::ProxyError;

/// Header carrying the per-request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Headers that only apply to a single connection.
const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// The request ID set by the request-id layer, or `"unknown"`.
pub fn request_id<B>(req: &Request<B>) -> String {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Remove hop-by-hop headers, including any named by `Connection`.
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
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
}

/// Rewrite `req` so it can be sent to the daemon at `daemon`.
pub fn prepare_for_daemon(
    req: Request<Body>,
    daemon: &Authority,
) -> Result<Request<Body>, ProxyError> {
    let (mut parts, body) = req.into_parts();

    let mut uri_parts = parts.uri.into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(daemon.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = Uri::from_parts(uri_parts)?;
    strip_hop_by_hop(&mut parts.headers);

    Ok(Request::from_parts(parts, body))
}
