//! Response handling.
//!
//! # Responsibilities
//! - Convert the daemon's response into an axum response
//! - Strip hop-by-hop headers
//!
//! # Design Decisions
//! - Streaming responses (logs, events) are passed through without buffering
//!   unless a response munger asks for the body

use axum::body::Body;
use axum::http::Response;
use hyper::body::Incoming;

use crate::http::request::strip_hop_by_hop;

/// Wrap a daemon response for the client.
pub fn from_daemon(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
