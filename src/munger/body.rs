//! Replayable JSON bodies.
//!
//! # Responsibilities
//! - Buffer a request or response body and decode it as JSON
//! - Put the original bytes back so later stages see the body unchanged
//! - Replace a body with a re-encoded value and fix up its framing headers
//!
//! # Design Decisions
//! - One implementation for both directions, selected by [`HttpMessage`]
//! - Whole-body buffering, bounded by the caller's limit; no streaming decode
//! - The body is restored before decode errors are reported

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request, Response};
use bytes::Bytes;
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::munger::error::{MungeError, Result};

/// An HTTP message whose body can be inspected and replaced.
pub trait HttpMessage: Send {
    /// `"request"` or `"response"`, used in error messages.
    const ROLE: &'static str;

    fn headers_mut(&mut self) -> &mut HeaderMap;
    fn body_mut(&mut self) -> &mut Body;
}

impl HttpMessage for Request<Body> {
    const ROLE: &'static str = "request";

    fn headers_mut(&mut self) -> &mut HeaderMap {
        Request::headers_mut(self)
    }

    fn body_mut(&mut self) -> &mut Body {
        Request::body_mut(self)
    }
}

impl HttpMessage for Response<Body> {
    const ROLE: &'static str = "response";

    fn headers_mut(&mut self) -> &mut HeaderMap {
        Response::headers_mut(self)
    }

    fn body_mut(&mut self) -> &mut Body {
        Response::body_mut(self)
    }
}

/// Read the whole body of `message` and decode it as JSON.
///
/// On return the message carries a fresh body holding the same bytes, whether
/// or not decoding succeeded. The raw bytes are returned alongside the value.
/// A read failure leaves the body empty, since the original stream cannot be
/// rewound. A body longer than `limit` is reported as [`MungeError::BodyTooLarge`].
pub async fn read_json<T, M>(message: &mut M, limit: usize) -> Result<(T, Bytes)>
where
    T: DeserializeOwned,
    M: HttpMessage,
{
    let body = std::mem::take(message.body_mut());
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|source| {
            if exceeds_limit(&source) {
                MungeError::BodyTooLarge {
                    role: M::ROLE,
                    limit,
                }
            } else {
                MungeError::BodyRead {
                    role: M::ROLE,
                    source,
                }
            }
        })?;

    *message.body_mut() = Body::from(bytes.clone());

    let value = serde_json::from_slice(&bytes).map_err(|source| MungeError::BodyDecode {
        role: M::ROLE,
        source,
    })?;
    Ok((value, bytes))
}

fn exceeds_limit(error: &axum::Error) -> bool {
    std::error::Error::source(error).is_some_and(|inner| inner.is::<LengthLimitError>())
}

/// Replace the body of `message` with the JSON encoding of `value`.
///
/// `Content-Length` is set to the exact new length and any
/// `Transfer-Encoding` is dropped. Returns the new length.
pub fn replace_json<T, M>(message: &mut M, value: &T) -> Result<usize>
where
    T: Serialize + ?Sized,
    M: HttpMessage,
{
    let buf = serde_json::to_vec(value).map_err(|source| MungeError::BodyEncode {
        role: M::ROLE,
        source,
    })?;
    let len = buf.len();

    *message.body_mut() = Body::from(buf);
    let headers = message.headers_mut();
    headers.remove(header::TRANSFER_ENCODING);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    Ok(len)
}
