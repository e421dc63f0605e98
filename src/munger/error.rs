//! Munger error definitions.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::translate::TranslationError;

/// Result type alias for munger operations.
pub type Result<T> = std::result::Result<T, MungeError>;

/// Errors that abort munging of a single request or response.
#[derive(Debug, Error)]
pub enum MungeError {
    /// The original body could not be consumed.
    #[error("could not read {role} body: {source}")]
    BodyRead {
        role: &'static str,
        #[source]
        source: axum::Error,
    },

    /// The body is longer than the configured limit.
    #[error("{role} body exceeds {limit} bytes")]
    BodyTooLarge { role: &'static str, limit: usize },

    /// The body is not JSON of the expected shape.
    #[error("could not decode {role} body: {source}")]
    BodyDecode {
        role: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A bind entry does not follow `host:container[:options]`.
    #[error("invalid bind {index} ({bind:?}): {reason}")]
    InvalidBind {
        index: usize,
        bind: String,
        reason: &'static str,
    },

    /// A path-style bind has no equivalent in the daemon namespace.
    #[error("could not translate mount path {path} (bind {index}): {source}")]
    PathTranslation {
        index: usize,
        path: String,
        #[source]
        source: TranslationError,
    },

    /// The rewritten body could not be serialized.
    #[error("could not re-encode {role} body: {source}")]
    BodyEncode {
        role: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl MungeError {
    /// Returns the HTTP status code reported to the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BodyDecode { .. } | Self::InvalidBind { .. } | Self::PathTranslation { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BodyRead { .. } | Self::BodyEncode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BodyRead { .. } => "body_read",
            Self::BodyTooLarge { .. } => "body_too_large",
            Self::BodyDecode { .. } => "body_decode",
            Self::InvalidBind { .. } => "invalid_bind",
            Self::PathTranslation { .. } => "path_translation",
            Self::BodyEncode { .. } => "body_encode",
        }
    }
}

impl IntoResponse for MungeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Docker clients print the `message` field of error bodies.
        let body = serde_json::json!({
            "message": self.to_string()
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Errors raised while building the munger registry at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{role} munger for {method} {pattern} is already registered")]
    DuplicateMunger {
        role: &'static str,
        method: Method,
        pattern: String,
    },

    #[error("invalid path pattern {pattern:?}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },
}
