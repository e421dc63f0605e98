//! Proxy transport errors.

use axum::http::uri::InvalidUri;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while forwarding to the Docker daemon.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// `daemon.address` is not a valid URI authority.
    #[error("invalid daemon address {address:?}: {source}")]
    InvalidDaemonAddress {
        address: String,
        #[source]
        source: InvalidUri,
    },

    /// The request URI could not be re-targeted at the daemon.
    #[error("could not build daemon URI: {0}")]
    Uri(#[from] axum::http::uri::InvalidUriParts),

    /// The daemon could not be reached or the exchange failed.
    #[error("daemon request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidDaemonAddress { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Uri(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "message": self.to_string()
        });

        (status, axum::Json(body)).into_response()
    }
}
