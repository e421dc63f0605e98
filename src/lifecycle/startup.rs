//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the munger registry from the enumerated munger list
//! - Build the HTTP server around the frozen registry
//! - Bind the listener last, so traffic only arrives when ready

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::{HttpServer, ProxyError};
use crate::munger::RegistryError;
use crate::mungers;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("munger registration failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("server setup failed: {0}")]
    Server(#[from] ProxyError),

    #[error("could not bind listener: {0}")]
    Bind(#[from] std::io::Error),
}

/// Prepare the server and its listener from a validated config.
pub async fn start(config: ProxyConfig) -> Result<(HttpServer, TcpListener), StartupError> {
    let registry = Arc::new(mungers::default_registry(&config.munging)?);
    let server = HttpServer::new(config, registry)?;

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for Docker clients");
    Ok((server, listener))
}
