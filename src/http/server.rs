//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (timeout, request ID, tracing)
//! - Run request mungers before forwarding to the daemon
//! - Run response mungers before answering the client
//! - Map munger and upstream failures to Docker-style error bodies

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{uri::Authority, Request},
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::error::ProxyError;
use crate::http::{request, response};
use crate::munger::{HttpMessage, MungeError, MungerMatch, MungerRegistry, RequestContext};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<MungerRegistry>,
    pub client: Client<HttpConnector, Body>,
    pub daemon: Authority,
}

/// HTTP server for the Docker path proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server. `registry` must be fully built.
    pub fn new(config: ProxyConfig, registry: Arc<MungerRegistry>) -> Result<Self, ProxyError> {
        let daemon = Authority::from_str(&config.daemon.address).map_err(|source| {
            ProxyError::InvalidDaemonAddress {
                address: config.daemon.address.clone(),
                source,
            }
        })?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            registry,
            client,
            daemon,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving the proxy without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve connections from `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            daemon = %self.config.daemon.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Munge, forward, munge the response.
async fn proxy_handler(State(state): State<AppState>, req: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = req.method().clone();

    let resp = forward(&state, req).await;
    metrics::record_request(method.as_str(), resp.status().as_u16(), start_time);
    resp
}

async fn forward(state: &AppState, mut req: Request<Body>) -> Response {
    let request_id = request::request_id(&req);
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let mut context = RequestContext::new(request_id.clone());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    if let Some(found) = state.registry.requests().lookup(&method, &path) {
        if let Err(e) = run_munger(found, &mut req, &mut context).await {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "Request munging failed");
            return e.into_response();
        }
    }

    let forwarded = match request::prepare_for_daemon(req, &state.daemon) {
        Ok(forwarded) => forwarded,
        Err(e) => {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "Could not re-target request");
            return e.into_response();
        }
    };
    let mut resp = match state.client.request(forwarded).await {
        Ok(resp) => response::from_daemon(resp),
        Err(e) => {
            let e = ProxyError::from(e);
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            return e.into_response();
        }
    };

    if let Some(found) = state.registry.responses().lookup(&method, &path) {
        if let Err(e) = run_munger(found, &mut resp, &mut context).await {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "Response munging failed");
            return e.into_response();
        }
    }

    resp
}

async fn run_munger<M: HttpMessage>(
    found: MungerMatch<'_, M>,
    message: &mut M,
    context: &mut RequestContext,
) -> Result<(), MungeError> {
    let name = found.munger.name();
    tracing::debug!(
        request_id = %context.request_id(),
        role = M::ROLE,
        munger = name,
        pattern = found.pattern,
        "Running munger"
    );

    let result = found.munger.munge(message, context, &found.params).await;
    metrics::record_munge(name, result.as_ref().map_or_else(MungeError::kind, |_| "ok"));
    result
}
