//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use docker_path_proxy::config::ProxyConfig;
use docker_path_proxy::munger::MungerRegistry;
use docker_path_proxy::{HttpServer, Shutdown};

/// A fake dockerd that echoes what it received.
pub struct MockDaemon {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockDaemon {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a mock daemon on an ephemeral port.
///
/// Every request is answered with a JSON object holding the method, path
/// and query, declared `Content-Length` and body as received.
pub async fn start_mock_daemon() -> MockDaemon {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    let app = Router::new().fallback(move |req: Request<Body>| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            echo(req).await
        }
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockDaemon { addr, hits }
}

async fn echo(req: Request<Body>) -> Json<Value> {
    let method = req.method().to_string();
    let path = req
        .uri()
        .path_and_query()
        .map(ToString::to_string)
        .unwrap_or_default();
    let content_length = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = req.into_body().collect().await.unwrap().to_bytes();

    Json(json!({
        "method": method,
        "path": path,
        "content_length": content_length,
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Start the proxy in front of `daemon`, returning its address.
pub async fn start_proxy(daemon: SocketAddr, registry: MungerRegistry) -> (SocketAddr, Shutdown) {
    let mut config = ProxyConfig::default();
    config.daemon.address = daemon.to_string();

    let server = HttpServer::new(config, Arc::new(registry)).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.signal();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
