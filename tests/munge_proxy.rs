//! End-to-end tests: Docker client → proxy → mock daemon.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Response, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use docker_path_proxy::config::MungingConfig;
use docker_path_proxy::munger::{
    read_json, replace_json, MungeError, Munger, MungerRegistry, RequestContext, TemplateParams,
};
use docker_path_proxy::mungers::default_registry;

mod common;

fn registry() -> MungerRegistry {
    default_registry(&MungingConfig::default()).unwrap()
}

/// Send a create request and return (status, JSON response).
async fn create_container(proxy: std::net::SocketAddr, body: String) -> (StatusCode, Value) {
    let res = common::client()
        .post(format!("http://{proxy}/v1.43/containers/create?name=web"))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .expect("Proxy unreachable");
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn test_windows_bind_is_translated() {
    let daemon = common::start_mock_daemon().await;
    let (proxy, shutdown) = common::start_proxy(daemon.addr, registry()).await;

    let body = json!({
        "Image": "alpine",
        "HostConfig": { "Binds": [r"C:\Users\foo:/data", "cache:/cache:ro"] }
    })
    .to_string();
    let (status, echo) = create_container(proxy, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["path"], "/v1.43/containers/create?name=web");

    let forwarded = echo["body"].as_str().unwrap();
    assert_eq!(echo["content_length"], json!(forwarded.len().to_string()));
    let forwarded: Value = serde_json::from_str(forwarded).unwrap();
    assert_eq!(
        forwarded["HostConfig"]["Binds"],
        json!(["/mnt/c/Users/foo:/data", "cache:/cache:ro"])
    );
    assert_eq!(forwarded["Image"], "alpine");

    shutdown.trigger();
}

#[tokio::test]
async fn test_named_volume_body_forwarded_verbatim() {
    let daemon = common::start_mock_daemon().await;
    let (proxy, shutdown) = common::start_proxy(daemon.addr, registry()).await;

    let body = r#"{ "Image": "alpine", "HostConfig": { "Binds": ["myvolume:/data"] } }"#;
    let (status, echo) = create_container(proxy, body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(echo["body"], body);
    assert_eq!(echo["content_length"], json!(body.len().to_string()));

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_body_is_rejected_before_forwarding() {
    let daemon = common::start_mock_daemon().await;
    let (proxy, shutdown) = common::start_proxy(daemon.addr, registry()).await;

    let (status, error) = create_container(proxy, "{\"HostConfig\": ".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = error["message"].as_str().unwrap();
    assert!(message.starts_with("could not decode request body"), "{message}");
    assert_eq!(daemon.hits(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_untranslatable_bind_aborts_request() {
    let daemon = common::start_mock_daemon().await;
    let (proxy, shutdown) = common::start_proxy(daemon.addr, registry()).await;

    let body = json!({
        "HostConfig": { "Binds": [r"C:\ok:/a", r"\\server\share:/b"] }
    })
    .to_string();
    let (status, error) = create_container(proxy, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = error["message"].as_str().unwrap();
    assert!(message.contains(r"\\server\share"), "{message}");
    assert!(message.contains("bind 1"), "{message}");
    assert_eq!(daemon.hits(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_is_payload_too_large() {
    let daemon = common::start_mock_daemon().await;
    let config = MungingConfig {
        max_body_bytes: 64,
        ..MungingConfig::default()
    };
    let registry = default_registry(&config).unwrap();
    let (proxy, shutdown) = common::start_proxy(daemon.addr, registry).await;

    let body = json!({
        "Image": "alpine",
        "Env": ["PADDING=".to_string() + &"x".repeat(256)],
        "HostConfig": { "Binds": [r"C:\data:/data"] }
    })
    .to_string();
    let (status, error) = create_container(proxy, body).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let message = error["message"].as_str().unwrap();
    assert_eq!(message, "request body exceeds 64 bytes");
    assert_eq!(daemon.hits(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unmunged_requests_pass_through() {
    let daemon = common::start_mock_daemon().await;
    let (proxy, shutdown) = common::start_proxy(daemon.addr, registry()).await;

    let res = common::client()
        .get(format!("http://{proxy}/v1.43/containers/json?all=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("x-request-id").is_some());

    let echo: Value = res.json().await.unwrap();
    assert_eq!(echo["method"], "GET");
    assert_eq!(echo["path"], "/v1.43/containers/json?all=1");
    assert_eq!(daemon.hits(), 1);

    shutdown.trigger();
}

/// Adds the captured container id and request id to inspect responses.
struct TagInspect;

#[async_trait]
impl Munger<Response<Body>> for TagInspect {
    fn name(&self) -> &'static str {
        "tag_inspect"
    }

    async fn munge(
        &self,
        resp: &mut Response<Body>,
        context: &mut RequestContext,
        params: &TemplateParams,
    ) -> Result<(), MungeError> {
        let (mut value, _): (Value, _) = read_json(resp, 1 << 20).await?;
        value["MungedId"] = json!(params["id"]);
        value["RequestId"] = json!(context.request_id());
        replace_json(resp, &value)?;
        Ok(())
    }
}

#[tokio::test]
async fn test_response_munger_rewrites_body() {
    let daemon = common::start_mock_daemon().await;
    let mut registry = registry();
    registry
        .register_response(Method::GET, "/containers/{id}/json", Arc::new(TagInspect))
        .unwrap();
    let (proxy, shutdown) = common::start_proxy(daemon.addr, registry).await;

    let res = common::client()
        .get(format!("http://{proxy}/v1.41/containers/abc123/json"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let request_id = res
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let length: usize = res
        .headers()
        .get("content-length")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    let bytes = res.bytes().await.unwrap();
    assert_eq!(length, bytes.len());

    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["MungedId"], "abc123");
    assert_eq!(value["RequestId"], json!(request_id));
    assert_eq!(value["path"], "/v1.41/containers/abc123/json");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_daemon_is_bad_gateway() {
    // Reserve a port, then free it so nothing is listening there.
    let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let daemon_addr = unused.local_addr().unwrap();
    drop(unused);

    let (proxy, shutdown) = common::start_proxy(daemon_addr, registry()).await;

    let res = common::client()
        .get(format!("http://{proxy}/_ping"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let error: Value = res.json().await.unwrap();
    assert!(error["message"]
        .as_str()
        .unwrap()
        .starts_with("daemon request failed"));

    shutdown.trigger();
}
