mod common;

use common::{FakeMeta, config, payload_json};
use lambdeploy_server::{DeployerConfig, build_app};
use serde_json::Value;
use tokio::task::JoinHandle;

async fn start_server(cfg: &DeployerConfig) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(cfg);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

#[tokio::test]
async fn server_endpoints_work() {
    let (base, shutdown_tx, handle) = start_server(&DeployerConfig::default()).await;
    let client = reqwest::Client::new();

    // GET /
    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "Lambdeploy");
    assert_eq!(body["status"], "ok");

    // GET /healthz
    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    // POST /invoke with a body that is not JSON
    let resp = client
        .post(format!("{base}/invoke"))
        .body("file=f.py")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["kind"], "invalid_payload");
    assert!(body.get("action").is_none());

    // POST /invoke without any management API configured
    let resp = client
        .post(format!("{base}/invoke"))
        .json(&payload_json())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["kind"], "configuration");
    assert_eq!(body["action"], "deploy");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn invoke_deploys_and_forwards_authorization() {
    let meta = FakeMeta::start().await;
    let (base, shutdown_tx, handle) = start_server(&config(&meta.uri())).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/invoke"))
        .header("authorization", "Bearer ci-job")
        .json(&payload_json())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["action"], "deploy");
    assert_eq!(body["deploy"]["lambda"], "created");
    assert_eq!(body["deploy"]["api_endpoint"], "created");
    assert!(body["log"].as_array().is_some_and(|l| !l.is_empty()));

    let requests = meta.requests().await;
    assert!(requests.iter().all(|r| {
        r.headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer ci-job")
    }));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn invoke_reports_missing_org_as_not_found() {
    let meta = FakeMeta::start_empty().await;
    let (base, shutdown_tx, handle) = start_server(&config(&meta.uri())).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/invoke"))
        .json(&payload_json())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["kind"], "not_found");
    assert!(meta.mutating_calls().await.is_empty());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
