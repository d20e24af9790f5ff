mod common;

use common::{FakeMeta, LAMBDA_NAME, ORG, config, stop_payload};
use lambdeploy_server::invocation::{Action, Status, StopOutcome};
use lambdeploy_server::{ErrorKind, invoke};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn stop_when_absent_is_a_successful_no_op() {
    let meta = FakeMeta::start().await;

    let response = invoke(&config(&meta.uri()), stop_payload(), None).await;
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.action, Some(Action::Stop));
    assert_eq!(response.stop, Some(StopOutcome::default()));
    assert!(
        response
            .log
            .iter()
            .any(|l| l == "Did not find any deployments matching p/master/f.py")
    );
    assert!(meta.mutating_calls().await.is_empty());

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["stop"], serde_json::json!({}));
}

#[tokio::test]
async fn stop_deletes_endpoints_before_lambda() {
    let meta = FakeMeta::start().await;
    meta.seed_lambda(LAMBDA_NAME, "lambda-1");
    meta.seed_lambda("p/master/other.py", "lambda-2");
    meta.seed_endpoint(LAMBDA_NAME, "endpoint-1", "lambda-1");
    meta.seed_endpoint("p/master/f.py-alias", "endpoint-2", "lambda-1");
    meta.seed_endpoint("p/master/other.py", "endpoint-3", "lambda-2");

    let response = invoke(&config(&meta.uri()), stop_payload(), None).await;
    assert!(response.is_ok(), "{:?}", response.error);
    let outcome = response.stop.expect("stop outcome");
    assert_eq!(outcome.lambda_name.as_deref(), Some(LAMBDA_NAME));
    assert_eq!(
        outcome.endpoints,
        Some(vec![
            LAMBDA_NAME.to_string(),
            "p/master/f.py-alias".to_string()
        ])
    );

    assert_eq!(
        meta.mutating_calls().await,
        vec![
            format!("DELETE /{ORG}/apiendpoints/endpoint-1"),
            format!("DELETE /{ORG}/apiendpoints/endpoint-2"),
            format!("DELETE /{ORG}/environments/env-1/lambdas/lambda-1"),
        ]
    );
    assert!(meta.lambda(LAMBDA_NAME).is_none());
    assert!(meta.lambda("p/master/other.py").is_some());
    assert_eq!(meta.endpoints().len(), 1);
}

#[tokio::test]
async fn stop_with_no_endpoints_still_deletes_lambda() {
    let meta = FakeMeta::start().await;
    meta.seed_lambda(LAMBDA_NAME, "lambda-1");

    let response = invoke(&config(&meta.uri()), stop_payload(), None).await;
    let outcome = response.stop.expect("stop outcome");
    assert_eq!(outcome.endpoints, Some(Vec::new()));
    assert!(meta.lambdas().is_empty());
}

#[tokio::test]
async fn failed_lambda_delete_leaves_partial_teardown() {
    let meta = FakeMeta::start().await;
    meta.seed_lambda(LAMBDA_NAME, "lambda-1");
    meta.seed_endpoint(LAMBDA_NAME, "endpoint-1", "lambda-1");
    Mock::given(method("DELETE"))
        .and(path(format!("/{ORG}/environments/env-1/lambdas/lambda-1")))
        .respond_with(ResponseTemplate::new(409).set_body_string("lambda is busy"))
        .with_priority(1)
        .expect(1)
        .mount(&meta.server)
        .await;

    let response = invoke(&config(&meta.uri()), stop_payload(), None).await;
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.action, Some(Action::Stop));
    let error = response.error.expect("error detail");
    assert_eq!(error.kind, ErrorKind::Remote);
    assert_eq!(error.remote_status, Some(409));

    // Endpoint deletion is not rolled back.
    assert!(meta.endpoints().is_empty());
    assert!(meta.lambda(LAMBDA_NAME).is_some());
}

#[tokio::test]
async fn stop_does_not_need_deploy_fields() {
    let meta = FakeMeta::start().await;
    let payload = lambdeploy_server::InvocationPayload::from_value(serde_json::json!({
        "action": "stop",
        "file": "f.py",
        "env_id": common::ENV_ID,
        "api": common::API_NAME,
        "project": "p",
        "git_ref": "master"
    }))
    .unwrap();

    let response = invoke(&config(&meta.uri()), payload, None).await;
    assert!(response.is_ok(), "{:?}", response.error);
}
