#![allow(dead_code)]

//! In-memory management API on top of wiremock.
//!
//! Org, environment and api lookups are static mocks. Lambdas and endpoints
//! live in shared state so create, patch, list and delete see each other.

use std::sync::Arc;

use lambdeploy_server::{DeployerConfig, InvocationPayload};
use parking_lot::Mutex;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const ORG: &str = "acme";
pub const ENV_ID: &str = "env-1";
pub const API_ID: &str = "api-1";
pub const API_NAME: &str = "dev1";
pub const LAMBDA_NAME: &str = "p/master/f.py";

#[derive(Debug, Default)]
pub struct MetaState {
    pub lambdas: Vec<Value>,
    pub endpoints: Vec<Value>,
    next_id: u32,
}

impl MetaState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

#[derive(Clone)]
struct StatefulMeta(Arc<Mutex<MetaState>>);

fn lambdas_path() -> String {
    format!("/{ORG}/environments/{ENV_ID}/lambdas")
}

fn api_endpoints_path() -> String {
    format!("/{ORG}/apis/{API_ID}/apiendpoints")
}

fn org_endpoints_path() -> String {
    format!("/{ORG}/apiendpoints")
}

impl Respond for StatefulMeta {
    fn respond(&self, req: &Request) -> ResponseTemplate {
        let mut state = self.0.lock();
        let method = req.method.as_str();
        let path = req.url.path().to_string();

        if path == lambdas_path() {
            return match method {
                "GET" => ResponseTemplate::new(200).set_body_json(&state.lambdas),
                "POST" => {
                    let mut lambda: Value = serde_json::from_slice(&req.body).expect("lambda body");
                    lambda["id"] = json!(state.next_id("lambda"));
                    state.lambdas.push(lambda.clone());
                    ResponseTemplate::new(201).set_body_json(lambda)
                }
                _ => ResponseTemplate::new(405),
            };
        }

        if let Some(id) = path.strip_prefix(&format!("{}/", lambdas_path())) {
            let Some(index) = state.lambdas.iter().position(|l| l["id"] == id) else {
                return ResponseTemplate::new(404);
            };
            return match method {
                "PATCH" => {
                    let patch: json_patch::Patch =
                        serde_json::from_slice(&req.body).expect("patch body");
                    json_patch::patch(&mut state.lambdas[index], &patch).expect("apply patch");
                    ResponseTemplate::new(200).set_body_json(&state.lambdas[index])
                }
                "DELETE" => {
                    state.lambdas.remove(index);
                    ResponseTemplate::new(204)
                }
                _ => ResponseTemplate::new(405),
            };
        }

        if path == api_endpoints_path() {
            return match method {
                "GET" => ResponseTemplate::new(200).set_body_json(&state.endpoints),
                "POST" => {
                    let mut endpoint: Value =
                        serde_json::from_slice(&req.body).expect("endpoint body");
                    endpoint["id"] = json!(state.next_id("endpoint"));
                    state.endpoints.push(endpoint.clone());
                    ResponseTemplate::new(201).set_body_json(endpoint)
                }
                _ => ResponseTemplate::new(405),
            };
        }

        if path == org_endpoints_path() && method == "GET" {
            let implementation_id = req
                .url
                .query_pairs()
                .find(|(k, _)| k == "implementation_id")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();
            let bound: Vec<&Value> = state
                .endpoints
                .iter()
                .filter(|e| e["properties"]["implementation_id"] == implementation_id.as_str())
                .collect();
            return ResponseTemplate::new(200).set_body_json(bound);
        }

        if let Some(id) = path.strip_prefix(&format!("{}/", org_endpoints_path())) {
            if method == "DELETE" {
                let before = state.endpoints.len();
                state.endpoints.retain(|e| e["id"] != id);
                return if state.endpoints.len() < before {
                    ResponseTemplate::new(204)
                } else {
                    ResponseTemplate::new(404)
                };
            }
        }

        ResponseTemplate::new(404)
    }
}

pub struct FakeMeta {
    pub server: MockServer,
    pub state: Arc<Mutex<MetaState>>,
}

impl FakeMeta {
    /// Management API where org, environment and api all exist.
    pub async fn start() -> Self {
        let fake = Self::start_empty().await;
        Mock::given(method("GET"))
            .and(path(format!("/{ORG}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "org-1",
                "name": ORG,
                "resource_type": "Gestalt::Resource::Organization",
                "properties": { "fqon": ORG }
            })))
            .mount(&fake.server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/{ORG}/environments/{ENV_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": ENV_ID,
                "name": "dev",
                "resource_type": "Gestalt::Resource::Environment",
                "properties": { "environment_type": "development" }
            })))
            .mount(&fake.server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/{ORG}/environments/{ENV_ID}/apis")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "api-0", "name": "other", "properties": {} },
                { "id": API_ID, "name": API_NAME, "properties": {} }
            ])))
            .mount(&fake.server)
            .await;
        fake
    }

    /// Management API with lambda and endpoint state only: every other
    /// lookup, the org included, is a 404.
    pub async fn start_empty() -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(MetaState::default()));
        Mock::given(path_regex(format!(
            r"^/{ORG}/(environments/{ENV_ID}/lambdas|apis/{API_ID}/apiendpoints|apiendpoints)(/.*)?$"
        )))
        .respond_with(StatefulMeta(state.clone()))
        .mount(&server)
        .await;
        Self { server, state }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn seed_lambda(&self, name: &str, id: &str) {
        self.state.lock().lambdas.push(json!({
            "id": id,
            "name": name,
            "description": "seeded",
            "properties": {
                "provider": { "id": "prov-1", "locations": [] },
                "package_url": "https://s3.example.com/old.py",
                "handler": "old.py",
                "runtime": "nodejs",
                "memory": 512
            }
        }));
    }

    pub fn seed_endpoint(&self, name: &str, id: &str, implementation_id: &str) {
        self.state.lock().endpoints.push(json!({
            "id": id,
            "name": name,
            "properties": {
                "implementation_type": "lambda",
                "implementation_id": implementation_id,
                "resource": format!("/{name}")
            }
        }));
    }

    pub fn lambda(&self, name: &str) -> Option<Value> {
        self.state
            .lock()
            .lambdas
            .iter()
            .find(|l| l["name"] == name)
            .cloned()
    }

    pub fn lambdas(&self) -> Vec<Value> {
        self.state.lock().lambdas.clone()
    }

    pub fn endpoints(&self) -> Vec<Value> {
        self.state.lock().endpoints.clone()
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// `METHOD path` of every non-GET request, in arrival order.
    pub async fn mutating_calls(&self) -> Vec<String> {
        self.requests()
            .await
            .iter()
            .filter(|r| r.method.as_str() != "GET")
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect()
    }
}

pub fn config(meta_url: &str) -> DeployerConfig {
    let mut cfg = DeployerConfig::default();
    cfg.meta.url = Some(meta_url.to_string());
    cfg.meta.api_key = Some("key".to_string());
    cfg.meta.api_secret = Some("secret".to_string());
    cfg.target.org = Some(ORG.to_string());
    cfg.target.lambda_provider_id = Some("prov-1".to_string());
    cfg
}

pub fn payload_json() -> Value {
    json!({
        "file": "f.py",
        "runtime": "python",
        "env_id": ENV_ID,
        "api": API_NAME,
        "project": "p",
        "lambda_url": "https://s3.example.com/p/f.py",
        "git_ref": "master",
        "git_sha": "6c1ce958d57695498f30a3a82150b821c5e5f74c",
        "git_env": "review/test-1"
    })
}

pub fn deploy_payload() -> InvocationPayload {
    InvocationPayload::from_value(payload_json()).expect("payload")
}

pub fn stop_payload() -> InvocationPayload {
    let mut value = payload_json();
    value["action"] = json!("stop");
    InvocationPayload::from_value(value).expect("payload")
}
