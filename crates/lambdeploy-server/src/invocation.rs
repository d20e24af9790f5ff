//! Invocation payload, response envelope and the request-scoped context
//! every flow runs against.

use axum::http::StatusCode;
use lambdeploy_client::{GitlabClient, MetaClient, MetaCredentials};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{DeployerConfig, non_empty};
use crate::error::{DeployError, ErrorKind};
use crate::journal::Journal;

const SHORT_SHA_LEN: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Deploy,
    Stop,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Stop => "stop",
        }
    }
}

/// Body of an invocation.
///
/// `runtime`, `lambda_url` and `git_sha` are only needed to deploy, `git_env`
/// only when the GitLab callback is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationPayload {
    #[serde(default)]
    pub action: Action,
    pub file: String,
    pub env_id: String,
    pub api: String,
    pub project: String,
    pub git_ref: String,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub lambda_url: Option<String>,
    #[serde(default)]
    pub git_sha: Option<String>,
    #[serde(default)]
    pub git_env: Option<String>,
    /// GitLab `path_with_namespace`; defaults to `project`
    #[serde(default)]
    pub project_path: Option<String>,
    /// Overrides the configured management API URL
    #[serde(default)]
    pub meta_url: Option<String>,
}

impl InvocationPayload {
    pub fn from_slice(body: &[u8]) -> Result<Self, DeployError> {
        serde_json::from_slice(body).map_err(|e| DeployError::InvalidPayload(e.to_string()))
    }

    pub fn from_value(value: Value) -> Result<Self, DeployError> {
        serde_json::from_value(value).map_err(|e| DeployError::InvalidPayload(e.to_string()))
    }

    /// `project/git_ref/file`, the name shared by the lambda and its endpoint.
    pub fn lambda_name(&self) -> String {
        lambda_name(&self.project, &self.git_ref, &self.file)
    }

    pub fn project_path(&self) -> &str {
        self.project_path.as_deref().unwrap_or(&self.project)
    }
}

pub fn lambda_name(project: &str, git_ref: &str, file: &str) -> String {
    format!("{project}/{git_ref}/{file}")
}

/// First eight characters of a commit sha, or all of it when shorter.
pub fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(SHORT_SHA_LEN) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LambdaChange {
    Created,
    Patched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointChange {
    #[serde(rename = "created")]
    Created,
    #[serde(rename = "already existed")]
    AlreadyExisted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployOutcome {
    pub lambda: LambdaChange,
    pub lambda_id: String,
    pub api_endpoint: EndpointChange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_gitlab_environment: Option<String>,
}

/// Empty when there was nothing to tear down.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status the envelope is served with
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_status: Option<u16>,
}

impl From<&DeployError> for ErrorDetail {
    fn from(err: &DeployError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            status: err.status_code().as_u16(),
            remote_status: err.remote_status(),
        }
    }
}

/// Single response shape for success and failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeployOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopOutcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    #[serde(default)]
    pub log: Vec<String>,
}

impl InvocationResponse {
    pub fn deployed(outcome: DeployOutcome, journal: Journal) -> Self {
        let (log, warnings) = journal.into_parts();
        Self {
            status: Status::Ok,
            action: Some(Action::Deploy),
            deploy: Some(outcome),
            stop: None,
            warnings,
            error: None,
            log,
        }
    }

    pub fn stopped(outcome: StopOutcome, journal: Journal) -> Self {
        let (log, warnings) = journal.into_parts();
        Self {
            status: Status::Ok,
            action: Some(Action::Stop),
            deploy: None,
            stop: Some(outcome),
            warnings,
            error: None,
            log,
        }
    }

    pub fn failed(action: Option<Action>, err: &DeployError, journal: Journal) -> Self {
        let (log, warnings) = journal.into_parts();
        Self {
            status: Status::Error,
            action,
            deploy: None,
            stop: None,
            warnings,
            error: Some(ErrorDetail::from(err)),
            log,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn http_status(&self) -> StatusCode {
        self.error
            .as_ref()
            .and_then(|e| StatusCode::from_u16(e.status).ok())
            .unwrap_or(StatusCode::OK)
    }
}

/// Everything one invocation needs, resolved up front.
pub struct Invocation<'a> {
    pub config: &'a DeployerConfig,
    pub journal: &'a Journal,
    pub meta: MetaClient,
    /// Present when the GitLab callback is enabled
    pub gitlab: Option<GitlabClient>,
    pub target_org: String,
    pub provider_id: String,
}

impl<'a> Invocation<'a> {
    /// Resolve URLs, credentials and targets.
    ///
    /// Fails with [`DeployError::Configuration`] before any remote call when
    /// a required setting is missing.
    pub fn prepare(
        config: &'a DeployerConfig,
        payload: &InvocationPayload,
        caller_authorization: Option<&str>,
        journal: &'a Journal,
    ) -> Result<Self, DeployError> {
        let meta_url = payload
            .meta_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .or_else(|| non_empty(&config.meta.url))
            .ok_or_else(|| missing("meta.url (META_URL)"))?;

        let credentials = resolve_credentials(config, caller_authorization)?;
        journal.debug(format!("Using management API credentials {credentials:?}"));

        let target_org = non_empty(&config.target.org)
            .ok_or_else(|| missing("target.org (TARGET_ORG)"))?
            .to_string();
        let provider_id = non_empty(&config.target.lambda_provider_id)
            .ok_or_else(|| missing("target.lambda_provider_id (LAMBDA_PROVIDER_ID)"))?
            .to_string();

        let meta = MetaClient::new(meta_url, &credentials)?;
        journal.info(format!("[init] found meta: {}", meta.base_url()));

        let gitlab = match non_empty(&config.gitlab.api_url) {
            Some(api_url) => {
                let token = non_empty(&config.gitlab.token)
                    .ok_or_else(|| missing("gitlab.token (GITLAB_TOKEN)"))?;
                if non_empty(&config.gateway.url).is_none() {
                    return Err(missing("gateway.url (API_GATEWAY_URL)"));
                }
                Some(GitlabClient::new(api_url, token)?)
            }
            None => None,
        };

        Ok(Self {
            config,
            journal,
            meta,
            gitlab,
            target_org,
            provider_id,
        })
    }

    /// Gateway base URL without a trailing slash.
    pub fn gateway_url(&self) -> Option<&str> {
        non_empty(&self.config.gateway.url).map(|u| u.trim_end_matches('/'))
    }
}

/// Caller header, then configured token, then configured key and secret.
pub fn resolve_credentials(
    config: &DeployerConfig,
    caller_authorization: Option<&str>,
) -> Result<MetaCredentials, DeployError> {
    if let Some(header) = caller_authorization.map(str::trim).filter(|h| !h.is_empty()) {
        return Ok(MetaCredentials::Header(header.to_string()));
    }
    if let Some(token) = non_empty(&config.meta.token) {
        return Ok(MetaCredentials::Bearer(token.to_string()));
    }
    match (non_empty(&config.meta.api_key), non_empty(&config.meta.api_secret)) {
        (Some(key), Some(secret)) => Ok(MetaCredentials::Basic {
            key: key.to_string(),
            secret: secret.to_string(),
        }),
        _ => Err(missing(
            "meta credentials (META_TOKEN, or API_KEY and API_SECRET)",
        )),
    }
}

fn missing(what: &str) -> DeployError {
    DeployError::Configuration(format!("{what} is not set"))
}
