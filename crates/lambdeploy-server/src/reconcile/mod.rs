//! Deploy and stop flows.
//!
//! Both flows resolve the same targets first (org, environment, api) and
//! abort with [`DeployError::NotFound`] when one is missing, before any
//! mutating call.

mod callback;
mod deploy;
mod stop;

pub use callback::{publish_external_url, update_environment};
pub use deploy::{DeployRequest, deploy};
pub use stop::stop;

use lambdeploy_client::Resource;
use tracing::Instrument;

use crate::config::DeployerConfig;
use crate::error::DeployError;
use crate::invocation::{Action, Invocation, InvocationPayload, InvocationResponse};
use crate::journal::Journal;

/// Resources every flow is scoped to.
#[derive(Debug, Clone)]
pub struct Targets {
    pub org: Resource,
    pub environment: Resource,
    pub api: Resource,
}

pub async fn resolve_targets(
    inv: &Invocation<'_>,
    payload: &InvocationPayload,
) -> Result<Targets, DeployError> {
    let org = inv
        .meta
        .find_org(&inv.target_org)
        .await?
        .ok_or_else(|| DeployError::NotFound {
            kind: "org",
            name: inv.target_org.clone(),
        })?;
    inv.journal.debug(format!("Found target org {}", org.display()));

    let environment = inv
        .meta
        .find_environment(&org, &payload.env_id)
        .await?
        .ok_or_else(|| DeployError::NotFound {
            kind: "environment",
            name: payload.env_id.clone(),
        })?;
    inv.journal
        .debug(format!("Found target environment {}", environment.display()));

    let api = inv
        .meta
        .find_api_by_name(&org, &environment, &payload.api)
        .await?
        .ok_or_else(|| DeployError::NotFound {
            kind: "api",
            name: payload.api.clone(),
        })?;
    inv.journal.debug(format!("Found target api {}", api.display()));

    Ok(Targets {
        org,
        environment,
        api,
    })
}

/// Run one invocation end to end and fold the outcome into the envelope.
///
/// `caller_authorization` is a complete `Authorization` header value to use
/// against the management API instead of the configured credentials.
pub async fn invoke(
    config: &DeployerConfig,
    payload: InvocationPayload,
    caller_authorization: Option<&str>,
) -> InvocationResponse {
    let span = tracing::info_span!(
        "invocation",
        action = payload.action.as_str(),
        lambda_name = %payload.lambda_name(),
    );
    let journal = Journal::new(config.logging.debug_journal);
    let action = payload.action;

    let result = run(config, &payload, caller_authorization, &journal)
        .instrument(span)
        .await;

    match result {
        Ok(Outcome::Deployed(outcome)) => InvocationResponse::deployed(outcome, journal),
        Ok(Outcome::Stopped(outcome)) => InvocationResponse::stopped(outcome, journal),
        Err(err) => {
            journal.error(err.to_string());
            InvocationResponse::failed(Some(action), &err, journal)
        }
    }
}

/// Same as [`invoke`], for a raw JSON body. A body that does not parse is
/// reported as `invalid_payload`.
pub async fn invoke_json(
    config: &DeployerConfig,
    body: &[u8],
    caller_authorization: Option<&str>,
) -> InvocationResponse {
    match InvocationPayload::from_slice(body) {
        Ok(payload) => invoke(config, payload, caller_authorization).await,
        Err(err) => {
            let journal = Journal::new(config.logging.debug_journal);
            journal.error(err.to_string());
            InvocationResponse::failed(None, &err, journal)
        }
    }
}

enum Outcome {
    Deployed(crate::invocation::DeployOutcome),
    Stopped(crate::invocation::StopOutcome),
}

async fn run(
    config: &DeployerConfig,
    payload: &InvocationPayload,
    caller_authorization: Option<&str>,
    journal: &Journal,
) -> Result<Outcome, DeployError> {
    // Checked before anything touches the network.
    let request = match payload.action {
        Action::Deploy => Some(DeployRequest::from_payload(payload, config.gitlab_enabled())?),
        Action::Stop => None,
    };
    let inv = Invocation::prepare(config, payload, caller_authorization, journal)?;
    let targets = resolve_targets(&inv, payload).await?;

    match request {
        Some(request) => deploy(&inv, &targets, &request).await.map(Outcome::Deployed),
        None => stop(&inv, &targets, &payload.lambda_name())
            .await
            .map(Outcome::Stopped),
    }
}
