use lambdeploy_client::{ApiEndpointSpec, ClientError, LambdaSpec, Resource};

use super::{Targets, publish_external_url};
use crate::error::DeployError;
use crate::invocation::{
    DeployOutcome, EndpointChange, Invocation, InvocationPayload, LambdaChange, short_sha,
};

/// Deploy inputs, checked before any remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployRequest {
    pub lambda_name: String,
    pub description: String,
    pub file: String,
    pub runtime: String,
    pub lambda_url: String,
    pub project_path: String,
    pub git_env: Option<String>,
}

impl DeployRequest {
    pub fn from_payload(
        payload: &InvocationPayload,
        gitlab_enabled: bool,
    ) -> Result<Self, DeployError> {
        let runtime = required(&payload.runtime, "runtime")?;
        let lambda_url = required(&payload.lambda_url, "lambda_url")?;
        let git_sha = required(&payload.git_sha, "git_sha")?;
        let git_env = payload.git_env.clone().filter(|e| !e.is_empty());
        if gitlab_enabled && git_env.is_none() {
            return Err(DeployError::InvalidPayload(
                "git_env is required when the GitLab callback is enabled".into(),
            ));
        }

        Ok(Self {
            lambda_name: payload.lambda_name(),
            description: format!(
                "deploy by gitlab, ref {}, sha {}",
                payload.git_ref,
                short_sha(git_sha)
            ),
            file: payload.file.clone(),
            runtime: runtime.to_string(),
            lambda_url: lambda_url.to_string(),
            project_path: payload.project_path().to_string(),
            git_env,
        })
    }

    pub fn lambda_spec(&self, provider_id: &str) -> LambdaSpec {
        LambdaSpec::package(
            self.lambda_name.as_str(),
            self.description.as_str(),
            provider_id,
            self.lambda_url.as_str(),
            self.file.as_str(),
            self.runtime.as_str(),
        )
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, DeployError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DeployError::InvalidPayload(format!("`{field}` is required to deploy")))
}

/// Create or patch the lambda, make sure an endpoint exists for it, then
/// publish the external URL to GitLab when enabled.
pub async fn deploy(
    inv: &Invocation<'_>,
    targets: &Targets,
    request: &DeployRequest,
) -> Result<DeployOutcome, DeployError> {
    let journal = inv.journal;
    journal.info(format!("Will deploy lambda {}", request.lambda_name));

    let spec = request.lambda_spec(&inv.provider_id);
    journal.debug(format!(
        "lambda update/create payload: {}",
        serde_json::to_string(&spec)?
    ));

    let (lambda, change) = reconcile_lambda(inv, targets, &spec).await?;
    journal.info(format!("Lambda {} has id {}", lambda.name, lambda.id));

    let (endpoint, api_endpoint) = reconcile_endpoint(inv, targets, &lambda).await?;

    let mut outcome = DeployOutcome {
        lambda: change,
        lambda_id: lambda.id.clone(),
        api_endpoint,
        external_url: None,
        project_url: None,
        gitlab_env: None,
        update_gitlab_environment: None,
    };

    if let Some(gateway) = inv.gateway_url() {
        let resource = endpoint
            .resource_path()
            .map(str::to_string)
            .unwrap_or_else(|| format!("/{}", request.lambda_name));
        let external_url = format!("{gateway}/{}{resource}", targets.api.name);
        journal.info(format!("using URL {external_url}"));
        outcome.external_url = Some(external_url);
    }

    match (&inv.gitlab, outcome.external_url.clone(), &request.git_env) {
        (Some(gitlab), Some(external_url), Some(git_env)) => {
            publish_external_url(
                inv.journal,
                gitlab,
                &request.project_path,
                git_env,
                &external_url,
                &mut outcome,
            )
            .await?;
        }
        _ => journal.info("Skipping GitLab update since GITLAB_API_URL is not defined."),
    }

    journal.info("***** done ************");
    Ok(outcome)
}

async fn reconcile_lambda(
    inv: &Invocation<'_>,
    targets: &Targets,
    spec: &LambdaSpec,
) -> Result<(Resource, LambdaChange), DeployError> {
    let existing = inv
        .meta
        .find_lambda_by_name(&targets.org, &targets.environment, &spec.name)
        .await?;

    match existing {
        Some(lambda) => {
            let patch = spec.redeploy_patch().map_err(ClientError::from)?;
            inv.journal.info(format!("Patching lambda {}", lambda.display()));
            let patched = inv
                .meta
                .patch_lambda(&targets.org, &targets.environment, &lambda, &patch)
                .await?;
            Ok((patched.unwrap_or(lambda), LambdaChange::Patched))
        }
        None => {
            inv.journal.info(format!("Creating lambda {}", spec.name));
            let created = inv
                .meta
                .create_lambda(&targets.org, &targets.environment, spec)
                .await?;
            Ok((created, LambdaChange::Created))
        }
    }
}

/// An existing endpoint is never rebound, even when it targets another lambda.
async fn reconcile_endpoint(
    inv: &Invocation<'_>,
    targets: &Targets,
    lambda: &Resource,
) -> Result<(Resource, EndpointChange), DeployError> {
    let existing = inv
        .meta
        .find_endpoint_by_name(&targets.org, &targets.api, &lambda.name)
        .await?;

    match existing {
        Some(endpoint) => {
            match endpoint.implementation_id() {
                Some(bound) if bound != lambda.id => inv.journal.warn(format!(
                    "ApiEndpoint {} is bound to lambda {} instead of {}; left intact, needs review",
                    endpoint.display(),
                    bound,
                    lambda.id
                )),
                _ => inv.journal.warn(format!(
                    "ApiEndpoint {} already existed, will leave it intact",
                    endpoint.display()
                )),
            }
            Ok((endpoint, EndpointChange::AlreadyExisted))
        }
        None => {
            let created = inv
                .meta
                .create_endpoint(&targets.org, &targets.api, &ApiEndpointSpec::for_lambda(lambda))
                .await?;
            inv.journal.info(format!(
                "Created api-endpoint for lambda with id {}",
                created.id
            ));
            Ok((created, EndpointChange::Created))
        }
    }
}
