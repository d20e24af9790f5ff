use super::Targets;
use crate::error::DeployError;
use crate::invocation::{Invocation, StopOutcome};

/// Delete every endpoint bound to the lambda, then the lambda.
///
/// A lambda that does not exist is not an error. Deletions are not rolled
/// back when a later one fails.
pub async fn stop(
    inv: &Invocation<'_>,
    targets: &Targets,
    lambda_name: &str,
) -> Result<StopOutcome, DeployError> {
    let journal = inv.journal;
    journal.info("***** begin stop ************");
    journal.info(format!("Will delete lambda {lambda_name}"));

    let Some(lambda) = inv
        .meta
        .find_lambda_by_name(&targets.org, &targets.environment, lambda_name)
        .await?
    else {
        journal.info(format!("Did not find any deployments matching {lambda_name}"));
        return Ok(StopOutcome::default());
    };

    journal.info("Listing endpoints for lambda");
    let endpoints = inv
        .meta
        .list_lambda_endpoints(&targets.org, &lambda)
        .await?;

    let mut deleted = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        journal.info(format!("Deleting api endpoint {}", endpoint.name));
        inv.meta.delete_endpoint(&targets.org, &endpoint).await?;
        deleted.push(endpoint.name);
    }

    journal.info(format!("Deleting lambda {}", lambda.display()));
    inv.meta
        .delete_lambda(&targets.org, &targets.environment, &lambda)
        .await?;

    journal.info("***** done stop ************");
    Ok(StopOutcome {
        lambda_name: Some(lambda_name.to_string()),
        endpoints: Some(deleted),
    })
}
