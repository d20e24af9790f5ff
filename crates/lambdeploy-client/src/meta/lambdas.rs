use json_patch::Patch;
use tracing::info;

use super::MetaClient;
use crate::error::Result;
use crate::lookup::find_by_name;
use crate::model::{LambdaSpec, Resource};

impl MetaClient {
    pub async fn create_lambda(
        &self,
        parent_org: &Resource,
        parent_env: &Resource,
        spec: &LambdaSpec,
    ) -> Result<Resource> {
        info!("Creating lambda {}/{}", parent_env.name, spec.name);
        self.create(&lambdas_path(parent_org, parent_env), spec).await
    }

    pub async fn find_lambda_by_name(
        &self,
        parent_org: &Resource,
        parent_env: &Resource,
        name: &str,
    ) -> Result<Option<Resource>> {
        let path = format!("{}?expand=true", lambdas_path(parent_org, parent_env));
        let lambdas: Vec<Resource> = self.list(&path).await?;
        Ok(find_by_name(lambdas, name))
    }

    /// Apply a JSON Patch to a lambda. `None` when the platform answers
    /// without a body.
    pub async fn patch_lambda(
        &self,
        parent_org: &Resource,
        parent_env: &Resource,
        lambda: &Resource,
        patch: &Patch,
    ) -> Result<Option<Resource>> {
        info!(
            "Patching lambda {} using patch {}",
            lambda.display(),
            serde_json::to_string(patch)?
        );
        let path = format!("{}/{}", lambdas_path(parent_org, parent_env), lambda.id);
        self.patch(&path, patch).await
    }

    pub async fn delete_lambda(
        &self,
        parent_org: &Resource,
        parent_env: &Resource,
        lambda: &Resource,
    ) -> Result<()> {
        info!(
            "Deleting lambda {} from {}/environments/{}",
            lambda.display(),
            parent_org.fqon(),
            parent_env.id
        );
        let path = format!("{}/{}", lambdas_path(parent_org, parent_env), lambda.id);
        self.delete(&path).await?;
        Ok(())
    }

    /// Endpoints implemented by `lambda`, via the org-level reverse lookup.
    pub async fn list_lambda_endpoints(
        &self,
        org: &Resource,
        lambda: &Resource,
    ) -> Result<Vec<Resource>> {
        let path = format!(
            "/{}/apiendpoints?expand=true&implementation_type=lambda&implementation_id={}",
            org.fqon(),
            lambda.id
        );
        self.list(&path).await
    }
}

fn lambdas_path(org: &Resource, env: &Resource) -> String {
    format!("/{}/environments/{}/lambdas", org.fqon(), env.id)
}
