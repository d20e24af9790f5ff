use serde::Serialize;
use tracing::info;

use super::MetaClient;
use crate::error::Result;
use crate::lookup::find_by_name;
use crate::model::{ApiEndpointSpec, Resource, replace_ops};

impl MetaClient {
    // ============================================================================
    // APIs
    // ============================================================================

    pub async fn create_api<B: Serialize + ?Sized>(
        &self,
        parent_org: &Resource,
        parent_env: &Resource,
        name: &str,
        payload: &B,
    ) -> Result<Resource> {
        info!(
            "Creating api {} in {}/environments/{}",
            name,
            parent_org.fqon(),
            parent_env.id
        );
        self.create(
            &format!("/{}/environments/{}/apis", parent_org.fqon(), parent_env.id),
            payload,
        )
        .await
    }

    pub async fn find_api(&self, parent_org: &Resource, api_id: &str) -> Result<Option<Resource>> {
        self.get(&format!("/{}/apis/{}", parent_org.fqon(), api_id))
            .await
    }

    pub async fn find_api_by_name(
        &self,
        parent_org: &Resource,
        parent_env: &Resource,
        name: &str,
    ) -> Result<Option<Resource>> {
        let path = format!(
            "/{}/environments/{}/apis?expand=true",
            parent_org.fqon(),
            parent_env.id
        );
        let apis: Vec<Resource> = self.list(&path).await?;
        Ok(find_by_name(apis, name))
    }

    // ============================================================================
    // API endpoints
    // ============================================================================

    pub async fn create_endpoint(
        &self,
        parent_org: &Resource,
        parent_api: &Resource,
        spec: &ApiEndpointSpec,
    ) -> Result<Resource> {
        info!(
            "Creating apiendpoint {} in {}/apis/{}",
            spec.name,
            parent_org.fqon(),
            parent_api.id
        );
        self.create(&endpoints_path(parent_org, parent_api), spec)
            .await
    }

    pub async fn find_endpoint_by_name(
        &self,
        parent_org: &Resource,
        parent_api: &Resource,
        name: &str,
    ) -> Result<Option<Resource>> {
        let path = format!("{}?expand=true", endpoints_path(parent_org, parent_api));
        let endpoints: Vec<Resource> = self.list(&path).await?;
        Ok(find_by_name(endpoints, name))
    }

    pub async fn delete_endpoint(&self, parent_org: &Resource, endpoint: &Resource) -> Result<()> {
        info!(
            "Deleting endpoint {} from {}",
            endpoint.display(),
            parent_org.fqon()
        );
        self.delete(&format!(
            "/{}/apiendpoints/{}",
            parent_org.fqon(),
            endpoint.id
        ))
        .await?;
        Ok(())
    }

    /// Rebind an endpoint to another implementation.
    pub async fn update_endpoint_target(
        &self,
        org: &Resource,
        endpoint: &Resource,
        new_target: &Resource,
    ) -> Result<Option<Resource>> {
        info!(
            "Rebinding endpoint {} to {}",
            endpoint.display(),
            new_target.display()
        );
        let patch = replace_ops([(
            "/properties/implementation_id",
            serde_json::Value::String(new_target.id.clone()),
        )])?;
        self.patch(&format!("/{}/apiendpoints/{}", org.fqon(), endpoint.id), &patch)
            .await
    }
}

fn endpoints_path(org: &Resource, api: &Resource) -> String {
    format!("/{}/apis/{}/apiendpoints", org.fqon(), api.id)
}
