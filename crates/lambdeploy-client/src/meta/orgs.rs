use serde_json::json;
use tracing::info;

use super::MetaClient;
use crate::error::Result;
use crate::model::{EnvironmentType, Resource};

impl MetaClient {
    // ============================================================================
    // Organizations
    // ============================================================================

    pub async fn create_org(
        &self,
        parent_org: &Resource,
        name: &str,
        description: &str,
    ) -> Result<Resource> {
        info!("Creating org {}/{}", parent_org.name, name);
        let payload = json!({ "description": description, "name": name });
        self.create(&format!("/{}", parent_org.fqon()), &payload).await
    }

    pub async fn find_org(&self, fqon: &str) -> Result<Option<Resource>> {
        self.get(&format!("/{fqon}")).await
    }

    pub async fn delete_org(&self, org: &Resource, force: bool) -> Result<()> {
        info!("Deleting org {}", org.fqon());
        self.delete(&format!("/{}?force={force}", org.fqon()))
            .await?;
        Ok(())
    }

    // ============================================================================
    // Workspaces
    // ============================================================================

    pub async fn create_workspace(
        &self,
        parent_org: &Resource,
        name: &str,
        description: &str,
    ) -> Result<Resource> {
        info!("Creating workspace {}/{}", parent_org.name, name);
        let payload = json!({ "description": description, "name": name });
        self.create(&format!("/{}/workspaces", parent_org.fqon()), &payload)
            .await
    }

    // ============================================================================
    // Environments
    // ============================================================================

    pub async fn create_environment(
        &self,
        parent_org: &Resource,
        parent_workspace: &Resource,
        name: &str,
        description: &str,
        environment_type: EnvironmentType,
    ) -> Result<Resource> {
        info!("Creating environment {}/{}", parent_workspace.name, name);
        let payload = json!({
            "description": description,
            "name": name,
            "properties": { "environment_type": environment_type }
        });
        self.create(
            &format!(
                "/{}/workspaces/{}/environments",
                parent_org.fqon(),
                parent_workspace.id
            ),
            &payload,
        )
        .await
    }

    pub async fn find_environment(
        &self,
        parent_org: &Resource,
        environment_id: &str,
    ) -> Result<Option<Resource>> {
        self.get(&format!(
            "/{}/environments/{}",
            parent_org.fqon(),
            environment_id
        ))
        .await
    }
}
