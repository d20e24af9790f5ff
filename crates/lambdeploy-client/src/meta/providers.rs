use json_patch::Patch;
use serde::Serialize;
use tracing::info;

use super::MetaClient;
use crate::error::Result;
use crate::model::{ProviderType, Resource};

impl MetaClient {
    pub async fn create_provider<B: Serialize + ?Sized>(
        &self,
        parent_org: &Resource,
        name: &str,
        payload: &B,
    ) -> Result<Resource> {
        info!("Creating provider {}", name);
        self.create(&format!("/{}/providers", parent_org.fqon()), payload)
            .await
    }

    pub async fn list_providers(
        &self,
        org: &Resource,
        provider_type: Option<ProviderType>,
    ) -> Result<Vec<Resource>> {
        let mut path = format!("/{}/providers?expand=true", org.fqon());
        if let Some(provider_type) = provider_type {
            path.push_str("&type=");
            path.push_str(provider_type.as_str());
        }
        self.list(&path).await
    }

    pub async fn find_provider(
        &self,
        parent_org: &Resource,
        provider_id: &str,
    ) -> Result<Option<Resource>> {
        self.get(&format!("/{}/providers/{}", parent_org.fqon(), provider_id))
            .await
    }

    pub async fn redeploy_provider(&self, parent_org: &Resource, provider: &Resource) -> Result<()> {
        info!("Redeploying provider {}", provider.display());
        self.request(
            reqwest::Method::POST,
            &format!("/{}/providers/{}/redeploy", parent_org.fqon(), provider.id),
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn patch_provider(
        &self,
        parent_org: &Resource,
        provider: &Resource,
        patch: &Patch,
    ) -> Result<Option<Resource>> {
        info!("Patching provider {}", provider.display());
        self.patch(
            &format!("/{}/providers/{}", parent_org.fqon(), provider.id),
            patch,
        )
        .await
    }
}
