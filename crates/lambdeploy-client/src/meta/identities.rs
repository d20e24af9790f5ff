//! Users and groups.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use super::MetaClient;
use crate::error::Result;
use crate::http::urlencode;
use crate::lookup::find_by_name;
use crate::model::Resource;

impl MetaClient {
    pub async fn create_user<B: Serialize + ?Sized>(
        &self,
        parent_org: &Resource,
        username: &str,
        account: &B,
    ) -> Result<Resource> {
        info!("Creating user {}/{}", parent_org.fqon(), username);
        self.create(&format!("/{}/users", parent_org.fqon()), account)
            .await
    }

    pub async fn find_user(&self, parent_org: &Resource, username: &str) -> Result<Option<Resource>> {
        info!("Searching for user {}/{}", parent_org.fqon(), username);
        let users: Vec<Resource> = self
            .list(&format!(
                "/{}/users/search?username={}",
                parent_org.fqon(),
                urlencode(username)
            ))
            .await?;
        Ok(find_by_name(users, username))
    }

    pub async fn delete_user(&self, parent_org: &Resource, user: &Resource) -> Result<()> {
        info!("Deleting user {}/{}", parent_org.fqon(), user.display());
        self.delete(&format!("/{}/users/{}", parent_org.fqon(), user.id))
            .await?;
        Ok(())
    }

    pub async fn create_group(
        &self,
        parent_org: &Resource,
        name: &str,
        description: &str,
    ) -> Result<Resource> {
        info!("Creating group {}/{}", parent_org.name, name);
        self.create(
            &format!("/{}/groups", parent_org.fqon()),
            &json!({ "name": name, "description": description }),
        )
        .await
    }

    pub async fn find_group(&self, parent_org: &Resource, name: &str) -> Result<Option<Resource>> {
        info!("Searching for group {}/{}", parent_org.fqon(), name);
        let groups: Vec<Resource> = self
            .list(&format!(
                "/{}/groups/search?name={}",
                parent_org.fqon(),
                urlencode(name)
            ))
            .await?;
        Ok(find_by_name(groups, name))
    }

    pub async fn delete_group(&self, parent_org: &Resource, group: &Resource) -> Result<()> {
        info!("Deleting group {}/{}", parent_org.fqon(), group.display());
        self.delete(&format!("/{}/groups/{}", parent_org.fqon(), group.id))
            .await?;
        Ok(())
    }

    pub async fn add_user_to_group(
        &self,
        parent_org: &Resource,
        group: &Resource,
        user: &Resource,
    ) -> Result<()> {
        info!("Adding user {} to group {}", user.name, group.name);
        self.request(
            reqwest::Method::PATCH,
            &format!(
                "/{}/groups/{}/users?id={}",
                parent_org.fqon(),
                group.id,
                user.id
            ),
            None,
        )
        .await?;
        Ok(())
    }
}
