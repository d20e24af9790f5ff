//! Entitlement updates, dispatched concurrently.

use reqwest::Method;
use serde_json::json;
use tracing::info;

use super::{Dispatched, MetaClient, join_ordered};
use crate::error::Result;
use crate::http::ResponseBody;
use crate::lookup::find_by;
use crate::model::{Resource, resource_type};

impl MetaClient {
    /// Grant `identity` the entitlements named by `actions` on `resource`.
    ///
    /// One PUT is dispatched per entitlement that needs the identity; all of
    /// them run concurrently and are joined in the order of `actions`.
    /// Entitlements that are missing or already hold the identity are
    /// skipped and yield `None`.
    pub async fn add_entitlements(
        &self,
        base_org: &Resource,
        resource: &Resource,
        actions: &[&str],
        identity: &Resource,
    ) -> Result<Vec<Option<Resource>>> {
        let entitlements: Vec<Resource> = self
            .list(&format!(
                "/{}/resources/{}/entitlements?expand=true",
                base_org.fqon(),
                resource.id
            ))
            .await?;

        let mut handles: Vec<Dispatched> = Vec::with_capacity(actions.len());
        for action in actions {
            let Some(entitlement) = find_by(&entitlements, |e| e.action() == Some(*action)) else {
                info!(
                    "Could not locate entitlement {} on resource {}",
                    action,
                    resource.display()
                );
                handles.push(tokio::spawn(async { Ok(None) }));
                continue;
            };

            let mut identities = entitlement.identity_ids();
            if identities.contains(&identity.id) {
                info!(
                    "Entitlement {}[{}] already contains identity {}",
                    resource.name,
                    action,
                    identity.display()
                );
                handles.push(tokio::spawn(async { Ok(None) }));
                continue;
            }
            identities.push(identity.id.clone());

            let updated = json!({
                "id": entitlement.id,
                "name": entitlement.name,
                "properties": {
                    "action": entitlement.action(),
                    "identities": identities
                }
            });
            info!(
                "Updating entitlement {}[{}] with identity {}",
                resource.name,
                action,
                identity.display()
            );
            handles.push(self.dispatch(
                Method::PUT,
                entitlement_path(base_org, resource, &entitlement.id),
                Some(updated),
            ));
        }

        join_ordered(handles)
            .await?
            .into_iter()
            .map(|body| body.map(ResponseBody::decode).transpose())
            .collect()
    }
}

/// Where an entitlement lives depends on the kind of resource it guards.
fn entitlement_path(base_org: &Resource, resource: &Resource, entitlement_id: &str) -> String {
    match resource.resource_type.as_deref() {
        Some(resource_type::ENVIRONMENT) => format!(
            "/{}/environments/{}/entitlements/{}",
            base_org.fqon(),
            resource.id,
            entitlement_id
        ),
        Some(resource_type::WORKSPACE) => format!(
            "/{}/workspaces/{}/entitlements/{}",
            base_org.fqon(),
            resource.id,
            entitlement_id
        ),
        Some(resource_type::ORGANIZATION) => {
            format!("/{}/entitlements/{}", resource.fqon(), entitlement_id)
        }
        _ => format!("/{}/entitlements/{}", base_org.fqon(), entitlement_id),
    }
}
