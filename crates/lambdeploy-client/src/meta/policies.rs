use serde_json::{Value, json};
use tracing::info;

use super::MetaClient;
use crate::error::Result;
use crate::model::{Resource, resource_type};

/// Condition evaluated by a limit rule, e.g. `container.cpus <= 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitCondition {
    pub property: String,
    pub operator: String,
    pub value: Value,
}

impl MetaClient {
    pub async fn create_policy(
        &self,
        base_org: &Resource,
        environment: &Resource,
        name: &str,
        description: Option<&str>,
    ) -> Result<Resource> {
        info!("creating new policy in {}", environment.name);
        self.create(
            &format!(
                "/{}/environments/{}/policies",
                base_org.fqon(),
                environment.id
            ),
            &json!({
                "name": name,
                "description": description.unwrap_or_default(),
                "properties": {}
            }),
        )
        .await
    }

    /// Rule that runs `lambda_id` when one of `actions` fires.
    pub async fn create_event_rule(
        &self,
        base_org: &Resource,
        policy: &Resource,
        name: &str,
        description: Option<&str>,
        lambda_id: &str,
        actions: &[&str],
    ) -> Result<Resource> {
        info!("creating new event rule in {}", policy.name);
        self.create(
            &rules_path(base_org, policy),
            &json!({
                "name": name,
                "description": description.unwrap_or_default(),
                "properties": {
                    "parent": {},
                    "lambda": lambda_id,
                    "actions": actions
                },
                "resource_type": resource_type::EVENT_RULE
            }),
        )
        .await
    }

    pub async fn create_limit_rule(
        &self,
        base_org: &Resource,
        policy: &Resource,
        name: &str,
        description: Option<&str>,
        actions: &[&str],
        condition: &LimitCondition,
    ) -> Result<Resource> {
        info!("creating new limit rule in {}", policy.name);
        self.create(
            &rules_path(base_org, policy),
            &json!({
                "name": name,
                "description": description.unwrap_or_default(),
                "properties": {
                    "parent": {},
                    "strict": false,
                    "actions": actions,
                    "eval_logic": {
                        "property": condition.property,
                        "operator": condition.operator,
                        "value": condition.value
                    }
                },
                "resource_type": resource_type::LIMIT_RULE
            }),
        )
        .await
    }

    /// Default container migration policy: a policy in `environment` with one
    /// event rule running `lambda` on `container.migrate.pre`.
    pub async fn create_migrate_policy(
        &self,
        base_org: &Resource,
        environment: &Resource,
        lambda: &Resource,
    ) -> Result<Resource> {
        info!("creating new migrate policy in {}", environment.name);
        let policy = self
            .create_policy(
                base_org,
                environment,
                "default-migrate-policy",
                Some("default container migration policy"),
            )
            .await?;

        info!(
            "creating migrate event rule in migrate policy {} against lambda {}",
            policy.id, lambda.id
        );
        self.create::<Resource, _>(
            &rules_path(base_org, &policy),
            &json!({
                "name": "migration-handler",
                "description": "execute migrate lambda on container.migrate.pre",
                "resource_type": resource_type::EVENT_RULE,
                "properties": {
                    "actions": ["container.migrate.pre"],
                    "eval_logic": {},
                    "lambda": lambda.id
                }
            }),
        )
        .await?;
        Ok(policy)
    }
}

fn rules_path(org: &Resource, policy: &Resource) -> String {
    format!("/{}/policies/{}/rules", org.fqon(), policy.id)
}
