//! Management API resource envelope and creation payloads.

use json_patch::Patch;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::lookup::Named;

/// Resource type names reported by the management API.
pub mod resource_type {
    pub const ENVIRONMENT: &str = "Gestalt::Resource::Environment";
    pub const WORKSPACE: &str = "Gestalt::Resource::Workspace";
    pub const ORGANIZATION: &str = "Gestalt::Resource::Organization";
    pub const EVENT_RULE: &str = "Gestalt::Resource::Rule::Event";
    pub const LIMIT_RULE: &str = "Gestalt::Resource::Rule::Limit";
}

/// Any management API resource: orgs, environments, lambdas, apis,
/// endpoints, providers, users, groups, entitlements, policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub properties: Value,
}

impl Resource {
    /// `name(id)`, as used in log lines.
    pub fn display(&self) -> String {
        format!("{}({})", self.name, self.id)
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// Fully-qualified org name. Falls back to the resource name when the
    /// org payload does not carry `properties.fqon`.
    pub fn fqon(&self) -> &str {
        self.property_str("fqon").unwrap_or(&self.name)
    }

    /// Routable path of an API endpoint.
    pub fn resource_path(&self) -> Option<&str> {
        self.property_str("resource")
    }

    /// Lambda (or container) id an API endpoint is bound to.
    pub fn implementation_id(&self) -> Option<&str> {
        self.property_str("implementation_id")
    }

    /// Action name of an entitlement, e.g. `lambda.view`.
    pub fn action(&self) -> Option<&str> {
        self.property_str("action")
    }

    /// Identity ids listed on an entitlement.
    pub fn identity_ids(&self) -> Vec<String> {
        self.properties
            .get("identities")
            .and_then(Value::as_array)
            .map(|identities| {
                identities
                    .iter()
                    .filter_map(|i| match i {
                        Value::String(id) => Some(id.clone()),
                        other => other.get("id").and_then(Value::as_str).map(String::from),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Named for Resource {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentType {
    Development,
    Production,
    Test,
}

/// Provider type names, for searching and for creating providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    GatewayManager,
    Kong,
    CaaS,
    Lambda,
    Dcos,
    Kubernetes,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GatewayManager => "GatewayManager",
            Self::Kong => "Kong",
            Self::CaaS => "CaaS",
            Self::Lambda => "Lambda",
            Self::Dcos => "Gestalt::Configuration::Provider::CaaS::DCOS",
            Self::Kubernetes => "Gestalt::Configuration::Provider::CaaS::Kubernetes",
        }
    }
}

/// Creation payload for a packaged lambda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaSpec {
    pub name: String,
    pub description: String,
    pub properties: LambdaProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaProperties {
    pub provider: ProviderRef,
    pub public: bool,
    pub cpus: f64,
    pub memory: u32,
    pub code_type: String,
    pub package_url: String,
    pub compressed: bool,
    pub headers: Map<String, Value>,
    pub periodic_info: Map<String, Value>,
    pub timeout: u32,
    pub handler: String,
    pub runtime: String,
    pub env: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRef {
    pub id: String,
    #[serde(default)]
    pub locations: Vec<String>,
}

impl LambdaSpec {
    /// Fixed template for a public package lambda: 0.1 cpu, 512 MB,
    /// 30s timeout, no environment variables.
    pub fn package(
        name: impl Into<String>,
        description: impl Into<String>,
        provider_id: impl Into<String>,
        package_url: impl Into<String>,
        handler: impl Into<String>,
        runtime: impl Into<String>,
    ) -> Self {
        let mut headers = Map::new();
        headers.insert("Accept".to_string(), Value::String("text/plain".to_string()));

        Self {
            name: name.into(),
            description: description.into(),
            properties: LambdaProperties {
                provider: ProviderRef {
                    id: provider_id.into(),
                    locations: Vec::new(),
                },
                public: true,
                cpus: 0.1,
                memory: 512,
                code_type: "package".to_string(),
                package_url: package_url.into(),
                compressed: false,
                headers,
                periodic_info: Map::new(),
                timeout: 30,
                handler: handler.into(),
                runtime: runtime.into(),
                env: Map::new(),
            },
        }
    }

    /// Patch that brings an existing lambda in line with this spec.
    ///
    /// Only description, package URL, handler and runtime are replaced; the
    /// provider binding and resource limits stay as they are.
    pub fn redeploy_patch(&self) -> Result<Patch, serde_json::Error> {
        replace_ops([
            ("/description", Value::String(self.description.clone())),
            (
                "/properties/package_url",
                Value::String(self.properties.package_url.clone()),
            ),
            (
                "/properties/handler",
                Value::String(self.properties.handler.clone()),
            ),
            (
                "/properties/runtime",
                Value::String(self.properties.runtime.clone()),
            ),
        ])
    }
}

/// Creation payload for an API endpoint bound to a lambda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEndpointSpec {
    pub name: String,
    pub properties: ApiEndpointProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEndpointProperties {
    pub implementation_type: String,
    pub implementation_id: String,
    pub resource: String,
}

impl ApiEndpointSpec {
    /// Endpoint named after the lambda, routed at `/<lambda name>`.
    pub fn for_lambda(lambda: &Resource) -> Self {
        Self {
            name: lambda.name.clone(),
            properties: ApiEndpointProperties {
                implementation_type: "lambda".to_string(),
                implementation_id: lambda.id.clone(),
                resource: format!("/{}", lambda.name),
            },
        }
    }
}

/// Build a JSON Patch made only of `replace` operations.
pub fn replace_ops<I, P>(ops: I) -> Result<Patch, serde_json::Error>
where
    I: IntoIterator<Item = (P, Value)>,
    P: AsRef<str>,
{
    let ops: Vec<Value> = ops
        .into_iter()
        .map(|(path, value)| json!({ "op": "replace", "path": path.as_ref(), "value": value }))
        .collect();
    serde_json::from_value(Value::Array(ops))
}
