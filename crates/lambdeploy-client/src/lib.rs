//! Lambdeploy clients
//!
//! This crate provides:
//! - `MetaClient` for the PaaS management API (orgs, environments, lambdas,
//!   APIs and endpoints, providers, users and groups, policies, entitlements)
//! - `GitlabClient` for publishing external URLs on GitLab environments
//! - the shared resource model and find-by-name helpers

pub mod error;
pub mod gitlab;
pub mod http;
pub mod lookup;
pub mod meta;
pub mod model;

pub use error::{ClientError, Result};
pub use gitlab::{GitlabClient, GitlabEnvironment, GitlabProject, secure_url};
pub use http::{MetaCredentials, ResponseBody};
pub use lookup::{Named, find_by, find_by_name};
pub use meta::{LimitCondition, MetaClient, join_ordered};
pub use model::{ApiEndpointSpec, EnvironmentType, LambdaSpec, ProviderType, Resource};
