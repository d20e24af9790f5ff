//! Deploys packaged lambdas and their API endpoints into a PaaS environment,
//! optionally publishing the resulting URL to a GitLab environment.
//!
//! The same handler backs the HTTP service and the `lambdeploy` CLI.

pub mod config;
pub mod error;
pub mod handlers;
pub mod invocation;
pub mod journal;
pub mod observability;
pub mod reconcile;
pub mod server;

pub use config::DeployerConfig;
pub use error::{DeployError, ErrorKind};
pub use invocation::{Action, InvocationPayload, InvocationResponse};
pub use journal::Journal;
pub use reconcile::{invoke, invoke_json};
pub use server::{AppState, LambdeployServer, ServerBuilder, build_app};
