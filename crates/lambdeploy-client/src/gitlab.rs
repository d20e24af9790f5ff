//! GitLab REST client, used to publish a deployment's external URL on the
//! matching GitLab environment.
//!
//! Collections are requested with `per_page=1000` and no further paging, so
//! projects or environments beyond the first thousand are not seen.

use std::sync::Arc;

use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::Result;
use crate::http::{decode_optional, http_client, read_response};
use crate::lookup::{Named, find_by, find_by_name};

const PRIVATE_TOKEN: &str = "PRIVATE-TOKEN";
const PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitlabProject {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    pub path_with_namespace: String,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ProjectLinks>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

impl GitlabProject {
    /// API URL of the project, forced onto https. `None` when the listing
    /// carried no `_links.self`.
    ///
    /// GitLab has been seen reporting `_links.self` with an `http://` scheme
    /// even when served over TLS.
    pub fn api_url(&self) -> Option<String> {
        self.links
            .as_ref()
            .map(|links| secure_url(&links.self_link))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitlabEnvironment {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub external_url: Option<String>,
}

impl Named for GitlabEnvironment {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Rewrite an `http://` URL to `https://`.
pub fn secure_url(url: &str) -> String {
    url.replacen("http://", "https://", 1)
}

#[derive(Clone)]
pub struct GitlabClient {
    http: Client,
    base_url: Arc<str>,
    token: Arc<str>,
}

impl GitlabClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Self::with_http_client(http_client()?, base_url, token)
    }

    pub fn with_http_client(http: Client, base_url: &str, token: &str) -> Result<Self> {
        url::Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            token: Arc::from(token),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<Option<crate::http::ResponseBody>> {
        debug!(%method, %url, "GitLab request");
        let mut req = self
            .http
            .request(method.clone(), url)
            .header(PRIVATE_TOKEN, self.token.as_ref());
        if let Some(body) = payload {
            req = req.json(&body);
        }
        let response = req.send().await?;
        read_response(&method, response).await
    }

    /// Project whose `path_with_namespace` equals `project_path`.
    pub async fn find_project(&self, project_path: &str) -> Result<Option<GitlabProject>> {
        let url = format!("{}/projects?per_page={PAGE_SIZE}", self.base_url);
        let projects: Vec<GitlabProject> =
            decode_optional(self.send(Method::GET, &url, None).await?)?.unwrap_or_default();
        debug!(count = projects.len(), "Listed GitLab projects");
        Ok(find_by(projects, |p| p.path_with_namespace == project_path))
    }

    /// Environment named `name` under the project at `project_url`.
    pub async fn find_environment(
        &self,
        project_url: &str,
        name: &str,
    ) -> Result<Option<GitlabEnvironment>> {
        let url = format!(
            "{}/environments?per_page={PAGE_SIZE}",
            project_url.trim_end_matches('/')
        );
        let environments: Vec<GitlabEnvironment> =
            decode_optional(self.send(Method::GET, &url, None).await?)?.unwrap_or_default();
        debug!(count = environments.len(), "Listed GitLab environments");
        Ok(find_by_name(environments, name))
    }

    pub async fn update_environment_url(
        &self,
        project_url: &str,
        environment: &GitlabEnvironment,
        external_url: &str,
    ) -> Result<Option<GitlabEnvironment>> {
        let url = format!(
            "{}/environments/{}",
            project_url.trim_end_matches('/'),
            environment.id
        );
        decode_optional(
            self.send(
                Method::PUT,
                &url,
                Some(json!({ "external_url": external_url })),
            )
            .await?,
        )
    }
}

impl std::fmt::Debug for GitlabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitlabClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
