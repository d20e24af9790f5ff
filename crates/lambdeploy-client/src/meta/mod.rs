//! Management API client.
//!
//! One client is built per invocation from the resolved base URL and
//! credentials. It is cheap to clone and holds no mutable state.

mod apis;
mod entitlements;
mod identities;
mod lambdas;
mod orgs;
mod policies;
mod providers;

pub use policies::LimitCondition;

use std::sync::Arc;

use futures_util::future::join_all;
use reqwest::{Client, Method, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::http::{MetaCredentials, ResponseBody, decode_optional, http_client, read_response};

/// Handle for a request dispatched with [`MetaClient::dispatch`].
pub type Dispatched = JoinHandle<Result<Option<ResponseBody>>>;

#[derive(Clone)]
pub struct MetaClient {
    http: Client,
    base_url: Arc<str>,
    authorization: Arc<str>,
}

impl MetaClient {
    pub fn new(base_url: &str, credentials: &MetaCredentials) -> Result<Self> {
        Self::with_http_client(http_client()?, base_url, credentials)
    }

    pub fn with_http_client(
        http: Client,
        base_url: &str,
        credentials: &MetaCredentials,
    ) -> Result<Self> {
        url::Url::parse(base_url)?;
        credentials.validate()?;
        Ok(Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            authorization: Arc::from(credentials.header_value()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue one request. `None` means the resource was absent (404) or the
    /// response had no content (204).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Option<Value>,
    ) -> Result<Option<ResponseBody>> {
        let url = self.url(path);
        debug!(%method, %url, "Management API request");

        let mut req = self
            .http
            .request(method.clone(), &url)
            .header(header::AUTHORIZATION, self.authorization.as_ref());
        if let Some(body) = payload {
            req = req.json(&body);
        }

        let response = req.send().await?;
        read_response(&method, response).await
    }

    /// Spawn a request on the runtime without waiting for it.
    pub fn dispatch(&self, method: Method, path: String, payload: Option<Value>) -> Dispatched {
        let client = self.clone();
        tokio::spawn(async move { client.request(method, &path, payload).await })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        decode_optional(self.request(Method::GET, path, None).await?)
    }

    /// GET a collection; an absent collection reads as empty.
    pub async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        Ok(self.get::<Vec<T>>(path).await?.unwrap_or_default())
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(body)?;
        decode_optional(self.request(Method::POST, path, Some(payload)).await?)
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(body)?;
        decode_optional(self.request(Method::PUT, path, Some(payload)).await?)
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(body)?;
        decode_optional(self.request(Method::PATCH, path, Some(payload)).await?)
    }

    pub async fn delete(&self, path: &str) -> Result<Option<ResponseBody>> {
        self.request(Method::DELETE, path, None).await
    }

    /// POST that must yield a resource body.
    async fn create<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(path, body)
            .await?
            .ok_or_else(|| ClientError::EmptyResponse {
                method: Method::POST.to_string(),
                url: self.url(path),
            })
    }
}

/// Wait for every dispatched request, then return their results in the
/// order they were dispatched. The first failure (in that order) wins.
pub async fn join_ordered<T>(handles: Vec<JoinHandle<Result<T>>>) -> Result<Vec<T>> {
    join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.map_err(ClientError::from).and_then(|result| result))
        .collect()
}

impl std::fmt::Debug for MetaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
