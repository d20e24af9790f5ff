//! Response handling and credentials shared by the management API and GitLab clients.
//!
//! Status mapping:
//! - 404 and 204 resolve to `None`
//! - any other status >= 300 is a [`ClientError::Remote`]
//! - 2xx with a JSON content type is parsed, anything else is kept as text

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Method, Response, StatusCode, header, redirect};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Deserialize the body. Text bodies are parsed as JSON as a fallback,
    /// since some endpoints omit the content type.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Json(value) => Ok(serde_json::from_value(value)?),
            Self::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }
}

/// HTTP client shared by both APIs. Redirects are not followed, so a 3xx
/// surfaces as a [`ClientError::Remote`] like any other status >= 300.
pub fn http_client() -> Result<Client> {
    Ok(Client::builder().redirect(redirect::Policy::none()).build()?)
}

/// Map an HTTP response onto the absent / error / body contract.
pub async fn read_response(method: &Method, response: Response) -> Result<Option<ResponseBody>> {
    let status = response.status();
    let url = response.url().to_string();

    if status == StatusCode::NOT_FOUND {
        debug!(%method, %url, "Resource not found");
        return Ok(None);
    }

    if status.as_u16() >= 300 {
        let body = response.text().await.unwrap_or_default();
        warn!(%method, %url, status = status.as_u16(), response = %body, "Remote call failed");
        return Err(ClientError::Remote {
            method: method.to_string(),
            url,
            status: status.as_u16(),
            body,
        });
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    let body = response.text().await?;

    if is_json {
        Ok(Some(ResponseBody::Json(serde_json::from_str(&body)?)))
    } else {
        Ok(Some(ResponseBody::Text(body)))
    }
}

/// Decode an optional body into `T`, keeping the absent contract.
pub fn decode_optional<T: DeserializeOwned>(body: Option<ResponseBody>) -> Result<Option<T>> {
    body.map(ResponseBody::decode).transpose()
}

/// Credentials for the management API `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum MetaCredentials {
    /// API key and secret, sent as HTTP Basic.
    Basic { key: String, secret: String },
    /// Precomputed bearer token.
    Bearer(String),
    /// A complete header value forwarded by the caller.
    Header(String),
}

impl MetaCredentials {
    pub fn header_value(&self) -> String {
        match self {
            Self::Basic { key, secret } => {
                format!("Basic {}", STANDARD.encode(format!("{key}:{secret}")))
            }
            Self::Bearer(token) => format!("Bearer {token}"),
            Self::Header(raw) => raw.clone(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let empty = match self {
            Self::Basic { key, secret } => key.is_empty() || secret.is_empty(),
            Self::Bearer(token) => token.is_empty(),
            Self::Header(raw) => raw.trim().is_empty(),
        };
        if empty {
            return Err(ClientError::InvalidCredentials(
                "credentials must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for MetaCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { key, .. } => f
                .debug_struct("Basic")
                .field("key", key)
                .field("secret", &"***")
                .finish(),
            Self::Bearer(_) => f.write_str("Bearer(***)"),
            Self::Header(_) => f.write_str("Header(***)"),
        }
    }
}

pub(crate) fn urlencode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
