use thiserror::Error;

/// Errors raised by the management API and GitLab clients.
///
/// A missing resource (HTTP 404, or a by-name scan without a match) is not an
/// error: lookups return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{method} {url} returned status {status}: {body}")]
    Remote {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("{method} {url} returned no body")]
    EmptyResponse { method: String, url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Dispatched request failed to complete: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl ClientError {
    /// HTTP status reported by the remote side, if any.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Remote {
            method: "PATCH".to_string(),
            url: "http://meta/acme/lambdas/1".to_string(),
            status: 409,
            body: "conflict".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "PATCH http://meta/acme/lambdas/1 returned status 409: conflict"
        );
        assert_eq!(err.remote_status(), Some(409));

        let err = ClientError::InvalidCredentials("empty token".to_string());
        assert_eq!(err.to_string(), "Invalid credentials: empty token");
        assert_eq!(err.remote_status(), None);
    }
}
