use axum::http::StatusCode;
use lambdeploy_client::ClientError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an invocation stopped.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Required setting missing or unusable. Raised before any remote call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A lookup the flow cannot continue without came back empty.
    #[error("Could not find target {kind} '{name}'")]
    NotFound { kind: &'static str, name: String },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Stable error category reported in the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    NotFound,
    Remote,
    Transport,
    Decode,
    InvalidPayload,
}

impl DeployError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidPayload(_) => ErrorKind::InvalidPayload,
            Self::Client(err) => match err {
                ClientError::Remote { .. } | ClientError::EmptyResponse { .. } => {
                    ErrorKind::Remote
                }
                ClientError::Http(_) | ClientError::TaskFailed(_) => ErrorKind::Transport,
                ClientError::Decode(_) => ErrorKind::Decode,
                ClientError::InvalidUrl(_) | ClientError::InvalidCredentials(_) => {
                    ErrorKind::Configuration
                }
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidPayload => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Remote | ErrorKind::Transport | ErrorKind::Decode => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Status returned by the management API or GitLab, when that is what failed.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Self::Client(err) => err.remote_status(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DeployError {
    fn from(err: serde_json::Error) -> Self {
        Self::Client(ClientError::Decode(err))
    }
}
