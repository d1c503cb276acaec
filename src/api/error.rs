use reqwest::StatusCode;
use thiserror::Error;

use crate::model::ResourceType;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{resource:?} request failed ({status}): {message}")]
    Status {
        resource: ResourceType,
        status: StatusCode,
        message: String,
    },

    #[error("unable to decode {resource:?} response: {error}")]
    Decode {
        resource: ResourceType,
        error: serde_json::Error,
    },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_validation(&self) -> bool {
        self.status() == Some(StatusCode::UNPROCESSABLE_ENTITY)
    }

    /// Message shown to the user. Backend messages are passed through verbatim.
    pub fn client_display(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Http(e) if e.is_timeout() => String::from("Request timed out."),
            Self::Http(e) if e.is_connect() => String::from("Unable to reach the server."),
            Self::Http(_) => String::from("Request failed."),
            Self::Decode { .. } => String::from("Unexpected response from the server."),
            Self::InvalidUrl(_) => String::from("Invalid server address."),
        }
    }
}

/// Error body returned by the backend: `{ "message": "..." }`.
#[derive(Debug, serde::Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
