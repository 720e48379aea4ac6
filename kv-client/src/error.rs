use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never got an answer.
    #[error("Can't create connection: {0}")]
    Http(#[from] reqwest::Error),

    /// The broker answered with something other than the expected status.
    #[error("Unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Can't parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Missing store URL in response: {0}")]
    MissingUrl(String),

    #[error("Value is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl ClientError {
    /// The HTTP status, when the broker answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
