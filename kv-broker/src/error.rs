use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use broker_api::OsbError;
use thiserror::Error;

/// Everything a broker operation can fail with.
///
/// Every variant is terminal for the request that produced it and none of
/// them leaves partial state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// A required identifier or field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The store or key does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The instance or binding does not exist (anymore).
    #[error("{0}")]
    Gone(String),

    /// The id is already taken, or taken under different parameters.
    #[error("{0}")]
    Conflict(String),

    /// The caller's credentials do not match the resource's.
    #[error("Unauthorized")]
    Unauthorized,
}

impl BrokerError {
    pub fn status(&self) -> StatusCode {
        match self {
            BrokerError::Validation(_) => StatusCode::BAD_REQUEST,
            BrokerError::NotFound(_) => StatusCode::NOT_FOUND,
            BrokerError::Gone(_) => StatusCode::GONE,
            BrokerError::Conflict(_) => StatusCode::CONFLICT,
            BrokerError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(OsbError::new(self.to_string()));

        if status == StatusCode::UNAUTHORIZED {
            return (
                status,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"kv-broker\"")],
                body,
            )
                .into_response();
        }
        (status, body).into_response()
    }
}

/// A specialized Result type for broker operations.
pub type Result<T> = std::result::Result<T, BrokerError>;
