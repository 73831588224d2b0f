use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// Everything a handler can answer with besides success.
/// The display text is exactly what the client sees in `error`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid JSON data")]
    InvalidJson,
    #[error("Invalid resource id")]
    InvalidId,
    #[error("Resource not found")]
    ResourceNotFound,
    #[error("Endpoint not found")]
    EndpointNotFound,
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson | Self::InvalidId => StatusCode::BAD_REQUEST,
            Self::ResourceNotFound | Self::EndpointNotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(_) => Self::InvalidId,
            ServiceError::NotFound(_) => Self::ResourceNotFound,
            ServiceError::Parse(_) | ServiceError::Io(_) | ServiceError::Timeout(_) => {
                // detail stays in the operator log
                error!(error = %err, "store operation failed");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
