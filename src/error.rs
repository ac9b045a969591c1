use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::payment::PaymentError;

/// Application error taxonomy. Every fallible path that reaches a handler
/// boundary is expressed as one of these kinds and converted to a response
/// via [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// A required field or document is missing or invalid. Surfaced to the
    /// user as a blocking message; nothing is mutated.
    #[error("{0}")]
    Validation(String),

    /// An uploaded file does not match the accepted types for its
    /// attachment kind. The file is discarded.
    #[error("{0}")]
    UnsupportedFileType(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    CheckoutConflict(&'static str),

    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),

    /// The persisted cart slot held bytes that no longer parse. Recovered
    /// locally by resetting the slot; never surfaced to a user.
    #[error("persisted cart slot is corrupt: {0}")]
    StorageCorruption(String),

    #[error("storage error: {0}")]
    Storage(#[from] opendal::Error),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UnsupportedFileType(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CheckoutConflict(_) => StatusCode::CONFLICT,
            AppError::Payment(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StorageCorruption(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        (status, self.to_string()).into_response()
    }
}
