//! HTTP error mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use runpay_core::{ConfigError, PaymentError, ValidationError};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Handler error, rendered as a JSON body with a matching status code
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid request fields (400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unparsable body, path or status value (400)
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Webhook hash mismatch (401)
    #[error("Invalid signature")]
    InvalidSignature,

    /// Unknown order (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Lifecycle violation (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or unusable configuration (503)
    #[error("Service misconfigured: {0}")]
    Misconfigured(String),

    /// Anything else (500); details stay in the logs
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Validation(v) => AppError::Validation(v),
            PaymentError::UnknownStatus(_) => AppError::MalformedPayload(err.to_string()),
            PaymentError::NotFound(reference) => AppError::NotFound(reference),
            PaymentError::IllegalTransition { .. } => AppError::Conflict(err.to_string()),
            PaymentError::Config(e) => AppError::from(e),
            PaymentError::Key(_) | PaymentError::Signing(_) => AppError::InternalError(err.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Misconfigured(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(reference) => AppError::NotFound(reference),
            StoreError::Payment(e) => AppError::from(e),
            StoreError::Unavailable(_) => AppError::InternalError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation { .. } | AppError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Misconfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(%status, "{self}");
        }

        let body = match &self {
            AppError::Validation(v) => json!({
                "error": "validation failed",
                "missing": v.missing,
                "invalid": v.invalid,
            }),
            // internals stay in the logs
            AppError::InternalError(_) => json!({ "error": "internal error" }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
