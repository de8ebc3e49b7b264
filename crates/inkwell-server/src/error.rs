//! API error rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use inkwell_carrier::CarrierError;
use inkwell_commerce::{CommerceError, ErrorCode};
use serde::Serialize;
use thiserror::Error;

/// Errors a handler can return.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Carrier(#[from] CarrierError),

    /// Malformed query parameter.
    #[error("Invalid query parameter {name}: {message}")]
    InvalidQuery { name: &'static str, message: String },
}

/// Error body: `{ "success": false, "code", "message" }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn invalid_query(name: &'static str, message: impl Into<String>) -> Self {
        ApiError::InvalidQuery {
            name,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Commerce(e) => e.code().as_str(),
            ApiError::Carrier(CarrierError::MissingApiKey) => "CARRIER_UNAVAILABLE",
            ApiError::Carrier(_) => "CARRIER_ERROR",
            ApiError::InvalidQuery { .. } => ErrorCode::InvalidData.as_str(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Commerce(e) => match e.code() {
                ErrorCode::NotFound => StatusCode::NOT_FOUND,
                ErrorCode::DuplicateError => StatusCode::CONFLICT,
                ErrorCode::BadData => StatusCode::BAD_REQUEST,
                ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
                ErrorCode::InvalidData => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Carrier(CarrierError::MissingApiKey) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Carrier(CarrierError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Carrier(_) => StatusCode::BAD_GATEWAY,
            ApiError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{self}");
        }
        let body = ErrorBody {
            success: false,
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
