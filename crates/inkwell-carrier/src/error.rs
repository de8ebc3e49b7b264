//! Carrier lookup error types.

use thiserror::Error;

/// Errors that can occur when talking to the carrier API.
#[derive(Error, Debug)]
pub enum CarrierError {
    /// No API key configured.
    #[error("Carrier API key is not configured")]
    MissingApiKey,

    /// Failed to send the request.
    #[error("Request failed: {0}")]
    RequestError(String),

    /// HTTP error response.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The carrier answered with `success: false`.
    #[error("Carrier rejected the request: {}", .0.join("; "))]
    Rejected(Vec<String>),

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request timeout.
    #[error("Request timed out")]
    Timeout,
}

impl From<serde_json::Error> for CarrierError {
    fn from(e: serde_json::Error) -> Self {
        CarrierError::ParseError(e.to_string())
    }
}

impl From<reqwest::Error> for CarrierError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CarrierError::Timeout
        } else if e.is_decode() {
            CarrierError::ParseError(e.to_string())
        } else {
            CarrierError::RequestError(e.to_string())
        }
    }
}
