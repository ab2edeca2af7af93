//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps decode and storage failures to HTTP status codes with a flat JSON
//! body, `{"error":"<message>"}`, which is the shape deployed relayers parse.
//! Store messages are passed through to the client unchanged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use relay_counter_core::StoreError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
///
/// Authorization failures never reach this type: the gate answers them
/// with a plain-text body before any handler runs.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body could not be decoded into the expected shape (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The record store rejected or failed the operation (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code for this error.
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client, without the variant prefix.
    fn message(&self) -> &str {
        match self {
            Self::BadRequest(msg) | Self::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}
