//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! Validation failures surface their message to the caller with a 400 status;
//! upstream and internal failures are logged and collapsed into a generic 500
//! body so that no internal detail leaks to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// All errors that can occur while handling a request are represented by this
/// enum. Each variant implements automatic conversion to HTTP responses via
/// `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// The required text prompt was absent or empty
    #[error("Text prompt is required")]
    MissingPrompt,

    /// The route requires a file upload and none was supplied
    #[error("Image not provided")]
    MissingFile,

    /// The uploaded file's declared MIME type is not in the allow-list
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    /// The uploaded file exceeds the size cap
    #[error("Uploaded file of {0} bytes exceeds the upload limit")]
    PayloadTooLarge(usize),

    /// The prompt exceeds the maximum accepted length
    #[error("Prompt exceeds maximum length of {0} characters")]
    PromptTooLong(usize),

    /// The multipart body could not be read
    #[error("Malformed multipart request: {0}")]
    Multipart(String),

    /// The call to the Gemini API failed or returned an error
    #[error("Upstream API error: {0}")]
    Upstream(#[source] anyhow::Error),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MissingPrompt
            | AppError::MissingFile
            | AppError::InvalidFileType(_)
            | AppError::PromptTooLong(_)
            | AppError::Multipart(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            AppError::Upstream(cause) => {
                tracing::error!(error = %cause, "Upstream generation call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(cause) => {
                tracing::error!(error = %cause, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
