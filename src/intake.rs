//! Request intake and validation
//!
//! Parses the multipart form for the file-generation route and validates
//! client input before any gateway work happens. Uploaded bytes are buffered
//! in memory and dropped when the request handler returns; nothing is written
//! to disk.

use crate::error::AppError;
use axum::body::Bytes;
use axum::extract::Multipart;
use tracing::warn;

/// MIME types accepted for uploads
pub const ALLOWED_FILE_TYPES: [&str; 3] = ["text/plain", "image/png", "image/jpeg"];

/// Maximum accepted file size in bytes
pub const MAX_FILE_SIZE_BYTES: usize = 7 * 1024 * 1024;

/// Maximum prompt length in characters
pub const MAX_PROMPT_LENGTH: usize = 10_000;

/// An uploaded file buffered in memory for the request lifetime
#[derive(Debug)]
pub struct UploadedFile {
    /// Raw file bytes
    pub bytes: Bytes,
    /// Client-declared MIME type; trusted as-is, no content sniffing
    pub mime_type: String,
}

/// The parsed fields of the upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    /// The `prompt` text field (empty string if absent)
    pub prompt: String,
    /// The `file` part, if one was supplied
    pub file: Option<UploadedFile>,
}

/// Whether the declared MIME type is in the allow-list
pub fn is_allowed_file_type(mime_type: &str) -> bool {
    ALLOWED_FILE_TYPES.contains(&mime_type)
}

/// Validate a prompt string
///
/// # Errors
/// * `AppError::MissingPrompt` - prompt is absent or whitespace-only
/// * `AppError::PromptTooLong` - prompt exceeds `MAX_PROMPT_LENGTH`
pub fn validate_prompt(prompt: &str) -> Result<(), AppError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(AppError::MissingPrompt);
    }
    if trimmed.len() > MAX_PROMPT_LENGTH {
        return Err(AppError::PromptTooLong(MAX_PROMPT_LENGTH));
    }
    Ok(())
}

/// Read the `prompt` and `file` fields from a multipart form
///
/// Disallowed MIME types are rejected before the file bytes are read.
/// Unknown fields are ignored with a warning.
///
/// # Errors
/// * `AppError::InvalidFileType` - file MIME type not in the allow-list
/// * `AppError::PayloadTooLarge` - file exceeds `MAX_FILE_SIZE_BYTES`
/// * `AppError::Multipart` - the form body could not be read
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(e.to_string()))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "prompt" => {
                form.prompt = field
                    .text()
                    .await
                    .map_err(|e| AppError::Multipart(e.to_string()))?;
            }
            "file" => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                if !is_allowed_file_type(&mime_type) {
                    return Err(AppError::InvalidFileType(mime_type));
                }

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Multipart(e.to_string()))?;
                if bytes.len() > MAX_FILE_SIZE_BYTES {
                    return Err(AppError::PayloadTooLarge(bytes.len()));
                }

                form.file = Some(UploadedFile { bytes, mime_type });
            }
            other => {
                warn!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}
