//! File generation endpoint
//!
//! Accepts a multipart form with a text prompt and a file upload, encodes the
//! file as an inline payload, and forwards both to the vision model in a
//! single non-streamed call.

use crate::error::AppError;
use crate::gemini::types::Part;
use crate::intake;
use crate::state::AppState;
use axum::extract::{Multipart, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Response for a successful file generation request
#[derive(Debug, Serialize)]
pub struct FileRequestResponse {
    /// The model's extracted text, returned verbatim
    pub data: String,
}

/// POST /api/request/file - Generate from a prompt and an uploaded file
///
/// Validation order mirrors the contract: malformed bodies and disallowed
/// file types fail during intake, then the prompt is checked, then the file
/// presence. The upstream collaborator is invoked exactly once and only after
/// all validation has passed.
pub async fn request_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<FileRequestResponse>, AppError> {
    let form = intake::read_upload_form(multipart).await?;

    intake::validate_prompt(&form.prompt)?;
    let file = form.file.ok_or(AppError::MissingFile)?;

    info!(
        mime_type = %file.mime_type,
        file_size = file.bytes.len(),
        prompt_len = form.prompt.len(),
        "Processing file generation request"
    );

    let parts = vec![
        Part::text(&form.prompt),
        Part::inline_data(BASE64.encode(&file.bytes), file.mime_type),
    ];

    let data = state.vision_model.generate_content(parts).await?;

    Ok(Json(FileRequestResponse { data }))
}
