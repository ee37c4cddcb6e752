//! Chat endpoint
//!
//! Accepts a JSON prompt, seeds an ephemeral chat session with one synthetic
//! prior exchange, and forwards the prompt to the chat model over the
//! streaming endpoint. The streamed reply is aggregated server-side and the
//! caller receives a single response object.

use crate::error::AppError;
use crate::gemini::types::{Content, GenerateContentResponse, Part};
use crate::intake;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// The scripted model turn every session is seeded with
const SEED_MODEL_GREETING: &str = "Great to meet you. What would you like to know?";

/// Request body for the chat endpoint
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's prompt
    #[serde(default)]
    pub prompt: String,
}

/// Response for a successful chat request
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The aggregated response object from the model, relayed verbatim
    pub data: GenerateContentResponse,
}

/// POST /api/chat - Send a prompt through a freshly seeded chat session
///
/// The session history holds exactly one prior user turn (the same prompt)
/// and one fixed model greeting; it is never stored across requests.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    intake::validate_prompt(&request.prompt)?;

    info!(prompt_len = request.prompt.len(), "Processing chat request");

    let history = vec![
        Content::user(vec![Part::text(&request.prompt)]),
        Content::model(SEED_MODEL_GREETING),
    ];

    let mut session = state.chat_model.start_chat(history);
    let data = session.send_message_stream(&request.prompt).await?;

    Ok(Json(ChatResponse { data }))
}
