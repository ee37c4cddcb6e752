//! Gemini API client
//!
//! Direct HTTP client for calling the Gemini API. A `GenerativeModel` bundles
//! a shared `reqwest::Client`, the API credential, a model name, and the
//! safety policy; the two handles the server builds at startup are the only
//! cross-request state in the process.

use crate::error::AppError;
use crate::gemini::types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part, SafetySetting,
};
use anyhow::anyhow;
use futures_util::StreamExt;

/// Default Gemini API base URL
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A configured handle to one Gemini model
///
/// Cheap to clone; the inner `reqwest::Client` carries a shared connection
/// pool. Immutable after construction, safe to share across handlers.
#[derive(Clone)]
pub struct GenerativeModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    safety_settings: Vec<SafetySetting>,
}

// The API key must never end up in logs.
impl std::fmt::Debug for GenerativeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerativeModel")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("safety_settings", &self.safety_settings)
            .finish()
    }
}

impl GenerativeModel {
    /// Create a model handle
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client (connection pooling)
    /// * `api_key` - Gemini API key
    /// * `model` - Model name (e.g., "gemini-pro-vision")
    /// * `base_url` - API base URL, overridable for tests
    /// * `safety_settings` - Content-category thresholds attached to every call
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        safety_settings: Vec<SafetySetting>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            safety_settings,
        }
    }

    /// The model name this handle is bound to
    pub fn model_name(&self) -> &str {
        &self.model
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.base_url, self.model, method, self.api_key
        )
    }

    /// Single-turn, non-streamed generation
    ///
    /// Sends the given parts as one user turn to `generateContent` and
    /// extracts the first candidate's text.
    ///
    /// # Errors
    /// Returns `AppError::Upstream` if the HTTP request fails, the response
    /// cannot be parsed, the prompt was blocked, or no text candidate is
    /// present.
    pub async fn generate_content(&self, parts: Vec<Part>) -> Result<String, AppError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(parts)],
            safety_settings: self.safety_settings.clone(),
        };

        let url = self.method_url("generateContent");
        tracing::debug!(
            model = %self.model,
            contents = request.contents.len(),
            "Calling Gemini generateContent"
        );

        let response = self.send_request(&url, &request).await?;

        let response_body = response.text().await.map_err(|e| {
            AppError::Upstream(anyhow!(
                "Failed to read response body from Gemini API: {}",
                e
            ))
        })?;

        let parsed: GenerateContentResponse = serde_json::from_str(&response_body).map_err(|e| {
            AppError::Upstream(anyhow!(
                "Failed to parse JSON response from Gemini API: {} - Response body: {}",
                e,
                response_body
            ))
        })?;

        let text = extract_text(&parsed)?;

        tracing::debug!(
            response_len = text.len(),
            "Successfully received response from Gemini API"
        );

        Ok(text)
    }

    /// Start an ephemeral chat session seeded with prior turns
    ///
    /// The session holds the history by value and lives only as long as the
    /// request handler that created it.
    pub fn start_chat(&self, history: Vec<Content>) -> ChatSession<'_> {
        ChatSession {
            model: self,
            history,
        }
    }

    /// POST the request and fail on non-2xx statuses
    async fn send_request(
        &self,
        url: &str,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Response, AppError> {
        if self.api_key.is_empty() {
            return Err(AppError::Upstream(anyhow!("API key is empty")));
        }

        let response = self.client.post(url).json(request).send().await.map_err(|e| {
            AppError::Upstream(anyhow!("Failed to send HTTP request to Gemini API: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            tracing::error!(
                status_code = status_code,
                error_body = %error_body,
                "Gemini API returned error status"
            );

            if status_code == 429 {
                return Err(AppError::Upstream(anyhow!(
                    "Gemini API rate limit exceeded (HTTP {}): {}",
                    status_code,
                    error_body
                )));
            }

            return Err(AppError::Upstream(anyhow!(
                "Gemini API returned error status {}: {}",
                status_code,
                error_body
            )));
        }

        Ok(response)
    }

    /// Streamed generation, aggregated server-side
    ///
    /// Submits the request to `streamGenerateContent?alt=sse`, consumes the
    /// SSE chunks as they arrive, and folds them into a single response with
    /// one model candidate holding the concatenated text.
    async fn stream_generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AppError> {
        let url = format!("{}&alt=sse", self.method_url("streamGenerateContent"));
        tracing::debug!(
            model = %self.model,
            contents = request.contents.len(),
            "Calling Gemini streamGenerateContent"
        );

        let response = self.send_request(&url, request).await?;

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut text = String::new();
        let mut finish_reason = None;
        let mut usage_metadata = None;
        let mut saw_candidate = false;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::Upstream(anyhow!("Error reading Gemini API stream: {}", e))
            })?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            // Process complete SSE events
            while let Some(event_end) = buffer.find("\n\n") {
                let event = buffer[..event_end].to_string();
                buffer.drain(..event_end + 2);

                let Some(data) = event.strip_prefix("data: ") else {
                    continue;
                };

                let parsed: GenerateContentResponse =
                    serde_json::from_str(data).map_err(|e| {
                        AppError::Upstream(anyhow!(
                            "Failed to parse stream chunk from Gemini API: {} - Chunk: {}",
                            e,
                            data
                        ))
                    })?;

                if let Some(feedback) = &parsed.prompt_feedback {
                    if let Some(reason) = &feedback.block_reason {
                        return Err(AppError::Upstream(anyhow!(
                            "Gemini API blocked the prompt: {}",
                            reason
                        )));
                    }
                }

                if parsed.usage_metadata.is_some() {
                    usage_metadata = parsed.usage_metadata;
                }

                if let Some(candidate) = parsed.candidates.into_iter().next() {
                    saw_candidate = true;
                    for part in candidate.content.parts {
                        if let Part::Text { text: fragment } = part {
                            text.push_str(&fragment);
                        }
                    }
                    if candidate.finish_reason.is_some() {
                        finish_reason = candidate.finish_reason;
                    }
                }
            }
        }

        if !saw_candidate {
            return Err(AppError::Upstream(anyhow!(
                "Gemini API stream contained no candidates"
            )));
        }

        tracing::debug!(
            response_len = text.len(),
            finish_reason = ?finish_reason,
            "Aggregated streamed response from Gemini API"
        );

        Ok(GenerateContentResponse {
            candidates: vec![Candidate {
                content: Content::model(text),
                finish_reason,
            }],
            prompt_feedback: None,
            usage_metadata,
        })
    }
}

/// An ephemeral conversation seeded with prior turns
///
/// Holds exactly the turns it was started with plus the messages sent through
/// it; never persisted across requests.
#[derive(Debug)]
pub struct ChatSession<'a> {
    model: &'a GenerativeModel,
    history: Vec<Content>,
}

impl ChatSession<'_> {
    /// Send a message over the streaming endpoint
    ///
    /// The message is appended to the session history as a user turn and the
    /// whole history is submitted. The streamed reply is aggregated into a
    /// single response object before returning.
    ///
    /// # Errors
    /// Returns `AppError::Upstream` on any failure of the upstream call.
    pub async fn send_message_stream(
        &mut self,
        message: &str,
    ) -> Result<GenerateContentResponse, AppError> {
        self.history.push(Content::user(vec![Part::text(message)]));

        let request = GenerateContentRequest {
            contents: self.history.clone(),
            safety_settings: self.model.safety_settings.clone(),
        };

        self.model.stream_generate_content(&request).await
    }
}

/// Extract the first candidate's text from a response
///
/// Surfaces blocked prompts, missing candidates, and empty text as errors.
fn extract_text(response: &GenerateContentResponse) -> Result<String, AppError> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(AppError::Upstream(anyhow!(
                "Gemini API blocked the prompt: {}",
                reason
            )));
        }
    }

    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| AppError::Upstream(anyhow!("Gemini API response contains no candidates")))?;

    let text = candidate
        .content
        .parts
        .iter()
        .find_map(|part| match part {
            Part::Text { text } => Some(text.clone()),
            _ => None,
        })
        .ok_or_else(|| {
            AppError::Upstream(anyhow!("Gemini API response candidate contains no text part"))
        })?;

    if text.is_empty() {
        return Err(AppError::Upstream(anyhow!(
            "Gemini API response text is empty"
        )));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::safety::default_safety_settings;
    use mockito::{Matcher, Server};
    use serial_test::serial;

    fn test_model(base_url: &str, model: &str) -> GenerativeModel {
        GenerativeModel::new(
            reqwest::Client::new(),
            "test-key",
            model,
            base_url,
            default_safety_settings(),
        )
    }

    #[tokio::test]
    async fn test_generate_content_empty_api_key() {
        let model = GenerativeModel::new(
            reqwest::Client::new(),
            "",
            "gemini-pro-vision",
            GEMINI_API_BASE_URL,
            default_safety_settings(),
        );
        let result = model.generate_content(vec![Part::text("test prompt")]).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key is empty"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_content_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-pro-vision:generateContent")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "key".into(),
                "test-key".into(),
            )]))
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(
                r#"{
                    "candidates": [{
                        "content": {
                            "parts": [{
                                "text": "This is a test response"
                            }],
                            "role": "model"
                        }
                    }]
                }"#,
            )
            .create_async()
            .await;

        let model = test_model(&server.url(), "gemini-pro-vision");
        let result = model.generate_content(vec![Part::text("test prompt")]).await;

        mock.assert_async().await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "This is a test response");
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_content_sends_safety_settings_and_inline_data() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-pro-vision:generateContent")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "key".into(),
                "test-key".into(),
            )]))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "describe this"},
                        {"inlineData": {"mimeType": "image/png", "data": "aGVsbG8="}}
                    ]
                }],
                "safetySettings": [
                    {"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_ONLY_HIGH"},
                    {"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE"}
                ]
            })))
            .with_status(200)
            .with_body(
                r#"{
                    "candidates": [{
                        "content": {"parts": [{"text": "a greeting"}], "role": "model"}
                    }]
                }"#,
            )
            .create_async()
            .await;

        let model = test_model(&server.url(), "gemini-pro-vision");
        let result = model
            .generate_content(vec![
                Part::text("describe this"),
                Part::inline_data("aGVsbG8=", "image/png"),
            ])
            .await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "a greeting");
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_content_empty_candidates() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-pro-vision:generateContent")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "key".into(),
                "test-key".into(),
            )]))
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let model = test_model(&server.url(), "gemini-pro-vision");
        let result = model.generate_content(vec![Part::text("test prompt")]).await;

        mock.assert_async().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no candidates"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_content_blocked_prompt() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-pro-vision:generateContent")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "key".into(),
                "test-key".into(),
            )]))
            .with_status(200)
            .with_body(
                r#"{
                    "candidates": [],
                    "promptFeedback": {
                        "blockReason": "SAFETY"
                    }
                }"#,
            )
            .create_async()
            .await;

        let model = test_model(&server.url(), "gemini-pro-vision");
        let result = model.generate_content(vec![Part::text("test prompt")]).await;

        mock.assert_async().await;
        assert!(result.is_err());
        let error_msg = result.unwrap_err().to_string();
        assert!(
            error_msg.contains("blocked the prompt"),
            "Error message should contain 'blocked the prompt', got: {}",
            error_msg
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_content_rate_limit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-pro-vision:generateContent")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "key".into(),
                "test-key".into(),
            )]))
            .with_status(429)
            .with_body(r#"{"error": "Rate limit exceeded"}"#)
            .create_async()
            .await;

        let model = test_model(&server.url(), "gemini-pro-vision");
        let result = model.generate_content(vec![Part::text("test prompt")]).await;

        mock.assert_async().await;
        assert!(result.is_err());
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("rate limit") || error_msg.contains("429"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_content_invalid_json() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-pro-vision:generateContent")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "key".into(),
                "test-key".into(),
            )]))
            .with_status(200)
            .with_body(r#"This is not JSON"#)
            .create_async()
            .await;

        let model = test_model(&server.url(), "gemini-pro-vision");
        let result = model.generate_content(vec![Part::text("test prompt")]).await;

        mock.assert_async().await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse JSON"));
    }

    #[tokio::test]
    #[serial]
    async fn test_chat_stream_aggregates_chunks() {
        let mut server = Server::new_async().await;
        let sse_body = concat!(
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hello\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\" there\"}]},\"finishReason\":\"STOP\"}],\"usageMetadata\":{\"promptTokenCount\":5,\"candidatesTokenCount\":2,\"totalTokenCount\":7}}\n\n",
        );
        let mock = server
            .mock("POST", "/models/gemini-pro:streamGenerateContent")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "test-key".into()),
                Matcher::UrlEncoded("alt".into(), "sse".into()),
            ]))
            .with_status(200)
            .with_body(sse_body)
            .create_async()
            .await;

        let model = test_model(&server.url(), "gemini-pro");
        let mut session = model.start_chat(vec![
            Content::user(vec![Part::text("hi")]),
            Content::model("Great to meet you. What would you like to know?"),
        ]);
        let result = session.send_message_stream("hi").await;

        mock.assert_async().await;
        let response = result.unwrap();
        let candidate = response.candidates.first().unwrap();
        assert_eq!(candidate.finish_reason.as_deref(), Some("STOP"));
        match candidate.content.parts.first().unwrap() {
            Part::Text { text } => assert_eq!(text, "Hello there"),
            other => panic!("expected text part, got {:?}", other),
        }
        assert_eq!(
            response.usage_metadata.unwrap().total_token_count,
            Some(7)
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_chat_stream_sends_seeded_history() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-pro:streamGenerateContent")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "test-key".into()),
                Matcher::UrlEncoded("alt".into(), "sse".into()),
            ]))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "what is rust"}]},
                    {"role": "model", "parts": [{"text": "Great to meet you. What would you like to know?"}]},
                    {"role": "user", "parts": [{"text": "what is rust"}]}
                ]
            })))
            .with_status(200)
            .with_body("data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"A language.\"}]},\"finishReason\":\"STOP\"}]}\n\n")
            .create_async()
            .await;

        let model = test_model(&server.url(), "gemini-pro");
        let mut session = model.start_chat(vec![
            Content::user(vec![Part::text("what is rust")]),
            Content::model("Great to meet you. What would you like to know?"),
        ]);
        let result = session.send_message_stream("what is rust").await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn test_chat_stream_empty_stream_is_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-pro:streamGenerateContent")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "test-key".into()),
                Matcher::UrlEncoded("alt".into(), "sse".into()),
            ]))
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let model = test_model(&server.url(), "gemini-pro");
        let mut session = model.start_chat(Vec::new());
        let result = session.send_message_stream("hi").await;

        mock.assert_async().await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("no candidates"));
    }
}
