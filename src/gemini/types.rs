//! Gemini API wire types
//!
//! Structs that mirror the Gemini API JSON request and response format.
//! Response types also implement `Serialize` because the chat route relays
//! the aggregated response object to the caller verbatim.

use serde::{Deserialize, Serialize};

/// Request body for `generateContent` / `streamGenerateContent`
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns to send, oldest first
    pub contents: Vec<Content>,
    /// Content-category thresholds applied to this invocation
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
}

/// A single conversation turn
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Content {
    /// Turn role ("user" or "model")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts of this turn (text and/or inline file data)
    pub parts: Vec<Part>,
}

impl Content {
    /// Build a user turn from the given parts
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    /// Build a model turn holding a single text part
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

/// A single content part: either text or an inline file payload
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Part {
    /// Plain text part
    Text {
        /// The text content
        text: String,
    },
    /// Base64-encoded file bytes embedded directly in the request
    InlineData {
        /// The inline payload
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    /// Build a text part
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// Build an inline-data part from already base64-encoded bytes
    pub fn inline_data(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }
}

/// Base64-encoded file bytes plus their declared MIME type
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// Declared MIME type of the encoded bytes
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

/// A content-category threshold attached to every model invocation
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SafetySetting {
    /// The harm category this setting applies to
    pub category: HarmCategory,
    /// How aggressively to block content in this category
    pub threshold: HarmBlockThreshold,
}

/// Harm categories recognized by the Gemini API
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmCategory {
    /// Harassment content
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    /// Hate speech content
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    /// Sexually explicit content
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    /// Dangerous content
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Blocking thresholds for a harm category
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    /// Never block
    BlockNone,
    /// Block only high-probability harmful content
    BlockOnlyHigh,
    /// Block medium-probability harmful content and above
    BlockMediumAndAbove,
    /// Block low-probability harmful content and above
    BlockLowAndAbove,
}

/// Top-level Gemini API response
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// List of candidate responses from the model
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Optional feedback about the prompt (e.g., if it was blocked)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
    /// Token accounting for the exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

/// A single candidate response from the model
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The content of this candidate
    pub content: Content,
    /// Why the model stopped generating (if applicable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Feedback about the prompt (e.g., if it was blocked)
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked (if applicable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// Token usage reported by the API
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens consumed by the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_token_count: Option<i64>,
    /// Tokens produced by the candidates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates_token_count: Option<i64>,
    /// Total tokens for the exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_token_count: Option<i64>,
}
