//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. Loaded once at startup; the API credential is the
//! only required value.

use crate::gemini::GEMINI_API_BASE_URL;
use anyhow::bail;
use std::env;
use std::fmt;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Gemini API configuration
    pub gemini: GeminiConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Gemini API configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API credential for the hosted generation service
    pub api_key: String,
    /// Model used for the multimodal file route
    pub vision_model: String,
    /// Model used for the chat route
    pub chat_model: String,
    /// API base URL (overridable for tests)
    pub api_base_url: String,
}

// The API key must never end up in logs.
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("vision_model", &self.vision_model)
            .field("chat_model", &self.chat_model)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    ///
    /// # Errors
    /// Fails if `GEMINI_API_KEY` is absent or empty; every model-backed route
    /// would fail without it, so startup refuses to proceed.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            bail!("GEMINI_API_KEY environment variable is required");
        }

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(3000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            gemini: GeminiConfig {
                api_key,
                vision_model: env::var("GEMINI_VISION_MODEL")
                    .unwrap_or_else(|_| "gemini-pro-vision".to_string()),
                chat_model: env::var("GEMINI_CHAT_MODEL")
                    .unwrap_or_else(|_| "gemini-pro".to_string()),
                api_base_url: env::var("GEMINI_API_BASE_URL")
                    .unwrap_or_else(|_| GEMINI_API_BASE_URL.to_string()),
            },
        })
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
