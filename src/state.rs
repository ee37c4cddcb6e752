//! Shared application state
//!
//! The two model handles built at startup are the only state shared across
//! requests. Both are immutable after construction, so handlers receive the
//! state as a plain `Arc` without any locking.

use crate::config::Config;
use crate::gemini::safety::default_safety_settings;
use crate::gemini::GenerativeModel;

/// Read-only state injected into every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle for the multimodal file route
    pub vision_model: GenerativeModel,
    /// Handle for the chat route
    pub chat_model: GenerativeModel,
}

impl AppState {
    /// Build the model handles from configuration
    ///
    /// Both handles share one `reqwest::Client` (connection pooling) and the
    /// same fixed safety policy.
    pub fn from_config(config: &Config) -> Self {
        let client = reqwest::Client::new();
        let safety_settings = default_safety_settings();

        Self {
            vision_model: GenerativeModel::new(
                client.clone(),
                &config.gemini.api_key,
                &config.gemini.vision_model,
                &config.gemini.api_base_url,
                safety_settings.clone(),
            ),
            chat_model: GenerativeModel::new(
                client,
                &config.gemini.api_key,
                &config.gemini.chat_model,
                &config.gemini.api_base_url,
                safety_settings,
            ),
        }
    }
}
