//! Safety policy for model invocations
//!
//! The gateway attaches a fixed, request-independent set of content-category
//! thresholds to every Gemini call. The policy is built once at startup and
//! shared read-only across requests.

use crate::gemini::types::{HarmBlockThreshold, HarmCategory, SafetySetting};

/// The fixed safety policy attached to every model invocation
///
/// Harassment is blocked only at high probability; hate speech at medium
/// probability and above.
pub fn default_safety_settings() -> Vec<SafetySetting> {
    vec![
        SafetySetting {
            category: HarmCategory::Harassment,
            threshold: HarmBlockThreshold::BlockOnlyHigh,
        },
        SafetySetting {
            category: HarmCategory::HateSpeech,
            threshold: HarmBlockThreshold::BlockMediumAndAbove,
        },
    ]
}
