//! Gemini API integration
//!
//! Wire types, safety policy, and the HTTP client used to call the hosted
//! generation service.

pub mod client;
pub mod safety;
pub mod types;

pub use client::{ChatSession, GenerativeModel, GEMINI_API_BASE_URL};
