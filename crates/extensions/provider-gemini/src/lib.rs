//! # TrafficLens Provider - Gemini
//!
//! Google Gemini `generateContent` backend for traffic analysis.

mod client;
mod provider;
mod types;

pub use client::{BASE_URL, GeminiClient};
pub use provider::{DEFAULT_MODEL, GeminiProvider};
pub use types::*;
