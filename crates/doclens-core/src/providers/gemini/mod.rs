//! Gemini provider: Files API and content generation.

pub mod api;
mod files;
mod shared;

pub use api::{GeminiClient, GeminiConfig};
