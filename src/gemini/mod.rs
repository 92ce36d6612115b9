//! Gemini `generateContent` client used as the summarization backend.

mod answer;
pub mod client;
mod types;

pub use client::{GeminiClient, GeminiError, LanguageModel};
