//! Augmented prompt composition and remote generation via the Gemini API.
//!
//! LLM calls go to the hosted API, so no local model is required.

pub mod gemini;
pub mod prompt;
pub mod types;

pub use gemini::{GeminiClient, GenerationClient};
pub use prompt::PromptComposer;
pub use types::*;
