//! Generative-AI helpers for dream entries and per-author statistics.
//!
//! Interpretation, tagging and image prompts are delegated to Gemini; this
//! crate only assembles prompts and applies the fallbacks shown to users when
//! the model is unreachable.

pub mod gemini;
pub mod image;
pub mod prompts;
pub mod stats;

pub use gemini::{AiError, GeminiClient, Interpreter};
pub use prompts::DreamPrompt;
