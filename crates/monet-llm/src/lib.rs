//! Monet LLM - Drawing Provider Abstraction
//!
//! This crate provides the provider side of the drawing loop:
//! - Request: Provider-agnostic `DrawingRequest` / `DrawingResponse` and
//!   the context formatting shared by every backend
//! - Provider: The `DrawingProvider` capability trait
//! - Anthropic: Claude with prompt caching and extended thinking
//! - Gemini: Google Gemini with inline image parts and thinking budgets
//! - Mock: Scripted provider for tests and offline runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod provider;
pub mod request;
pub mod util;

pub use error::{Error, Result};
pub use mock::MockProvider;
pub use provider::DrawingProvider;
pub use request::{
    format_context_lines, format_notes, format_notes_block, DrawingRequest, DrawingResponse,
    BLANK_CANVAS_MESSAGE, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_THINKING_BUDGET,
};

// Re-export provider types
pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use gemini::{GeminiConfig, GeminiProvider};
