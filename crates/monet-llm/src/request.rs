//! Drawing request and response types
//!
//! These are the provider-agnostic values exchanged with a backend on every
//! turn. Providers lay the request out as a stable prefix (art prompt, notes
//! history) followed by a volatile suffix (canvas image, iteration context),
//! which lets prefix-caching backends reuse earlier turns.

use serde::{Deserialize, Serialize};

/// Default output token budget per turn
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Default extended-thinking budget
pub const DEFAULT_THINKING_BUDGET: u32 = 4096;

/// Context line shown on the first turn when there are no notes yet
pub const BLANK_CANVAS_MESSAGE: &str = "This is the blank canvas. Begin your artwork.";

/// Nudge appended once notes exist
const REPETITION_NUDGE: &str =
    "If your notes are repeating similar ideas, move on to the next stage or set status to done.";

/// A single drawing turn sent to a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingRequest {
    /// System prompt
    pub system_prompt: String,
    /// Current canvas preview, base64-encoded PNG
    pub canvas_png_base64: String,
    /// The user's art prompt
    pub original_prompt: String,
    /// Iteration number (0 = planning)
    pub iteration: u32,
    /// Human-readable layer summary
    pub layer_summary: String,
    /// Notes from previous turns, oldest first
    pub notes_history: Vec<String>,
    /// Output token budget
    pub max_output_tokens: u32,
    /// Replaces the default per-turn message when set
    pub iteration_message: Option<String>,
    /// Request extended reasoning
    pub thinking_enabled: bool,
    /// Extended reasoning budget in tokens
    pub thinking_budget: u32,
}

impl Default for DrawingRequest {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            canvas_png_base64: String::new(),
            original_prompt: String::new(),
            iteration: 0,
            layer_summary: String::new(),
            notes_history: Vec::new(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            iteration_message: None,
            thinking_enabled: false,
            thinking_budget: DEFAULT_THINKING_BUDGET,
        }
    }
}

/// A provider's answer to a [`DrawingRequest`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingResponse {
    /// Concatenated text output (thinking excluded)
    pub raw_text: String,
    /// Input tokens billed
    pub input_tokens: u64,
    /// Output tokens billed
    pub output_tokens: u64,
    /// Input tokens served from cache
    pub cache_read_tokens: u64,
    /// Input tokens written to cache
    pub cache_creation_tokens: u64,
    /// Estimated reasoning tokens
    pub thinking_tokens: u64,
    /// Model that produced the response
    pub model: String,
    /// Provider diagnostics, one line each
    pub provider_log: Vec<String>,
}

impl DrawingResponse {
    /// Create a response carrying only text
    #[must_use]
    pub fn text(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Self::default()
        }
    }

    /// Set the input/output token counts
    #[must_use]
    pub fn with_tokens(mut self, input: u64, output: u64) -> Self {
        self.input_tokens = input;
        self.output_tokens = output;
        self
    }

    /// Set the cache read/creation token counts
    #[must_use]
    pub fn with_cache_tokens(mut self, read: u64, creation: u64) -> Self {
        self.cache_read_tokens = read;
        self.cache_creation_tokens = creation;
        self
    }

    /// Set the thinking token count
    #[must_use]
    pub fn with_thinking_tokens(mut self, thinking: u64) -> Self {
        self.thinking_tokens = thinking;
        self
    }

    /// Set the model name
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// One formatted entry per note: `== Iteration N notes ==\n<note>`
#[must_use]
pub fn format_notes(notes_history: &[String]) -> Vec<String> {
    notes_history
        .iter()
        .enumerate()
        .map(|(i, note)| format!("== Iteration {} notes ==\n{}", i + 1, note))
        .collect()
}

/// The full notes section of a request, or `None` without notes
#[must_use]
pub fn format_notes_block(notes_history: &[String]) -> Option<String> {
    if notes_history.is_empty() {
        return None;
    }
    Some(format!(
        "Your notes from previous iterations:\n\n{}",
        format_notes(notes_history).join("\n\n")
    ))
}

/// The volatile per-turn context text
#[must_use]
pub fn format_context_lines(request: &DrawingRequest) -> String {
    let mut lines = vec![
        format!("Iteration: {}", request.iteration),
        format!("Layers: {}", request.layer_summary),
    ];
    if let Some(message) = &request.iteration_message {
        lines.push(message.clone());
    } else if request.notes_history.is_empty() {
        lines.push(BLANK_CANVAS_MESSAGE.to_string());
    }
    if !request.notes_history.is_empty() {
        lines.push(REPETITION_NUDGE.to_string());
    }
    lines.join("\n")
}
