//! Drawing session state
//!
//! The mutable record of one run. The driver owns the only `&mut` to a
//! session while it runs, and it is the only writer of `iteration`.

use monet_canvas::SvgCanvas;
use monet_llm::{DrawingResponse, DEFAULT_THINKING_BUDGET};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Default iteration budget
pub const DEFAULT_MAX_ITERATIONS: u32 = 25;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Iteration 0, reasoning only
    Planning,
    /// Bounded drawing turns
    Iterating,
    /// No more turns will be requested
    Terminated,
}

/// Cumulative token usage, never decreasing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageTotals {
    /// Input tokens
    pub input_tokens: u64,
    /// Output tokens
    pub output_tokens: u64,
    /// Input tokens read from cache
    pub cache_read_tokens: u64,
    /// Input tokens written to cache
    pub cache_creation_tokens: u64,
    /// Reasoning tokens
    pub thinking_tokens: u64,
}

impl UsageTotals {
    /// Add one response's counters
    pub fn add(&mut self, response: &DrawingResponse) {
        self.input_tokens += response.input_tokens;
        self.output_tokens += response.output_tokens;
        self.cache_read_tokens += response.cache_read_tokens;
        self.cache_creation_tokens += response.cache_creation_tokens;
        self.thinking_tokens += response.thinking_tokens;
    }
}

impl fmt::Display for UsageTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "in={}, out={}, cache_read={}, cache_create={}, thinking={}",
            self.input_tokens,
            self.output_tokens,
            self.cache_read_tokens,
            self.cache_creation_tokens,
            self.thinking_tokens
        )
    }
}

/// One drawing run
#[derive(Debug)]
pub struct DrawingSession {
    /// The user's art prompt
    pub prompt: String,
    /// Canvas owned by this session
    pub canvas: SvgCanvas,
    /// Directory receiving every artifact
    pub output_dir: PathBuf,
    /// Iteration budget (at least 1)
    pub max_iterations: u32,
    /// Request extended reasoning on drawing turns
    pub thinking_enabled: bool,
    /// Extended reasoning budget
    pub thinking_budget: u32,
    pub(crate) iteration: u32,
    pub(crate) notes_history: Vec<String>,
    pub(crate) empty_streak: u32,
    pub(crate) phase: SessionPhase,
    pub(crate) usage: UsageTotals,
}

impl DrawingSession {
    /// Create a session in the planning phase
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        canvas: SvgCanvas,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            canvas,
            output_dir: output_dir.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            thinking_enabled: false,
            thinking_budget: DEFAULT_THINKING_BUDGET,
            iteration: 0,
            notes_history: Vec::new(),
            empty_streak: 0,
            phase: SessionPhase::Planning,
            usage: UsageTotals::default(),
        }
    }

    /// Set the iteration budget (clamped to at least 1)
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Enable extended reasoning with a budget
    #[must_use]
    pub fn with_thinking(mut self, enabled: bool, budget: u32) -> Self {
        self.thinking_enabled = enabled;
        self.thinking_budget = budget;
        self
    }

    /// Current iteration (0 while planning)
    #[must_use]
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Notes so far, oldest first; a plan note is tagged `[Plan]`
    #[must_use]
    pub fn notes_history(&self) -> &[String] {
        &self.notes_history
    }

    /// Consecutive turns without an applied directive
    #[must_use]
    pub fn empty_streak(&self) -> u32 {
        self.empty_streak
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Cumulative token usage
    #[must_use]
    pub fn usage(&self) -> &UsageTotals {
        &self.usage
    }

    /// Artist log path
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(crate::logger::LOG_FILE_NAME)
    }
}
