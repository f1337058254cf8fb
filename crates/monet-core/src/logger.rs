//! Session Logger
//!
//! Append-only artist log for one session directory. Every line goes to the
//! log file and, in verbose mode, to the `monet::session` tracing target.
//! Write failures are reported once and never abort the session.

use monet_canvas::SvgCanvas;
use monet_llm::DrawingResponse;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{info, warn};

use crate::parser::ParsedResponse;
use crate::session::UsageTotals;

/// Artist log file name inside a session directory
pub const LOG_FILE_NAME: &str = "artist-log.txt";

const RULE: &str = "========================================";

/// Best-effort writer for `artist-log.txt`
pub struct SessionLogger {
    path: PathBuf,
    verbose: bool,
    file: Mutex<Option<File>>,
    write_failed: AtomicBool,
}

impl fmt::Debug for SessionLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLogger")
            .field("path", &self.path)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl SessionLogger {
    /// Open `path`, truncating any previous log
    pub fn new(path: impl Into<PathBuf>, verbose: bool) -> Self {
        let path = path.into();
        let logger = Self {
            file: Mutex::new(None),
            write_failed: AtomicBool::new(false),
            verbose,
            path,
        };
        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&logger.path)
        {
            Ok(file) => *logger.file.lock().unwrap_or_else(|e| e.into_inner()) = Some(file),
            Err(e) => logger.report_failure(&e),
        }
        logger
    }

    /// Log file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn report_failure(&self, error: &std::io::Error) {
        if !self.write_failed.swap(true, Ordering::Relaxed) {
            warn!(path = %self.path.display(), error = %error, "Artist log is not writable");
        }
    }

    /// Append one line
    pub fn log(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if self.verbose {
            info!(target: "monet::session", "{line}");
        }
        self.write_line(line);
    }

    fn write_line(&self, line: &str) {
        let mut guard = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(file) = guard.as_mut() {
            if let Err(e) = writeln!(file, "{line}") {
                self.report_failure(&e);
            }
        }
    }

    /// Append a warning line, also emitted as a tracing warning
    pub fn warn(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        warn!("{message}");
        self.write_line(&format!("WARNING: {message}"));
    }

    /// Session header: prompt, provider identity, canvas and limits
    pub fn session_header(
        &self,
        prompt: &str,
        provider: &str,
        model: &str,
        canvas: &SvgCanvas,
        max_iterations: u32,
        thinking_budget: Option<u32>,
    ) {
        self.log(format!("Prompt: {prompt}"));
        self.log(format!("Provider: {provider} ({model})"));
        self.log(format!(
            "Canvas: {}x{}, bg={}",
            canvas.width, canvas.height, canvas.background
        ));
        self.log(format!("Max iterations: {max_iterations}"));
        match thinking_budget {
            Some(budget) => self.log(format!("Thinking: enabled (budget {budget})")),
            None => self.log("Thinking: disabled"),
        }
        self.log("");
    }

    /// Boundary before a drawing turn
    pub fn iteration_marker(&self, iteration: u32) {
        self.log(RULE);
        self.log(format!("== Iteration {iteration}"));
    }

    /// Boundary before the planning turn
    pub fn planning_marker(&self) {
        self.log(RULE);
        self.log("== Planning");
    }

    /// Provider diagnostics, model and token breakdown
    pub fn log_response(&self, response: &DrawingResponse) {
        for line in &response.provider_log {
            self.log(format!("[provider] {line}"));
        }
        if !response.model.is_empty() {
            self.log(format!("Model: {}", response.model));
        }
        self.log(format!(
            "Tokens: in={}, out={}, cache_read={}, cache_create={}, thinking={}",
            response.input_tokens,
            response.output_tokens,
            response.cache_read_tokens,
            response.cache_creation_tokens,
            response.thinking_tokens
        ));
    }

    /// Notes and directive summaries of a parsed answer
    pub fn log_parsed(&self, parsed: &ParsedResponse) {
        if !parsed.notes.is_empty() {
            self.log("");
            self.log(&parsed.notes);
            self.log("");
        }
        if let Some(background) = &parsed.background {
            self.log(format!("[Background -> {background}]"));
        }
        if let Some(layer_id) = &parsed.replace_layer_id {
            self.log(format!("[Replace {layer_id}]"));
        }
        if !parsed.svg_elements.is_empty() {
            let defs = if parsed.defs_elements.is_empty() {
                ""
            } else {
                " with defs"
            };
            self.log(format!("[New layer: ~{} elements{defs}]", parsed.element_count()));
        }
        if !parsed.has_directive() {
            self.log("WARNING: no usable directive (no new markup or replace-layer)");
        }
        self.log(format!("[Status: {}]", parsed.status));
    }

    /// Session footer: iterations, final layers, totals and stop reason
    pub fn session_footer(
        &self,
        iterations: u32,
        layer_summary: &str,
        usage: &UsageTotals,
        stop_reason: impl fmt::Display,
    ) {
        self.log("");
        self.log(RULE);
        self.log(format!("== Finished: {stop_reason}"));
        self.log(format!("Iterations: {iterations}"));
        self.log(format!("Layers: {layer_summary}"));
        self.log(format!("Total tokens: {usage}"));
    }
}
