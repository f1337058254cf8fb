//! Error types for monet-core

use thiserror::Error;
use uuid::Uuid;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] monet_llm::Error),

    /// Canvas, rendering or artifact error
    #[error("canvas error: {0}")]
    Canvas(#[from] monet_canvas::Error),

    /// Filesystem error outside artifact writes
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No session registered under the handle
    #[error("no active session {0}; call create_canvas first")]
    SessionNotFound(Uuid),

    /// Session no longer accepts edits
    #[error("drawing {0} is finished; call create_canvas to start a new one")]
    SessionFinished(Uuid),

    /// Operation requires a finished session
    #[error("drawing {0} is not finished yet; call finish_drawing first")]
    SessionNotFinished(Uuid),

    /// A mutation broke rendering and was rolled back
    #[error("{layer_id} caused a render error and was rolled back: {message}")]
    RenderRejected {
        /// Layer the mutation targeted
        layer_id: String,
        /// Renderer message
        message: String,
    },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
