//! Error types for monet-canvas

use thiserror::Error;

/// Canvas error type
#[derive(Debug, Error)]
pub enum Error {
    /// Layer not found
    #[error("layer '{0}' does not exist")]
    LayerNotFound(String),

    /// Rasterization failed
    #[error("rendering error: {0}")]
    Render(String),

    /// Artifact I/O failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a rendering error
    #[must_use]
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Get error code for log lines and tool replies
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::LayerNotFound(_) => "layer_not_found",
            Self::Render(_) => "rendering_error",
            Self::Io(_) => "io_error",
        }
    }
}

/// Result type alias for canvas operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::LayerNotFound("layer-9".to_string()).code(),
            "layer_not_found"
        );
        assert_eq!(Error::render("bad path data").code(), "rendering_error");
    }

    #[test]
    fn test_error_display() {
        let msg = Error::LayerNotFound("layer-9".to_string()).to_string();
        assert!(msg.contains("layer-9"));
        assert!(msg.contains("does not exist"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert_eq!(err.code(), "io_error");
    }
}
