//! Rasterization
//!
//! This module converts serialized canvases into PNG bytes.
//! The [`Rasterizer`] trait is the seam the session driver renders through,
//! so validation and rollback can be exercised without a real renderer.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use resvg::{tiny_skia, usvg};
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};

/// Scale used for final high-resolution exports
pub const DEFAULT_EXPORT_SCALE: f32 = 2.0;

/// Renders SVG documents to PNG bytes
pub trait Rasterizer: Send + Sync {
    /// Render `svg` at `scale` (1.0 = native size) and return PNG bytes
    fn render(&self, svg: &str, scale: f32) -> Result<Vec<u8>>;
}

/// Render at native size and base64-encode the PNG for a provider request
pub fn render_base64(rasterizer: &dyn Rasterizer, svg: &str) -> Result<String> {
    let png = rasterizer.render(svg, 1.0)?;
    Ok(STANDARD.encode(png))
}

/// Rasterizer backed by resvg
pub struct ResvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResvgRasterizer {
    /// Create a rasterizer with the system fonts loaded
    #[must_use]
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    /// Create a rasterizer without loading any fonts (text is skipped)
    #[must_use]
    pub fn without_fonts() -> Self {
        Self {
            fontdb: Arc::new(usvg::fontdb::Database::new()),
        }
    }
}

impl Rasterizer for ResvgRasterizer {
    fn render(&self, svg: &str, scale: f32) -> Result<Vec<u8>> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::render(format!("invalid scale {scale}")));
        }

        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|e| Error::render(e.to_string()))?;

        let size = tree.size().to_int_size();
        let width = (size.width() as f32 * scale).ceil() as u32;
        let height = (size.height() as f32 * scale).ceil() as u32;
        debug!(width, height, scale, "Rasterizing canvas");

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| Error::render(format!("cannot allocate {width}x{height} pixmap")))?;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        pixmap.encode_png().map_err(|e| Error::render(e.to_string()))
    }
}
