//! Monet Canvas - Layered SVG Canvas
//!
//! This crate provides the drawing surface for Monet:
//! - Canvas: Ordered SVG layers with per-layer defs, composited on demand
//! - Render: Rasterizer seam and the resvg-backed PNG renderer
//! - Artifacts: Session directory naming and SVG/PNG persistence
//! - Error: Error types for canvas operations
//!
//! ## Usage
//!
//! ```
//! use monet_canvas::SvgCanvas;
//!
//! let mut canvas = SvgCanvas::new(800, 600, "#FFFFFF");
//! let id = canvas.add_layer(r#"<circle cx="400" cy="300" r="50"/>"#, None);
//! assert_eq!(id, "layer-1");
//! assert!(canvas.to_svg().contains(r#"<g id="layer-1">"#));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod artifacts;
pub mod canvas;
pub mod error;
pub mod render;

pub use artifacts::{iteration_stem, save_png, save_svg, session_dir, slugify};
pub use canvas::{Layer, SvgCanvas, NO_LAYERS_SUMMARY};
pub use error::{Error, Result};
pub use render::{render_base64, Rasterizer, ResvgRasterizer, DEFAULT_EXPORT_SCALE};
