//! SVG Canvas
//!
//! This module defines the layer store for a drawing session.
//! A canvas is an ordered list of layers, each holding raw SVG elements and
//! optional `<defs>` content. Layers are composited in insertion order, so
//! later layers sit on top of earlier ones.

use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Summary returned by [`SvgCanvas::layer_summary`] when no layers exist
pub const NO_LAYERS_SUMMARY: &str = "No layers yet.";

/// Opening tags: `<` followed by a letter (closing tags start with `</`)
static OPENING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[a-zA-Z]").expect("OPENING_TAG is a compile-time constant")
});

/// A single layer of SVG content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Layer identifier (`layer-N`)
    pub id: String,
    /// Raw SVG elements, trimmed
    pub elements: String,
    /// Layer-local defs content, trimmed and non-empty when present
    pub defs: Option<String>,
}

impl Layer {
    /// Approximate number of SVG elements in this layer
    #[must_use]
    pub fn element_count(&self) -> usize {
        count_elements(&self.elements)
    }
}

/// Count opening tags in a fragment of markup.
///
/// This is an approximation: nested and self-closing elements are counted
/// once per `<name`, and text that happens to contain `<x` is counted too.
#[must_use]
pub fn count_elements(markup: &str) -> usize {
    OPENING_TAG.find_iter(markup).count()
}

/// Normalize optional defs: trimmed, and `None` when blank
fn normalize_defs(defs: Option<&str>) -> Option<String> {
    defs.map(str::trim)
        .filter(|d| !d.is_empty())
        .map(ToString::to_string)
}

/// Layered SVG canvas
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Background fill color
    pub background: String,
    layers: Vec<Layer>,
    next_layer: u64,
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self::new(800, 600, "#FFFFFF")
    }
}

impl SvgCanvas {
    /// Create an empty canvas
    #[must_use]
    pub fn new(width: u32, height: u32, background: impl Into<String>) -> Self {
        Self {
            width,
            height,
            background: background.into(),
            layers: Vec::new(),
            next_layer: 1,
        }
    }

    /// Append a new layer on top of the existing ones and return its id.
    ///
    /// No validation happens here; callers that need a known-good canvas
    /// render afterwards and call [`SvgCanvas::remove_layer`] on failure.
    pub fn add_layer(&mut self, elements: &str, defs: Option<&str>) -> String {
        let id = format!("layer-{}", self.next_layer);
        self.next_layer += 1;
        self.layers.push(Layer {
            id: id.clone(),
            elements: elements.trim().to_string(),
            defs: normalize_defs(defs),
        });
        id
    }

    /// Replace the content of an existing layer, keeping its position.
    ///
    /// Fresh non-empty defs overwrite the stored ones; otherwise any stored
    /// defs for the layer are dropped.
    pub fn replace_layer(
        &mut self,
        layer_id: &str,
        elements: &str,
        defs: Option<&str>,
    ) -> Result<()> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == layer_id)
            .ok_or_else(|| Error::LayerNotFound(layer_id.to_string()))?;

        layer.elements = elements.trim().to_string();
        layer.defs = normalize_defs(defs);
        Ok(())
    }

    /// Put back a layer's previous content after a failed replacement
    pub fn restore_layer(&mut self, previous: Layer) -> Result<()> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == previous.id)
            .ok_or_else(|| Error::LayerNotFound(previous.id.clone()))?;
        *layer = previous;
        Ok(())
    }

    /// Remove a layer and its defs. The id is never handed out again.
    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Layer> {
        let pos = self.layers.iter().position(|l| l.id == layer_id)?;
        Some(self.layers.remove(pos))
    }

    /// Set the background fill
    pub fn set_background(&mut self, color: impl Into<String>) {
        self.background = color.into();
    }

    /// Get a layer by id
    #[must_use]
    pub fn layer(&self, layer_id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == layer_id)
    }

    /// All layers in composite order
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layer ids in composite order
    #[must_use]
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    /// Number of layers
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the canvas has no layers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Serialize the canvas into a standalone SVG document
    #[must_use]
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(
            out,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            self.background
        );

        let defs: Vec<&str> = self.layers.iter().filter_map(|l| l.defs.as_deref()).collect();
        if !defs.is_empty() {
            out.push_str("  <defs>\n");
            for block in defs {
                push_indented(&mut out, block);
            }
            out.push_str("  </defs>\n");
        }

        for layer in &self.layers {
            let _ = writeln!(out, r#"  <g id="{}">"#, layer.id);
            push_indented(&mut out, &layer.elements);
            out.push_str("  </g>\n");
        }

        out.push_str("</svg>");
        out
    }

    /// Human-readable per-layer summary, e.g. `layer-1: ~3 elements`
    #[must_use]
    pub fn layer_summary(&self) -> String {
        if self.layers.is_empty() {
            return NO_LAYERS_SUMMARY.to_string();
        }
        self.layers
            .iter()
            .map(|l| format!("{}: ~{} elements", l.id, l.element_count()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn push_indented(out: &mut String, content: &str) {
    for line in content.lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_ids_are_sequential() {
        let mut canvas = SvgCanvas::default();
        assert_eq!(canvas.add_layer("<rect/>", None), "layer-1");
        assert_eq!(canvas.add_layer("<circle/>", None), "layer-2");
        assert_eq!(canvas.add_layer("<path/>", None), "layer-3");
        assert_eq!(canvas.layer_ids(), vec!["layer-1", "layer-2", "layer-3"]);
    }

    #[test]
    fn test_layer_ids_not_reused_after_removal() {
        let mut canvas = SvgCanvas::default();
        canvas.add_layer("<rect/>", None);
        let second = canvas.add_layer("<circle/>", Some("<linearGradient id=\"g\"/>"));
        assert!(canvas.remove_layer(&second).is_some());

        assert_eq!(canvas.add_layer("<path/>", None), "layer-3");
        assert_eq!(canvas.layer_ids(), vec!["layer-1", "layer-3"]);
        assert!(!canvas.to_svg().contains("linearGradient"));
    }

    #[test]
    fn test_add_layer_trims_content() {
        let mut canvas = SvgCanvas::default();
        let id = canvas.add_layer("  \n<rect/>\n  ", Some("   "));
        let layer = canvas.layer(&id).unwrap();
        assert_eq!(layer.elements, "<rect/>");
        assert!(layer.defs.is_none());
    }

    #[test]
    fn test_replace_missing_layer_leaves_store_unchanged() {
        let mut canvas = SvgCanvas::default();
        canvas.add_layer("<rect/>", Some("<filter id=\"f\"/>"));
        let before = canvas.layers().to_vec();

        let err = canvas.replace_layer("layer-7", "<circle/>", None).unwrap_err();
        assert!(matches!(err, Error::LayerNotFound(ref id) if id == "layer-7"));
        assert_eq!(canvas.layers(), before.as_slice());
    }

    #[test]
    fn test_replace_without_defs_clears_defs() {
        let mut canvas = SvgCanvas::default();
        let id = canvas.add_layer("<rect/>", Some("<filter id=\"f\"/>"));
        canvas.replace_layer(&id, "<circle/>", None).unwrap();

        let layer = canvas.layer(&id).unwrap();
        assert_eq!(layer.elements, "<circle/>");
        assert!(layer.defs.is_none());
    }

    #[test]
    fn test_replace_with_defs_overwrites() {
        let mut canvas = SvgCanvas::default();
        let id = canvas.add_layer("<rect/>", Some("<filter id=\"old\"/>"));
        canvas
            .replace_layer(&id, "<circle/>", Some("<filter id=\"new\"/>"))
            .unwrap();

        assert_eq!(
            canvas.layer(&id).unwrap().defs.as_deref(),
            Some("<filter id=\"new\"/>")
        );
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut canvas = SvgCanvas::default();
        canvas.add_layer("<rect/>", None);
        canvas.add_layer("<circle/>", None);
        canvas.replace_layer("layer-1", "<ellipse/>", None).unwrap();

        let svg = canvas.to_svg();
        let first = svg.find("<ellipse/>").unwrap();
        let second = svg.find("<circle/>").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_restore_layer() {
        let mut canvas = SvgCanvas::default();
        let id = canvas.add_layer("<rect/>", Some("<filter id=\"f\"/>"));
        let previous = canvas.layer(&id).cloned().unwrap();
        canvas.replace_layer(&id, "<broken", None).unwrap();
        canvas.restore_layer(previous.clone()).unwrap();
        assert_eq!(canvas.layer(&id), Some(&previous));
    }

    #[test]
    fn test_empty_canvas_svg() {
        let canvas = SvgCanvas::new(320, 200, "#112233");
        let svg = canvas.to_svg();

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("viewBox=\"0 0 320 200\""));
        assert!(svg.contains(r##"<rect width="100%" height="100%" fill="#112233"/>"##));
        assert!(!svg.contains("<g "));
        assert!(!svg.contains("<defs>"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_defs_aggregated_once() {
        let mut canvas = SvgCanvas::default();
        canvas.add_layer("<rect fill=\"url(#a)\"/>", Some("<linearGradient id=\"a\"/>"));
        canvas.add_layer("<circle/>", None);
        canvas.add_layer("<path filter=\"url(#b)\"/>", Some("<filter id=\"b\"/>"));

        let svg = canvas.to_svg();
        assert_eq!(svg.matches("<defs>").count(), 1);
        let a = svg.find("linearGradient").unwrap();
        let b = svg.find("<filter").unwrap();
        let first_group = svg.find("<g id=\"layer-1\">").unwrap();
        assert!(a < b && b < first_group);
    }

    #[test]
    fn test_summary_empty_sentinel() {
        let canvas = SvgCanvas::default();
        assert_eq!(canvas.layer_summary(), NO_LAYERS_SUMMARY);
    }

    #[test]
    fn test_summary_counts_opening_tags() {
        let mut canvas = SvgCanvas::default();
        canvas.add_layer("<g><rect/><circle></circle></g>", None);
        canvas.add_layer("<text>hi</text>", None);
        assert_eq!(
            canvas.layer_summary(),
            "layer-1: ~3 elements, layer-2: ~1 elements"
        );
    }
}
