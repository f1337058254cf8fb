//! Response Parser
//!
//! Extracts drawing directives from a model's free-form answer. The grammar
//! is a handful of XML-ish tags:
//!
//! ```text
//! <notes>…</notes>            planning notes carried to the next turn
//! <defs>…</defs>              gradients, filters, patterns for the new layer
//! <svg-elements>…</svg-elements>
//! <status>continue|done</status>
//! <background>#hex</background>
//! <replace-layer id="layer-N">…</replace-layer>
//! ```
//!
//! Parsing never fails. Missing or malformed tags yield empty fields, so a
//! confused answer becomes a turn that does nothing.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static NOTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<notes>(.*?)</notes>").expect("NOTES is a compile-time constant")
});

static SVG_ELEMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<svg-elements>(.*?)</svg-elements>")
        .expect("SVG_ELEMENTS is a compile-time constant")
});

static DEFS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<defs>(.*?)</defs>").expect("DEFS is a compile-time constant")
});

static STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<status>(.*?)</status>").expect("STATUS is a compile-time constant")
});

static BACKGROUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<background>(.*?)</background>")
        .expect("BACKGROUND is a compile-time constant")
});

static REPLACE_LAYER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<replace-layer\s+id="([^"]+)">(.*?)</replace-layer>"#)
        .expect("REPLACE_LAYER is a compile-time constant")
});

/// Whether the artist wants another turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtistStatus {
    /// Keep iterating
    #[default]
    Continue,
    /// The piece is complete
    Done,
}

impl ArtistStatus {
    /// Normalize a raw `<status>` value; unknown values mean continue
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "done" | "complete" | "finished" => Self::Done,
            _ => Self::Continue,
        }
    }

    /// Lowercase name used in logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ArtistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directives extracted from one model answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Artist notes
    pub notes: String,
    /// Markup for a new layer
    pub svg_elements: String,
    /// Defs for the new layer
    pub defs_elements: String,
    /// Target of a replace-layer block
    pub replace_layer_id: Option<String>,
    /// Body of a replace-layer block
    pub replace_elements: Option<String>,
    /// Continue or done
    pub status: ArtistStatus,
    /// Requested background color
    pub background: Option<String>,
}

impl ParsedResponse {
    /// Whether the answer carries new markup or a replace directive
    #[must_use]
    pub fn has_directive(&self) -> bool {
        !self.svg_elements.is_empty() || self.replace_layer_id.is_some()
    }

    /// Whether the answer carries anything that would touch the canvas
    #[must_use]
    pub fn has_canvas_directive(&self) -> bool {
        self.has_directive() || !self.defs_elements.is_empty() || self.background.is_some()
    }

    /// Approximate element count of the new markup
    #[must_use]
    pub fn element_count(&self) -> usize {
        monet_canvas::canvas::count_elements(&self.svg_elements)
    }
}

fn extract_tag(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Parse a raw model answer into directives
#[must_use]
pub fn parse_response(text: &str) -> ParsedResponse {
    let background = extract_tag(&BACKGROUND, text);
    let (replace_layer_id, replace_elements) = match REPLACE_LAYER.captures(text) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().to_string()),
            caps.get(2).map(|m| m.as_str().trim().to_string()),
        ),
        None => (None, None),
    };

    ParsedResponse {
        notes: extract_tag(&NOTES, text),
        svg_elements: extract_tag(&SVG_ELEMENTS, text),
        defs_elements: extract_tag(&DEFS, text),
        replace_layer_id,
        replace_elements,
        status: ArtistStatus::from_raw(&extract_tag(&STATUS, text)),
        background: (!background.is_empty()).then_some(background),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_response() {
        let raw = r##"
<notes>
Sky first, then hills.
</notes>
<defs><linearGradient id="iter1-sky"/></defs>
<svg-elements>
  <rect width="800" height="300" fill="url(#iter1-sky)"/>
  <circle cx="600" cy="100" r="40"/>
</svg-elements>
<status>continue</status>
"##;
        let parsed = parse_response(raw);
        assert_eq!(parsed.notes, "Sky first, then hills.");
        assert_eq!(parsed.defs_elements, r#"<linearGradient id="iter1-sky"/>"#);
        assert!(parsed.svg_elements.starts_with("<rect"));
        assert!(parsed.svg_elements.ends_with("r=\"40\"/>"));
        assert_eq!(parsed.status, ArtistStatus::Continue);
        assert_eq!(parsed.element_count(), 2);
        assert!(parsed.background.is_none());
        assert!(parsed.has_directive());
    }

    #[test]
    fn test_status_synonyms() {
        for raw in ["done", "DONE", " Complete ", "finished"] {
            let parsed = parse_response(&format!("<status>{raw}</status>"));
            assert_eq!(parsed.status, ArtistStatus::Done, "status {raw:?}");
        }
        assert_eq!(
            parse_response("<status>keep going</status>").status,
            ArtistStatus::Continue
        );
    }

    #[test]
    fn test_missing_status_means_continue() {
        let parsed = parse_response("<notes>hmm</notes>");
        assert_eq!(parsed.status, ArtistStatus::Continue);
        assert!(!parsed.has_directive());
    }

    #[test]
    fn test_garbage_never_panics() {
        for raw in ["", "<notes>unterminated", "</svg-elements><svg-elements>", "<<<>>>"] {
            let parsed = parse_response(raw);
            assert!(parsed.svg_elements.is_empty());
            assert_eq!(parsed.status, ArtistStatus::Continue);
        }
    }

    #[test]
    fn test_first_match_wins() {
        let parsed = parse_response("<notes>one</notes><notes>two</notes>");
        assert_eq!(parsed.notes, "one");
    }

    #[test]
    fn test_replace_layer_block() {
        let raw = r##"<replace-layer id="layer-3">
  <circle cx="1" cy="1" r="1" fill="#f00"/>
</replace-layer>"##;
        let parsed = parse_response(raw);
        assert_eq!(parsed.replace_layer_id.as_deref(), Some("layer-3"));
        assert_eq!(
            parsed.replace_elements.as_deref(),
            Some(r##"<circle cx="1" cy="1" r="1" fill="#f00"/>"##)
        );
        assert!(parsed.has_directive());
    }

    #[test]
    fn test_replace_layer_absent() {
        let parsed = parse_response(r#"<replace-layer>no id</replace-layer>"#);
        assert!(parsed.replace_layer_id.is_none());
        assert!(parsed.replace_elements.is_none());
    }

    #[test]
    fn test_background() {
        let parsed = parse_response("<background> #1a1a2e </background>");
        assert_eq!(parsed.background.as_deref(), Some("#1a1a2e"));
        assert!(parse_response("<background>  </background>").background.is_none());
        assert!(parse_response("<background>#000</background>").has_canvas_directive());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ArtistStatus::Done.to_string(), "done");
        assert_eq!(ArtistStatus::default().to_string(), "continue");
    }
}
