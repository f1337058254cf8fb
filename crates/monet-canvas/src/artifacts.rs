//! Artifact persistence
//!
//! Naming and writing of the files a drawing session leaves behind:
//! per-iteration snapshots (`iter-001.svg`), final exports and the session
//! directory itself.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Default maximum slug length for session directory names
const MAX_SLUG_LEN: usize = 40;

/// File stem for an iteration snapshot, e.g. `iter-007`
#[must_use]
pub fn iteration_stem(iteration: u32) -> String {
    format!("iter-{iteration:03}")
}

/// Lowercase, dash-separated, ASCII-only slug truncated to `max_len`
#[must_use]
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(max_len);
    slug.trim_end_matches('-').to_string()
}

/// Session directory `<root>/<YYYYmmdd_HHMMSS>_<slug>` for a prompt
#[must_use]
pub fn session_dir(root: &Path, prompt: &str, now: DateTime<Local>) -> PathBuf {
    let timestamp = now.format("%Y%m%d_%H%M%S");
    let slug = slugify(prompt, MAX_SLUG_LEN);
    if slug.is_empty() {
        root.join(timestamp.to_string())
    } else {
        root.join(format!("{timestamp}_{slug}"))
    }
}

/// Write an SVG document
pub fn save_svg(path: &Path, svg: &str) -> Result<()> {
    fs::write(path, svg)?;
    Ok(())
}

/// Write PNG bytes
pub fn save_png(path: &Path, png: &[u8]) -> Result<()> {
    fs::write(path, png)?;
    Ok(())
}
