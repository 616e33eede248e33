//! Surfaces of the inscribed object
//!
//!     A surface is a physical face of the artifact: obverse, reverse, one of the edges,
//!     the top or bottom, a numbered column, or the colophon section. Transcriptions
//!     switch surface with an `@` marker line (`@obverse`, `@left edge`, `@column 2`).
//!
//!     The parser stores the surface as the lower-cased marker text. Presentation uses the
//!     short forms from [abbreviate].

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker sigil that opens a surface line.
pub const SURFACE_SIGIL: char = '@';

/// Surface vocabulary, matched case-insensitively at the start of a trimmed line.
pub const SURFACE_PATTERN: &str =
    r"(?i)^@(obverse|reverse|left edge|right edge|edge|top|bottom|colophon|column(?:\s+[0-9]+)?)";

static SURFACE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(SURFACE_PATTERN).unwrap());

/// Short forms used in score references. Unknown surfaces pass through unchanged.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("obverse", "o"),
    ("reverse", "r"),
    ("left edge", "le"),
    ("right edge", "re"),
    ("top", "t"),
    ("bottom", "b"),
    ("edge", "e"),
    ("colophon", "col"),
];

/// Returns true when the (trimmed) line opens with a known surface marker.
pub fn is_surface_marker(line: &str) -> bool {
    SURFACE_MARKER.is_match(line)
}

/// The surface a marker line switches to: everything after the sigil, lower-cased.
///
/// Returns `None` when the line is not a surface marker.
pub fn surface_from_marker(line: &str) -> Option<String> {
    if !is_surface_marker(line) {
        return None;
    }
    Some(line[SURFACE_SIGIL.len_utf8()..].to_lowercase())
}

/// Abbreviate a surface name for a reference label (`obverse` -> `o`).
pub fn abbreviate(surface: &str) -> &str {
    ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == surface)
        .map(|(_, short)| *short)
        .unwrap_or(surface)
}
