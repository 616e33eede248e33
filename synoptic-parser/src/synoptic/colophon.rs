//! Colophon extraction
//!
//!     Colophons are scanned independently of the score, over the same raw texts and with
//!     their own state per witness: whether colophon mode has started and the abbreviation
//!     of the current surface (initially `o`).
//!
//!     `@colophon` is a one-way latch. Once seen, every later line of the witness is
//!     colophon material, across any number of further surface markers, which only change
//!     the surface abbreviation recorded for the following lines. A repeated `@colophon`
//!     restarts the collection, so only the lines after the last marker survive.
//!
//!     Inside colophon mode these lines are skipped: surface markers, blank lines, `$`
//!     lines, `//` lines and `§` lines without a leading `n.` label.

use crate::synoptic::witness::WitnessSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Surface markers tracked by the colophon scan and their abbreviations.
/// `None` takes the first letter of the marker word.
const COLOPHON_SURFACES: &[(&str, Option<&str>)] = &[
    (r"(?i)^@obverse", Some("o")),
    (r"(?i)^@reverse", Some("r")),
    (r"(?i)^@(edge|left edge)", Some("le")),
    (r"(?i)^@right edge", Some("re")),
    (r"(?i)^@(top|bottom)", None),
];

static SURFACE_RULES: Lazy<Vec<(Regex, Option<&'static str>)>> = Lazy::new(|| {
    COLOPHON_SURFACES
        .iter()
        .map(|(pattern, abbrev)| (Regex::new(pattern).unwrap(), *abbrev))
        .collect()
});

static COLOPHON_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^@colophon").unwrap());

static LABELLED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+'?)\.\s*(.*)$").unwrap());

/// One line of a colophon transcription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColophonLine {
    /// Manuscript line label (`3`, `4'`), empty for unnumbered lines.
    pub label: String,
    pub text: String,
    /// Surface abbreviation (`o`, `r`, `le`, `re`, `t`, `b`).
    pub surface: String,
}

impl ColophonLine {
    /// Reference shown in front of the text: `r 2'`, or just `r` when unnumbered.
    pub fn reference(&self) -> String {
        if self.label.is_empty() {
            self.surface.clone()
        } else {
            format!("{} {}", self.surface, self.label)
        }
    }
}

/// The colophon of one witness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colophon {
    pub siglum: String,
    pub id: String,
    pub lines: Vec<ColophonLine>,
}

/// Per-witness scan state.
struct ColophonScan {
    started: bool,
    surface: String,
    lines: Vec<ColophonLine>,
}

impl ColophonScan {
    fn new() -> Self {
        Self {
            started: false,
            surface: "o".to_string(),
            lines: Vec::new(),
        }
    }

    fn feed_line(&mut self, line: &str) {
        let trimmed = line.trim();

        if let Some(abbrev) = surface_abbreviation(trimmed) {
            self.surface = abbrev;
            if !self.started {
                return;
            }
        }

        if COLOPHON_MARKER.is_match(trimmed) {
            self.started = true;
            self.lines.clear();
            return;
        }

        if !self.started
            || trimmed.is_empty()
            || trimmed.starts_with('@')
            || trimmed.starts_with('$')
            || trimmed.starts_with("//")
        {
            return;
        }

        if let Some(caps) = LABELLED_LINE.captures(trimmed) {
            self.lines.push(ColophonLine {
                label: caps[1].to_string(),
                text: caps[2].to_string(),
                surface: self.surface.clone(),
            });
        } else if !trimmed.starts_with('§') {
            self.lines.push(ColophonLine {
                label: String::new(),
                text: trimmed.to_string(),
                surface: self.surface.clone(),
            });
        }
    }
}

/// Abbreviation for a tracked surface marker line.
fn surface_abbreviation(line: &str) -> Option<String> {
    for (regex, abbrev) in SURFACE_RULES.iter() {
        let Some(caps) = regex.captures(line) else {
            continue;
        };
        return Some(match abbrev {
            Some(short) => short.to_string(),
            None => caps
                .get(1)
                .and_then(|word| word.as_str().chars().next())
                .map(String::from)
                .unwrap_or_default(),
        });
    }
    None
}

/// Colophon lines of a single witness text, or `None` when it has no colophon.
pub fn extract_colophon_lines(text: &str) -> Option<Vec<ColophonLine>> {
    let mut scan = ColophonScan::new();
    for line in text.split('\n') {
        scan.feed_line(line);
    }
    (scan.started && !scan.lines.is_empty()).then_some(scan.lines)
}

/// Colophons of every witness that has one, in witness order.
pub fn extract_colophons(witnesses: &WitnessSet) -> Vec<Colophon> {
    let colophons: Vec<Colophon> = witnesses
        .iter()
        .filter_map(|w| {
            extract_colophon_lines(&w.content).map(|lines| Colophon {
                siglum: w.siglum.clone(),
                id: w.id.clone(),
                lines,
            })
        })
        .collect();
    tracing::debug!(colophons = colophons.len(), "extracted colophons");
    colophons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synoptic::witness::Witness;

    fn line(label: &str, text: &str, surface: &str) -> ColophonLine {
        ColophonLine {
            label: label.into(),
            text: text.into(),
            surface: surface.into(),
        }
    }

    #[test]
    fn colophon_latch_survives_surface_changes() {
        let lines = extract_colophon_lines("@obverse\n§1 1. foo\n@colophon\n@reverse\n1. bar");
        assert_eq!(lines, Some(vec![line("1", "bar", "r")]));
    }

    #[test]
    fn unnumbered_lines_and_skipped_lines() {
        let text = [
            "@colophon",
            "",
            "scribe's note",
            "$ ruling",
            "// parallel",
            "§4 1. scored",
            "@left edge",
            "2'. more",
        ]
        .join("\n");
        let lines = extract_colophon_lines(&text).unwrap();
        assert_eq!(
            lines,
            vec![line("", "scribe's note", "o"), line("2'", "more", "le")]
        );
    }

    #[test]
    fn later_marker_discards_earlier_colophon() {
        let lines = extract_colophon_lines("@colophon\n1. first\n@colophon\n2. second").unwrap();
        assert_eq!(lines, vec![line("2", "second", "o")]);
    }

    #[test]
    fn top_and_bottom_use_first_letter() {
        assert_eq!(
            extract_colophon_lines("@colophon\n@bottom\n1. a\n@top\n2. b").unwrap(),
            vec![line("1", "a", "b"), line("2", "b", "t")]
        );
    }

    #[test]
    fn surfaces_before_colophon_set_the_abbreviation() {
        let lines = extract_colophon_lines("@right edge\n§1 1. x\n@colophon\n1. y").unwrap();
        assert_eq!(lines, vec![line("1", "y", "re")]);
    }

    #[test]
    fn no_marker_or_empty_colophon_contributes_nothing() {
        assert_eq!(extract_colophon_lines("@obverse\n1. plain"), None);
        assert_eq!(
            extract_colophon_lines("@obverse\n@colophon\n\n$ blank"),
            None
        );
    }

    #[test]
    fn only_witnesses_with_colophons_are_listed() {
        let witnesses: WitnessSet = vec![
            Witness::new("A", "§1 1. x"),
            Witness::new("B", "@colophon\n1. written by"),
        ]
        .into_iter()
        .collect();
        let colophons = extract_colophons(&witnesses);
        assert_eq!(colophons.len(), 1);
        assert_eq!(colophons[0].siglum, "B");
        assert_eq!(colophons[0].id, "ms-b");
        assert_eq!(colophons[0].lines[0].reference(), "o 1");
    }

    #[test]
    fn reference_without_label() {
        assert_eq!(line("", "x", "r").reference(), "r");
    }
}
