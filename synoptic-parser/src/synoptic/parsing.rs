//! Witness parsing
//!
//!     [parse_witness] turns the full text of one witness into its ordered list of
//!     [StructuralEntry] values. Lines are split on `\n`, classified one at a time (see
//!     [classification](crate::synoptic::classification)) and applied to a parse state that
//!     lives only for the duration of the call:
//!
//!         - the current surface, set by `@` markers (initially empty)
//!         - the index of the last emitted entry
//!
//!     Parallels and continuations attach to the last emitted entry only when it is a
//!     numbered line. A ruling or comment in between breaks the attachment and the marker
//!     is dropped, as is a marker that appears before any numbered line.
//!
//!     Parsing is total: any string parses, unrecognized lines simply emit nothing.

use crate::synoptic::classification::{classify_line, LineClass};
use crate::synoptic::entry::{Comment, LineEntry, Ruling, StructuralEntry};

/// Incremental parser for a single witness.
pub struct WitnessParser {
    siglum: String,
    current_surface: String,
    entries: Vec<StructuralEntry>,
    dropped_markers: usize,
}

impl WitnessParser {
    pub fn new(siglum: impl Into<String>) -> Self {
        Self {
            siglum: siglum.into(),
            current_surface: String::new(),
            entries: Vec::new(),
            dropped_markers: 0,
        }
    }

    /// Surface in effect for the next line.
    pub fn current_surface(&self) -> &str {
        &self.current_surface
    }

    /// Parallel and continuation markers that had no line to attach to so far.
    pub fn dropped_markers(&self) -> usize {
        self.dropped_markers
    }

    /// Classify one physical line and apply it to the parse state.
    pub fn feed_line(&mut self, line: &str) {
        match classify_line(line) {
            LineClass::Surface(surface) => {
                self.current_surface = surface;
            }
            LineClass::Ruling(ruling_type) => {
                self.entries.push(StructuralEntry::Ruling(Ruling {
                    siglum: self.siglum.clone(),
                    surface: self.current_surface.clone(),
                    ruling_type,
                }));
            }
            LineClass::Comment(text) => {
                self.entries.push(StructuralEntry::Comment(Comment {
                    siglum: self.siglum.clone(),
                    surface: self.current_surface.clone(),
                    text,
                }));
            }
            LineClass::Parallel(text) => match self.attachable_line() {
                Some(line) => line.parallels.push(text),
                None => self.drop_marker("parallel"),
            },
            LineClass::Continuation(text) => match self.attachable_line() {
                Some(line) => line.continuations.push(text),
                None => self.drop_marker("continuation"),
            },
            LineClass::NumberedLine {
                target_line,
                source_label,
                content,
                ..
            } => {
                self.entries.push(StructuralEntry::Line(LineEntry::new(
                    self.siglum.clone(),
                    self.current_surface.clone(),
                    target_line,
                    source_label,
                    content,
                )));
            }
            LineClass::NoMatch => {}
        }
    }

    /// Feed every line of `text`.
    pub fn feed_text(&mut self, text: &str) {
        for line in text.split('\n') {
            self.feed_line(line);
        }
    }

    /// Finish the scan and hand back the entries in emission order.
    pub fn finish(self) -> Vec<StructuralEntry> {
        self.entries
    }

    /// The last emitted entry, if it is a numbered line.
    fn attachable_line(&mut self) -> Option<&mut LineEntry> {
        self.entries
            .last_mut()
            .and_then(StructuralEntry::as_line_mut)
    }

    fn drop_marker(&mut self, kind: &str) {
        self.dropped_markers += 1;
        tracing::trace!(siglum = %self.siglum, kind, "dropped marker with no preceding line");
    }
}

/// Parse the full text of one witness.
pub fn parse_witness(siglum: &str, text: &str) -> Vec<StructuralEntry> {
    let mut parser = WitnessParser::new(siglum);
    parser.feed_text(text);
    tracing::debug!(
        siglum,
        entries = parser.entries.len(),
        dropped = parser.dropped_markers,
        "parsed witness"
    );
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synoptic::entry::RulingType;

    fn lines(entries: &[StructuralEntry]) -> Vec<&LineEntry> {
        entries
            .iter()
            .filter_map(StructuralEntry::as_line)
            .collect()
    }

    #[test]
    fn empty_text_has_no_entries() {
        assert!(parse_witness("A", "").is_empty());
    }

    #[test]
    fn entries_carry_siglum_and_surface() {
        let entries = parse_witness(
            "A",
            "K.3547\n@obverse\n§1 1. first\n@Reverse\n§2 1'. second",
        );
        let lines = lines(&entries);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].siglum, "A");
        assert_eq!(lines[0].surface, "obverse");
        assert_eq!(lines[1].surface, "reverse");
        assert_eq!(lines[1].source_label, "1'");
    }

    #[test]
    fn lines_before_any_surface_have_empty_surface() {
        let entries = parse_witness("A", "§1 1. text");
        assert_eq!(entries[0].surface(), "");
    }

    #[test]
    fn parallels_and_continuations_attach_in_order() {
        let entries = parse_witness(
            "A",
            "§1 1. first\n// B 2\n($___$) more\n// C 4'\n($___$) still more",
        );
        let line = entries[0].as_line().unwrap();
        assert_eq!(line.parallels, vec!["B 2", "C 4'"]);
        assert_eq!(line.continuations, vec!["more", "still more"]);
    }

    #[test]
    fn markers_after_ruling_or_comment_are_dropped() {
        let mut parser = WitnessParser::new("A");
        parser.feed_text(
            "§1 1. text\n// kept\n$ single ruling\n// dropped\n$ blank space\n($___$) dropped",
        );
        assert_eq!(parser.dropped_markers(), 2);
        let entries = parser.finish();
        assert_eq!(entries.len(), 3);
        let line = entries[0].as_line().unwrap();
        assert_eq!(line.parallels, vec!["kept"]);
        assert!(line.continuations.is_empty());
        assert_eq!(
            entries[1],
            StructuralEntry::Ruling(Ruling {
                siglum: "A".into(),
                surface: String::new(),
                ruling_type: RulingType::Single,
            })
        );
    }

    #[test]
    fn markers_before_any_line_are_dropped() {
        let entries = parse_witness("A", "// orphan\n($___$) orphan");
        assert!(entries.is_empty());
    }

    #[test]
    fn surface_markers_do_not_break_attachment() {
        let entries = parse_witness("A", "§1 1. text\n@reverse\n// still attached");
        let line = entries[0].as_line().unwrap();
        assert_eq!(line.parallels, vec!["still attached"]);
    }

    #[test]
    fn carriage_returns_are_trimmed() {
        let entries = parse_witness("A", "@obverse\r\n§1 1. text\r\n");
        let line = entries[0].as_line().unwrap();
        assert_eq!(line.surface, "obverse");
        assert_eq!(line.content, "text");
    }
}
