//! Structural entries emitted by the witness parser
//!
//!     A witness transcription reduces to an ordered list of [StructuralEntry] values. Only
//!     three kinds carry information into the score: rulings, feature comments and numbered
//!     lines. Surface markers update parser state, parallels and continuations fold into the
//!     preceding line, everything else is inert.
//!
//!     Every entry is tagged with the siglum of the witness it came from and the surface
//!     that was current when it was read.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of a ruling drawn across the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulingType {
    #[default]
    Single,
    Double,
    Triple,
}

impl RulingType {
    /// Parse a size word, ignoring case.
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "single" => Some(RulingType::Single),
            "double" => Some(RulingType::Double),
            "triple" => Some(RulingType::Triple),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RulingType::Single => "single",
            RulingType::Double => "double",
            RulingType::Triple => "triple",
        }
    }
}

impl fmt::Display for RulingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `$ double ruling` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruling {
    pub siglum: String,
    pub surface: String,
    pub ruling_type: RulingType,
}

/// A `$ rest of tablet blank` style remark about the physical object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub siglum: String,
    pub surface: String,
    pub text: String,
}

/// A numbered line: `§12 7'. text`.
///
/// `target_line` is the score line it collates under; `source_label` is the line number
/// on the manuscript itself, kept as text because primed labels (`7'`) are not numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEntry {
    pub siglum: String,
    pub surface: String,
    pub target_line: u64,
    pub source_label: String,
    pub content: String,
    #[serde(default)]
    pub parallels: Vec<String>,
    #[serde(default)]
    pub continuations: Vec<String>,
}

impl LineEntry {
    pub fn new(
        siglum: impl Into<String>,
        surface: impl Into<String>,
        target_line: u64,
        source_label: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        LineEntry {
            siglum: siglum.into(),
            surface: surface.into(),
            target_line,
            source_label: source_label.into(),
            content: content.into(),
            parallels: Vec::new(),
            continuations: Vec::new(),
        }
    }

    /// Whether the manuscript line number is marked uncertain (`20'`).
    pub fn is_primed(&self) -> bool {
        self.source_label.ends_with('\'')
    }

    /// The transcription line that produces this entry.
    pub fn to_source_line(&self) -> String {
        format!(
            "§{} {}. {}",
            self.target_line, self.source_label, self.content
        )
    }
}

/// One unit of a parsed witness, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructuralEntry {
    Ruling(Ruling),
    Comment(Comment),
    Line(LineEntry),
}

impl StructuralEntry {
    pub fn siglum(&self) -> &str {
        match self {
            StructuralEntry::Ruling(r) => &r.siglum,
            StructuralEntry::Comment(c) => &c.siglum,
            StructuralEntry::Line(l) => &l.siglum,
        }
    }

    pub fn surface(&self) -> &str {
        match self {
            StructuralEntry::Ruling(r) => &r.surface,
            StructuralEntry::Comment(c) => &c.surface,
            StructuralEntry::Line(l) => &l.surface,
        }
    }

    pub fn as_line(&self) -> Option<&LineEntry> {
        match self {
            StructuralEntry::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_line_mut(&mut self) -> Option<&mut LineEntry> {
        match self {
            StructuralEntry::Line(line) => Some(line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ruling_words_are_case_insensitive() {
        assert_eq!(RulingType::from_word("DOUBLE"), Some(RulingType::Double));
        assert_eq!(RulingType::from_word("triple"), Some(RulingType::Triple));
        assert_eq!(RulingType::from_word("quadruple"), None);
        assert_eq!(RulingType::default(), RulingType::Single);
    }

    #[test]
    fn primed_labels() {
        let line = LineEntry::new("A", "obverse", 20, "20'", "text");
        assert!(line.is_primed());
        assert!(!LineEntry::new("A", "obverse", 20, "20", "text").is_primed());
    }

    #[test]
    fn source_line_uses_strict_form() {
        let line = LineEntry::new("A", "reverse", 5, "3'", "a-na {d}utu");
        assert_eq!(line.to_source_line(), "§5 3'. a-na {d}utu");
    }

    #[test]
    fn entries_serialize_with_type_tag() {
        let entry = StructuralEntry::Ruling(Ruling {
            siglum: "A".into(),
            surface: "obverse".into(),
            ruling_type: RulingType::Double,
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "ruling");
        assert_eq!(json["ruling_type"], "double");
    }
}
