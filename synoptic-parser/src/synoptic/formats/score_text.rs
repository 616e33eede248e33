//! Canonical score text
//!
//!     The plain-text export of the score, written to `score.txt` and meant to be diffed
//!     and kept under version control, so the output depends on nothing but its inputs.
//!
//!     SYNOPTIC SCORE
//!     ==============
//!
//!     #tr.en: <translation>                    (only when a translation exists)
//!     § <n> <reconstructed text>
//!       <siglum> <surface> <label>   <content>  (reference padded to the label width)
//!                                    <continuation>
//!         // <parallel>
//!
//!     An empty score renders as the empty string.

use crate::synoptic::assembling::Score;
use crate::synoptic::entry::LineEntry;
use crate::synoptic::formats::registry::{FormatError, Formatter};
use crate::synoptic::formats::{RenderOptions, ScoreDocument};
use crate::synoptic::notes::ScoreNotes;
use crate::synoptic::surface::abbreviate;

/// Prefix of the translation annotation line.
pub const TRANSLATION_PREFIX: &str = "#tr.en: ";

/// Reference label of a witness line: siglum, abbreviated surface, source label.
pub fn reference_label(siglum: &str, line: &LineEntry) -> String {
    format!(
        "{} {} {}",
        siglum,
        abbreviate(&line.surface),
        line.source_label
    )
}

/// Render with default options and file sigla.
pub fn render_score_text(score: &Score, notes: &ScoreNotes) -> String {
    let doc = ScoreDocument {
        score: score.clone(),
        notes: notes.clone(),
        ..ScoreDocument::default()
    };
    render_score_text_with(&doc)
}

/// Render a document using its sigla and render options.
pub fn render_score_text_with(doc: &ScoreDocument) -> String {
    let score = &doc.score;
    if score.is_empty() {
        return String::new();
    }
    let RenderOptions {
        label_width,
        header,
        ..
    } = &doc.options;
    let width = *label_width;

    let mut text = String::new();
    text.push_str(header);
    text.push('\n');
    text.push_str(&"=".repeat(header.chars().count()));
    text.push_str("\n\n");

    for (line_number, group) in score.groups() {
        let translation = doc.notes.translation(line_number);
        if !translation.is_empty() {
            text.push_str(&format!("{TRANSLATION_PREFIX}{translation}\n"));
        }
        let reconstructed = doc.notes.reconstructed(line_number);
        text.push_str(&format!("§ {line_number} {reconstructed}\n"));

        for line in group {
            let reference = reference_label(doc.shown_siglum(&line.siglum), line);
            text.push_str(&format!("  {reference:<width$} {}\n", line.content));
            for continuation in &line.continuations {
                text.push_str(&format!("  {:<width$} {continuation}\n", ""));
            }
            for parallel in &line.parallels {
                text.push_str(&format!("    // {parallel}\n"));
            }
        }

        text.push('\n');
    }

    text
}

pub struct ScoreTextFormatter;

impl Formatter for ScoreTextFormatter {
    fn name(&self) -> &str {
        "score-text"
    }

    fn serialize(&self, doc: &ScoreDocument) -> Result<String, FormatError> {
        Ok(render_score_text_with(doc))
    }

    fn description(&self) -> &str {
        "Canonical plain-text score export (score.txt)"
    }
}
