//! Display model of the score
//!
//! The structure an editor draws: one block per line number with the editable
//! translation and reconstruction, the witness rows, their continuation rows and a
//! collapsible group of parallels. Text is left unescaped; escaping is the renderer's
//! business.

use crate::synoptic::formats::registry::{FormatError, Formatter};
use crate::synoptic::formats::score_text::reference_label;
use crate::synoptic::formats::ScoreDocument;
use serde::{Deserialize, Serialize};

/// Shown in place of the score when no witness has a numbered line.
pub const EMPTY_SCORE_HINT: &str = "No scored lines yet. Use §[line] [source]. to add lines.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreView {
    pub lines: Vec<ViewLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewLine {
    pub line_number: u64,
    /// `§ n`
    pub label: String,
    pub translation: String,
    pub reconstructed: String,
    pub witnesses: Vec<ViewWitness>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewWitness {
    pub reference: String,
    pub text: String,
    pub continuations: Vec<String>,
    pub parallels: Option<ParallelGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelGroup {
    /// `// 2 parallel(s)`
    pub summary: String,
    /// Each parallel prefixed with `// `.
    pub rows: Vec<String>,
}

impl ScoreView {
    pub fn build(doc: &ScoreDocument) -> Self {
        let lines = doc
            .score
            .groups()
            .map(|(line_number, group)| ViewLine {
                line_number,
                label: format!("§ {line_number}"),
                translation: doc.notes.translation(line_number).to_string(),
                reconstructed: doc.notes.reconstructed(line_number).to_string(),
                witnesses: group
                    .iter()
                    .map(|line| ViewWitness {
                        reference: reference_label(doc.shown_siglum(&line.siglum), line),
                        text: line.content.clone(),
                        continuations: line.continuations.clone(),
                        parallels: (!line.parallels.is_empty()).then(|| ParallelGroup {
                            summary: format!("// {} parallel(s)", line.parallels.len()),
                            rows: line.parallels.iter().map(|p| format!("// {p}")).collect(),
                        }),
                    })
                    .collect(),
            })
            .collect();
        ScoreView { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub struct ScoreViewFormatter;

impl Formatter for ScoreViewFormatter {
    fn name(&self) -> &str {
        "score-view"
    }

    fn serialize(&self, doc: &ScoreDocument) -> Result<String, FormatError> {
        serde_json::to_string_pretty(&ScoreView::build(doc))
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "Display model of the score as JSON"
    }
}
