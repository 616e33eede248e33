//! Plain listing of colophons
//!
//! One block per witness: the siglum, then one indented row per colophon line with its
//! reference (`r 2'`) and text separated by a tab. Blocks are separated by a blank line.

use crate::synoptic::colophon::Colophon;
use crate::synoptic::formats::registry::{FormatError, Formatter};
use crate::synoptic::formats::ScoreDocument;

pub fn render_colophons(colophons: &[Colophon]) -> String {
    let mut text = String::new();
    for (idx, colophon) in colophons.iter().enumerate() {
        if idx > 0 {
            text.push('\n');
        }
        text.push_str(&colophon.siglum);
        text.push('\n');
        for line in &colophon.lines {
            text.push_str(&format!("  {}\t{}\n", line.reference(), line.text));
        }
    }
    text
}

pub struct ColophonsFormatter;

impl Formatter for ColophonsFormatter {
    fn name(&self) -> &str {
        "colophons"
    }

    fn serialize(&self, doc: &ScoreDocument) -> Result<String, FormatError> {
        Ok(render_colophons(&doc.colophons))
    }

    fn description(&self) -> &str {
        "Colophon transcriptions, one block per witness"
    }
}
