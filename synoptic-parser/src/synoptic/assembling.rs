//! Score assembly
//!
//!     The assembler parses every witness and partitions the combined entry stream:
//!
//!         - numbered lines are grouped by target line number
//!         - rulings and comments go to two flat lists, in encounter order
//!
//!     Witnesses are visited in [WitnessSet] order. Inside a line group the witnesses keep
//!     that order; only the line numbers themselves are sorted, ascending. Where a ruling
//!     or comment sat relative to the lines is not kept.
//!
//!     Assembly is a pure function of the witness texts, so re-running it after every local
//!     edit or remote update is always safe.

use crate::synoptic::entry::{Comment, LineEntry, Ruling, StructuralEntry};
use crate::synoptic::parsing::parse_witness;
use crate::synoptic::witness::WitnessSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The assembled synoptic score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Line groups keyed by target line number, iterated in ascending order.
    pub lines: BTreeMap<u64, Vec<LineEntry>>,
    pub rulings: Vec<Ruling>,
    pub comments: Vec<Comment>,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one entry to the partition it belongs to.
    pub fn push(&mut self, entry: StructuralEntry) {
        match entry {
            StructuralEntry::Ruling(ruling) => self.rulings.push(ruling),
            StructuralEntry::Comment(comment) => self.comments.push(comment),
            StructuralEntry::Line(line) => {
                self.lines.entry(line.target_line).or_default().push(line)
            }
        }
    }

    /// Target line numbers, ascending.
    pub fn line_numbers(&self) -> impl Iterator<Item = u64> + '_ {
        self.lines.keys().copied()
    }

    /// The witness lines collated under `line_number`.
    pub fn group(&self, line_number: u64) -> &[LineEntry] {
        self.lines
            .get(&line_number)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Line groups in ascending line-number order.
    pub fn groups(&self) -> impl Iterator<Item = (u64, &[LineEntry])> {
        self.lines.iter().map(|(n, group)| (*n, group.as_slice()))
    }

    /// True when no witness has a numbered line.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of witness lines across all groups.
    pub fn witness_line_count(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }
}

impl FromIterator<StructuralEntry> for Score {
    fn from_iter<I: IntoIterator<Item = StructuralEntry>>(iter: I) -> Self {
        let mut score = Score::new();
        for entry in iter {
            score.push(entry);
        }
        score
    }
}

/// Parse every witness in set order and assemble the score.
pub fn assemble(witnesses: &WitnessSet) -> Score {
    let score: Score = witnesses
        .iter()
        .flat_map(|w| parse_witness(&w.siglum, &w.content))
        .collect();
    tracing::debug!(
        witnesses = witnesses.len(),
        line_groups = score.lines.len(),
        rulings = score.rulings.len(),
        comments = score.comments.len(),
        "assembled score"
    );
    score
}
