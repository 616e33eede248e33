//! Reconstructed text and translations
//!
//! User-edited text keyed by score line number. Never derived from parsing; persisted
//! next to the score as `score-data.json`. Keys are strings because that is how the
//! editor and the shared map address them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreNotes {
    #[serde(default)]
    pub reconstructed: BTreeMap<String, String>,
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

impl ScoreNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstructed text for a line, empty when none was entered.
    pub fn reconstructed(&self, line_number: u64) -> &str {
        lookup(&self.reconstructed, line_number)
    }

    /// Translation for a line, empty when none was entered.
    pub fn translation(&self, line_number: u64) -> &str {
        lookup(&self.translations, line_number)
    }

    pub fn set_reconstructed(&mut self, line_number: impl ToString, text: impl Into<String>) {
        self.reconstructed
            .insert(line_number.to_string(), text.into());
    }

    pub fn set_translation(&mut self, line_number: impl ToString, text: impl Into<String>) {
        self.translations
            .insert(line_number.to_string(), text.into());
    }

    pub fn is_empty(&self) -> bool {
        self.reconstructed.is_empty() && self.translations.is_empty()
    }
}

fn lookup(map: &BTreeMap<String, String>, line_number: u64) -> &str {
    map.get(&line_number.to_string())
        .map(String::as_str)
        .unwrap_or_default()
}
