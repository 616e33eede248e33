//! Cross-witness search and replace
//!
//!     A [SearchQuery] compiles to one pattern: the query itself when it is a regular
//!     expression, the escaped query otherwise, case-insensitive unless asked. Searching
//!     scans every witness line by line and reports the matching lines.
//!
//!     Replacing works on the raw texts:
//!
//!         - [replace_one] rewrites the first occurrence on one selected matching line
//!         - [replace_all] rewrites every occurrence in every witness that has a match,
//!           over the whole text rather than line by line
//!
//!     Before it mutates anything each replace pushes one [UndoEntry] holding the full
//!     text of every witness it is about to touch. [ReplaceLog::undo] restores exactly
//!     those texts; it is not a general undo of other edits.
//!
//!     An invalid regular expression is reported as [SearchError::InvalidPattern]. A
//!     selection that no longer points at a matching line makes replace a no-op.

use crate::synoptic::witness::WitnessSet;
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Errors raised by search and replace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The query does not compile as a regular expression
    InvalidPattern { pattern: String, reason: String },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid regex '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for SearchError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub use_regex: bool,
    pub case_sensitive: bool,
}

impl SearchQuery {
    /// A literal, case-insensitive query.
    pub fn new(text: impl Into<String>) -> Self {
        SearchQuery {
            text: text.into(),
            use_regex: false,
            case_sensitive: false,
        }
    }

    pub fn regex(mut self, use_regex: bool) -> Self {
        self.use_regex = use_regex;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Compile the query. An empty query compiles to `None` and matches nothing.
    pub fn compile(&self) -> Result<Option<Regex>, SearchError> {
        if self.text.is_empty() {
            return Ok(None);
        }
        let pattern = if self.use_regex {
            self.text.clone()
        } else {
            regex::escape(&self.text)
        };
        RegexBuilder::new(&pattern)
            .case_insensitive(!self.case_sensitive)
            .build()
            .map(Some)
            .map_err(|e| SearchError::InvalidPattern {
                pattern: self.text.clone(),
                reason: e.to_string(),
            })
    }
}

/// Default search flags, as configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub use_regex: bool,
    pub case_sensitive: bool,
}

impl SearchOptions {
    pub fn query(&self, text: impl Into<String>) -> SearchQuery {
        SearchQuery::new(text)
            .regex(self.use_regex)
            .case_sensitive(self.case_sensitive)
    }
}

/// One matching line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// 1-based line number within the witness text.
    pub line_number: usize,
    pub content: String,
    /// Byte ranges of every occurrence on the line.
    pub spans: Vec<Range<usize>>,
}

impl SearchMatch {
    /// The line with every occurrence wrapped in `open`/`close`.
    pub fn highlighted(&self, open: &str, close: &str) -> String {
        let mut out = String::with_capacity(self.content.len());
        let mut cursor = 0;
        for span in &self.spans {
            out.push_str(&self.content[cursor..span.start]);
            out.push_str(open);
            out.push_str(&self.content[span.clone()]);
            out.push_str(close);
            cursor = span.end;
        }
        out.push_str(&self.content[cursor..]);
        out
    }
}

/// Matches within one witness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessMatches {
    pub id: String,
    pub siglum: String,
    pub matches: Vec<SearchMatch>,
}

/// Points at one matching line: what replace-one acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSelection {
    pub witness_id: String,
    pub line_number: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub groups: Vec<WitnessMatches>,
    /// Number of matching lines across all witnesses.
    pub total: usize,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// `3 matches in 2 manuscripts`
    pub fn summary(&self) -> String {
        let witnesses = self.groups.len();
        format!(
            "{} match{} in {} manuscript{}",
            self.total,
            if self.total == 1 { "" } else { "es" },
            witnesses,
            if witnesses == 1 { "" } else { "s" }
        )
    }

    /// Matches in display order, flattened across witnesses.
    pub fn iter_flat(&self) -> impl Iterator<Item = (&WitnessMatches, &SearchMatch)> {
        self.groups
            .iter()
            .flat_map(|group| group.matches.iter().map(move |m| (group, m)))
    }

    /// Selection for the `index`-th match in display order.
    pub fn selection(&self, index: usize) -> Option<MatchSelection> {
        self.iter_flat()
            .nth(index)
            .map(|(group, m)| MatchSelection {
                witness_id: group.id.clone(),
                line_number: m.line_number,
            })
    }
}

/// Search every witness line by line.
pub fn search(witnesses: &WitnessSet, query: &SearchQuery) -> Result<SearchResults, SearchError> {
    let Some(regex) = query.compile()? else {
        return Ok(SearchResults::default());
    };
    Ok(search_with(witnesses, &regex))
}

fn search_with(witnesses: &WitnessSet, regex: &Regex) -> SearchResults {
    let mut results = SearchResults::default();
    for witness in witnesses {
        let matches: Vec<SearchMatch> = witness
            .content
            .split('\n')
            .enumerate()
            .filter(|(_, line)| regex.is_match(line))
            .map(|(idx, line)| SearchMatch {
                line_number: idx + 1,
                content: line.to_string(),
                spans: regex.find_iter(line).map(|m| m.range()).collect(),
            })
            .collect();
        if matches.is_empty() {
            continue;
        }
        results.total += matches.len();
        results.groups.push(WitnessMatches {
            id: witness.id.clone(),
            siglum: witness.siglum.clone(),
            matches,
        });
    }
    results
}

/// Full text of one witness before a replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoEntry {
    pub description: String,
    pub snapshots: Vec<Snapshot>,
}

/// Stack of pre-replace snapshots, one entry per replace operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceLog {
    entries: Vec<UndoEntry>,
}

impl ReplaceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current text of `ids` as one undo entry.
    pub fn record<'a>(
        &mut self,
        witnesses: &WitnessSet,
        ids: impl IntoIterator<Item = &'a str>,
        description: impl Into<String>,
    ) {
        let snapshots = ids
            .into_iter()
            .filter_map(|id| witnesses.get(id))
            .map(|w| Snapshot {
                id: w.id.clone(),
                content: w.content.clone(),
            })
            .collect();
        self.entries.push(UndoEntry {
            description: description.into(),
            snapshots,
        });
    }

    /// Restore the witnesses of the most recent entry. Witnesses removed since are skipped.
    pub fn undo(&mut self, witnesses: &mut WitnessSet) -> Option<UndoEntry> {
        let entry = self.entries.pop()?;
        for snapshot in &entry.snapshots {
            witnesses.set_content(&snapshot.id, snapshot.content.clone());
        }
        tracing::info!(
            description = %entry.description,
            restored = entry.snapshots.len(),
            "undid replace"
        );
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&UndoEntry> {
        self.entries.last()
    }
}

/// What a replace changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Witnesses whose text was rewritten.
    pub witnesses: Vec<String>,
    /// Matching lines in those witnesses before the replace.
    pub replaced: usize,
}

impl ReplaceOutcome {
    pub fn is_noop(&self) -> bool {
        self.witnesses.is_empty()
    }
}

fn replace_first(regex: &Regex, haystack: &str, replacement: &str, expand: bool) -> String {
    if expand {
        regex.replace(haystack, replacement).into_owned()
    } else {
        regex.replace(haystack, NoExpand(replacement)).into_owned()
    }
}

fn replace_every(regex: &Regex, haystack: &str, replacement: &str, expand: bool) -> String {
    if expand {
        regex.replace_all(haystack, replacement).into_owned()
    } else {
        regex
            .replace_all(haystack, NoExpand(replacement))
            .into_owned()
    }
}

/// Replace the first occurrence on the selected line.
///
/// Returns a no-op outcome when the witness or line is gone or the line no longer matches.
pub fn replace_one(
    witnesses: &mut WitnessSet,
    log: &mut ReplaceLog,
    query: &SearchQuery,
    replacement: &str,
    selection: &MatchSelection,
) -> Result<ReplaceOutcome, SearchError> {
    let Some(regex) = query.compile()? else {
        return Ok(ReplaceOutcome::default());
    };
    let Some(witness) = witnesses.get(&selection.witness_id) else {
        return Ok(ReplaceOutcome::default());
    };
    let mut lines: Vec<&str> = witness.content.split('\n').collect();
    let Some(idx) = selection.line_number.checked_sub(1) else {
        return Ok(ReplaceOutcome::default());
    };
    let Some(line) = lines.get(idx).copied() else {
        return Ok(ReplaceOutcome::default());
    };
    if !regex.is_match(line) {
        return Ok(ReplaceOutcome::default());
    }

    let rewritten = replace_first(&regex, line, replacement, query.use_regex);
    lines[idx] = &rewritten;
    let content = lines.join("\n");

    log.record(
        witnesses,
        [selection.witness_id.as_str()],
        format!("Replace in {}", selection.witness_id),
    );
    witnesses.set_content(&selection.witness_id, content);
    tracing::info!(
        witness = %selection.witness_id,
        line = selection.line_number,
        "replaced one match"
    );
    Ok(ReplaceOutcome {
        witnesses: vec![selection.witness_id.clone()],
        replaced: 1,
    })
}

/// Replace every occurrence in every witness with at least one matching line.
pub fn replace_all(
    witnesses: &mut WitnessSet,
    log: &mut ReplaceLog,
    query: &SearchQuery,
    replacement: &str,
) -> Result<ReplaceOutcome, SearchError> {
    let Some(regex) = query.compile()? else {
        return Ok(ReplaceOutcome::default());
    };
    let results = search_with(witnesses, &regex);
    if results.is_empty() {
        return Ok(ReplaceOutcome::default());
    }

    log.record(
        witnesses,
        results.groups.iter().map(|g| g.id.as_str()),
        format!("Replace all: \"{}\" → \"{}\"", query.text, replacement),
    );

    let mut outcome = ReplaceOutcome::default();
    for group in &results.groups {
        let Some(witness) = witnesses.get_mut(&group.id) else {
            continue;
        };
        let rewritten = replace_every(&regex, &witness.content, replacement, query.use_regex);
        if rewritten != witness.content {
            witness.content = rewritten;
            outcome.replaced += group.matches.len();
            outcome.witnesses.push(group.id.clone());
        }
    }
    tracing::info!(
        witnesses = outcome.witnesses.len(),
        replaced = outcome.replaced,
        "replaced all matches"
    );
    Ok(outcome)
}
