//! Editing session over a shared key/value feed
//!
//!     Collaboration is delegated to an external sync service. This module only sees it as
//!     two [SharedMap]s:
//!
//!         manuscripts     witness id -> `{"siglum": .., "content": ..}`
//!         reconstructed   line number -> reconstructed text
//!
//!     [EditorSession] owns the witnesses, the notes and the replace undo log. Local edits
//!     write through to the maps when a feed is connected. Remote updates replace a whole
//!     witness (last write wins at witness granularity; nothing is merged line by line).
//!     The score and colophons are derived on demand, so calling [EditorSession::score]
//!     after every update is safe and gives the same answer for the same texts.

use crate::synoptic::assembling::{assemble, Score};
use crate::synoptic::colophon::{extract_colophons, Colophon};
use crate::synoptic::notes::ScoreNotes;
use crate::synoptic::search::{
    self, MatchSelection, ReplaceLog, ReplaceOutcome, SearchError, SearchQuery, SearchResults,
    UndoEntry,
};
use crate::synoptic::witness::{Witness, WitnessSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the map holding witness texts.
pub const MANUSCRIPTS_MAP: &str = "manuscripts";
/// Name of the map holding reconstructed lines.
pub const RECONSTRUCTED_MAP: &str = "reconstructed";

/// A key/value map kept in sync by some outside service.
pub trait SharedMap {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn keys(&self) -> Vec<String>;
}

/// In-process [SharedMap].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryMap {
    entries: BTreeMap<String, String>,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SharedMap for MemoryMap {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A value in the manuscripts map is not a witness record
    MalformedRemoteWitness { key: String, reason: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::MalformedRemoteWitness { key, reason } => {
                write!(f, "Malformed remote manuscript '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Wire form of a witness in the manuscripts map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteWitness {
    pub siglum: String,
    pub content: String,
}

impl RemoteWitness {
    pub fn encode(witness: &Witness) -> String {
        serde_json::json!({ "siglum": witness.siglum, "content": witness.content }).to_string()
    }

    pub fn decode(key: &str, value: &str) -> Result<Self, SessionError> {
        serde_json::from_str(value).map_err(|e| SessionError::MalformedRemoteWitness {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

struct SharedFeed<M> {
    manuscripts: M,
    reconstructed: M,
}

pub struct EditorSession<M: SharedMap = MemoryMap> {
    witnesses: WitnessSet,
    notes: ScoreNotes,
    log: ReplaceLog,
    feed: Option<SharedFeed<M>>,
}

impl<M: SharedMap> EditorSession<M> {
    /// A local session with no feed.
    pub fn new(witnesses: WitnessSet, notes: ScoreNotes) -> Self {
        EditorSession {
            witnesses,
            notes,
            log: ReplaceLog::new(),
            feed: None,
        }
    }

    /// Attach the shared maps. Every local witness is published.
    pub fn connect(&mut self, manuscripts: M, reconstructed: M) {
        let mut feed = SharedFeed {
            manuscripts,
            reconstructed,
        };
        for witness in &self.witnesses {
            let value = RemoteWitness::encode(witness);
            feed.manuscripts.set(&witness.id, value);
        }
        tracing::info!(witnesses = self.witnesses.len(), "connected shared feed");
        self.feed = Some(feed);
    }

    pub fn is_connected(&self) -> bool {
        self.feed.is_some()
    }

    pub fn manuscripts_map(&self) -> Option<&M> {
        self.feed.as_ref().map(|f| &f.manuscripts)
    }

    pub fn reconstructed_map(&self) -> Option<&M> {
        self.feed.as_ref().map(|f| &f.reconstructed)
    }

    pub fn witnesses(&self) -> &WitnessSet {
        &self.witnesses
    }

    pub fn notes(&self) -> &ScoreNotes {
        &self.notes
    }

    pub fn replace_log(&self) -> &ReplaceLog {
        &self.log
    }

    /// Local edit of a witness text. Returns false when the id is unknown.
    pub fn edit_witness(&mut self, id: &str, content: impl Into<String>) -> bool {
        if !self.witnesses.set_content(id, content) {
            return false;
        }
        self.publish(id);
        true
    }

    /// Local edit of a reconstructed line.
    pub fn set_reconstructed(&mut self, line_number: u64, text: impl Into<String>) {
        let text = text.into();
        self.notes.set_reconstructed(line_number, text.clone());
        if let Some(feed) = self.feed.as_mut() {
            feed.reconstructed.set(&line_number.to_string(), text);
        }
    }

    /// Apply a remote update of one manuscripts-map key.
    ///
    /// The whole witness is replaced; an unseen key is appended to the witness order.
    pub fn apply_remote_witness(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        let remote = RemoteWitness::decode(key, value)?;
        let is_new = self
            .witnesses
            .upsert(Witness::with_id(key, remote.siglum, remote.content))
            .is_none();
        tracing::debug!(witness = key, is_new, "applied remote manuscript");
        Ok(())
    }

    /// Re-read a manuscripts-map key from the connected feed.
    ///
    /// Malformed values are logged and ignored.
    pub fn pull_remote_witness(&mut self, key: &str) {
        let Some(value) = self.feed.as_ref().and_then(|f| f.manuscripts.get(key)) else {
            return;
        };
        if let Err(err) = self.apply_remote_witness(key, &value) {
            tracing::warn!(%err, "ignoring remote manuscript update");
        }
    }

    /// Copy every reconstructed-map entry into the notes.
    pub fn apply_remote_reconstructed(&mut self) {
        let Some(feed) = self.feed.as_ref() else {
            return;
        };
        for key in feed.reconstructed.keys() {
            if let Some(value) = feed.reconstructed.get(&key) {
                self.notes.reconstructed.insert(key, value);
            }
        }
    }

    pub fn score(&self) -> Score {
        assemble(&self.witnesses)
    }

    pub fn colophons(&self) -> Vec<Colophon> {
        extract_colophons(&self.witnesses)
    }

    pub fn search(&self, query: &SearchQuery) -> Result<SearchResults, SearchError> {
        search::search(&self.witnesses, query)
    }

    pub fn replace_one(
        &mut self,
        query: &SearchQuery,
        replacement: &str,
        selection: &MatchSelection,
    ) -> Result<ReplaceOutcome, SearchError> {
        let outcome = search::replace_one(
            &mut self.witnesses,
            &mut self.log,
            query,
            replacement,
            selection,
        )?;
        self.publish_all(&outcome.witnesses);
        Ok(outcome)
    }

    pub fn replace_all(
        &mut self,
        query: &SearchQuery,
        replacement: &str,
    ) -> Result<ReplaceOutcome, SearchError> {
        let outcome = search::replace_all(&mut self.witnesses, &mut self.log, query, replacement)?;
        self.publish_all(&outcome.witnesses);
        Ok(outcome)
    }

    /// Undo the last replace and publish the restored witnesses.
    pub fn undo(&mut self) -> Option<UndoEntry> {
        let entry = self.log.undo(&mut self.witnesses)?;
        let ids: Vec<String> = entry.snapshots.iter().map(|s| s.id.clone()).collect();
        self.publish_all(&ids);
        Some(entry)
    }

    fn publish_all(&mut self, ids: &[String]) {
        for id in ids {
            self.publish(id);
        }
    }

    fn publish(&mut self, id: &str) {
        let (Some(feed), Some(witness)) = (self.feed.as_mut(), self.witnesses.get(id)) else {
            return;
        };
        feed.manuscripts.set(id, RemoteWitness::encode(witness));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> EditorSession {
        let witnesses: WitnessSet = vec![
            Witness::new("A", "@obverse\n§1 1. alpha"),
            Witness::new("B", "@obverse\n§1 1. beta"),
        ]
        .into_iter()
        .collect();
        EditorSession::new(witnesses, ScoreNotes::new())
    }

    fn connected() -> EditorSession {
        let mut session = session();
        session.connect(MemoryMap::new(), MemoryMap::new());
        session
    }

    #[test]
    fn connect_publishes_every_witness() {
        let session = connected();
        let map = session.manuscripts_map().unwrap();
        assert_eq!(map.keys(), vec!["ms-a", "ms-b"]);
        let remote = RemoteWitness::decode("ms-a", &map.get("ms-a").unwrap()).unwrap();
        assert_eq!(remote.content, "@obverse\n§1 1. alpha");
    }

    #[test]
    fn local_edits_write_through() {
        let mut session = connected();
        assert!(session.edit_witness("ms-b", "§2 1. gamma"));
        assert!(!session.edit_witness("ms-z", "x"));
        let value = session.manuscripts_map().unwrap().get("ms-b").unwrap();
        let remote = RemoteWitness::decode("ms-b", &value).unwrap();
        assert_eq!(remote.content, "§2 1. gamma");

        session.set_reconstructed(2, "reading");
        assert_eq!(
            session.reconstructed_map().unwrap().get("2").as_deref(),
            Some("reading")
        );
        assert_eq!(session.notes().reconstructed(2), "reading");
    }

    #[test]
    fn remote_witness_replaces_and_appends() {
        let mut session = session();
        session
            .apply_remote_witness("ms-a", r#"{"siglum":"A","content":"§3 1. remote"}"#)
            .unwrap();
        session
            .apply_remote_witness("ms-c", r#"{"siglum":"C","content":"§3 2. new"}"#)
            .unwrap();
        let ids: Vec<&str> = session.witnesses().ids().collect();
        assert_eq!(ids, vec!["ms-a", "ms-b", "ms-c"]);

        let score = session.score();
        let contents: Vec<&str> = score.group(3).iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["remote", "new"]);
    }

    #[test]
    fn malformed_remote_witness_is_reported() {
        let mut session = session();
        let err = session
            .apply_remote_witness("ms-a", "not json")
            .unwrap_err();
        let SessionError::MalformedRemoteWitness { key, .. } = err;
        assert_eq!(key, "ms-a");
        let witness = session.witnesses().get("ms-a").unwrap();
        assert_eq!(witness.content, "@obverse\n§1 1. alpha");
    }

    #[test]
    fn pulled_garbage_is_ignored() {
        let mut session = connected();
        let before = session.witnesses().clone();
        if let Some(feed) = session.feed.as_mut() {
            feed.manuscripts.set("ms-a", "{".to_string());
        }
        session.pull_remote_witness("ms-a");
        session.pull_remote_witness("ms-missing");
        assert_eq!(session.witnesses(), &before);
    }

    #[test]
    fn remote_reconstructed_copies_all_keys() {
        let mut session = connected();
        if let Some(feed) = session.feed.as_mut() {
            feed.reconstructed.set("1", "one".to_string());
            feed.reconstructed.set("7", "seven".to_string());
        }
        session.apply_remote_reconstructed();
        assert_eq!(session.notes().reconstructed(1), "one");
        assert_eq!(session.notes().reconstructed(7), "seven");
    }

    #[test]
    fn rederiving_is_idempotent() {
        let session = session();
        assert_eq!(session.score(), session.score());
        assert_eq!(session.colophons(), session.colophons());
    }

    #[test]
    fn replace_and_undo_publish_restored_text() {
        let mut session = connected();
        let outcome = session
            .replace_all(&SearchQuery::new("alpha"), "omega")
            .unwrap();
        assert_eq!(outcome.witnesses, vec!["ms-a"]);
        let published = session.manuscripts_map().unwrap().get("ms-a").unwrap();
        assert!(published.contains("omega"));

        session.undo().unwrap();
        let published = session.manuscripts_map().unwrap().get("ms-a").unwrap();
        assert_eq!(
            RemoteWitness::decode("ms-a", &published).unwrap().content,
            "@obverse\n§1 1. alpha"
        );
        assert!(session.undo().is_none());
    }

    #[test]
    fn replace_one_follows_a_selection() {
        let mut session = session();
        let query = SearchQuery::new("BETA");
        let selection = session.search(&query).unwrap().selection(0).unwrap();
        session.replace_one(&query, "delta", &selection).unwrap();
        let witness = session.witnesses().get("ms-b").unwrap();
        assert_eq!(witness.content, "@obverse\n§1 1. delta");
        assert_eq!(session.replace_log().len(), 1);
    }
}
