//! Witnesses and the ordered set the score is built from
//!
//!     A [Witness] is one manuscript's transcription: an identifier derived from its
//!     siglum, the siglum itself and the raw text, which is the only persisted truth.
//!
//!     [WitnessSet] keeps witnesses in insertion order. That order is the order in which
//!     witnesses appear inside every score line group, so it is explicit here rather than
//!     left to map iteration. Replacing a witness keeps its position; new witnesses are
//!     appended.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier for a siglum: `ms-` followed by the case-folded siglum.
pub fn witness_id(siglum: &str) -> String {
    format!("ms-{}", siglum.to_lowercase())
}

/// Starting text for a freshly added witness.
pub fn new_witness_template(siglum: &str) -> String {
    format!("{siglum}\n@obverse\n§1 1. ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    pub id: String,
    pub siglum: String,
    pub content: String,
}

impl Witness {
    /// A witness whose id is derived from the siglum.
    pub fn new(siglum: impl Into<String>, content: impl Into<String>) -> Self {
        let siglum = siglum.into();
        Witness {
            id: witness_id(&siglum),
            siglum,
            content: content.into(),
        }
    }

    pub fn with_id(
        id: impl Into<String>,
        siglum: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Witness {
            id: id.into(),
            siglum: siglum.into(),
            content: content.into(),
        }
    }
}

/// Adding a witness whose id is already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateWitness(pub String);

impl fmt::Display for DuplicateWitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A manuscript with id '{}' already exists", self.0)
    }
}

impl std::error::Error for DuplicateWitness {}

/// Insertion-ordered witnesses keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WitnessSet {
    witnesses: Vec<Witness>,
}

impl WitnessSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a witness that must not exist yet.
    pub fn add(&mut self, witness: Witness) -> Result<(), DuplicateWitness> {
        if self.contains(&witness.id) {
            return Err(DuplicateWitness(witness.id));
        }
        self.witnesses.push(witness);
        Ok(())
    }

    /// Insert or replace by id. Returns the replaced witness.
    pub fn upsert(&mut self, witness: Witness) -> Option<Witness> {
        match self.position(&witness.id) {
            Some(idx) => Some(std::mem::replace(&mut self.witnesses[idx], witness)),
            None => {
                self.witnesses.push(witness);
                None
            }
        }
    }

    /// Replace the content of an existing witness. Returns false when the id is unknown.
    pub fn set_content(&mut self, id: &str, content: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(witness) => {
                witness.content = content.into();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Witness> {
        self.position(id).map(|idx| self.witnesses.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Witness> {
        self.witnesses.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Witness> {
        self.witnesses.iter_mut().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Witness> {
        self.witnesses.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.witnesses.iter().map(|w| w.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.witnesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.witnesses.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.witnesses.iter().position(|w| w.id == id)
    }
}

impl FromIterator<Witness> for WitnessSet {
    /// Later witnesses with an id already seen replace the earlier one in place.
    fn from_iter<I: IntoIterator<Item = Witness>>(iter: I) -> Self {
        let mut set = WitnessSet::new();
        for witness in iter {
            set.upsert(witness);
        }
        set
    }
}

impl<'a> IntoIterator for &'a WitnessSet {
    type Item = &'a Witness;
    type IntoIter = std::slice::Iter<'a, Witness>;

    fn into_iter(self) -> Self::IntoIter {
        self.witnesses.iter()
    }
}

/// Display sigla for witnesses known by inventory number (`K.3547` -> `A`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiglaMapping(BTreeMap<String, String>);

impl SiglaMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, siglum: impl Into<String>, display: impl Into<String>) {
        self.0.insert(siglum.into(), display.into());
    }

    pub fn get(&self, siglum: &str) -> Option<&str> {
        self.0.get(siglum).map(String::as_str)
    }

    /// The display siglum if one is mapped, the siglum itself otherwise.
    pub fn display<'a>(&'a self, siglum: &'a str) -> &'a str {
        self.get(siglum).unwrap_or(siglum)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for SiglaMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        SiglaMapping(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_case_folded() {
        assert_eq!(witness_id("K.3547"), "ms-k.3547");
        assert_eq!(Witness::new("BM.12345", "").id, "ms-bm.12345");
    }

    #[test]
    fn add_rejects_case_folded_duplicates() {
        let mut set = WitnessSet::new();
        set.add(Witness::new("K.1", "a")).unwrap();
        let err = set.add(Witness::new("k.1", "b")).unwrap_err();
        assert_eq!(err, DuplicateWitness("ms-k.1".into()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn upsert_keeps_position() {
        let mut set: WitnessSet = vec![
            Witness::new("A", "one"),
            Witness::new("B", "two"),
            Witness::new("C", "three"),
        ]
        .into_iter()
        .collect();
        let old = set.upsert(Witness::new("B", "updated"));
        assert_eq!(old.map(|w| w.content), Some("two".to_string()));
        let order: Vec<_> = set.ids().collect();
        assert_eq!(order, vec!["ms-a", "ms-b", "ms-c"]);
        assert_eq!(set.get("ms-b").unwrap().content, "updated");
    }

    #[test]
    fn set_content_on_unknown_id() {
        let mut set = WitnessSet::new();
        assert!(!set.set_content("ms-x", "text"));
    }

    #[test]
    fn template_opens_on_obverse() {
        assert_eq!(new_witness_template("K.9"), "K.9\n@obverse\n§1 1. ");
    }

    #[test]
    fn sigla_fall_back_to_raw_siglum() {
        let mut sigla = SiglaMapping::new();
        sigla.insert("K.3547", "A");
        assert_eq!(sigla.display("K.3547"), "A");
        assert_eq!(sigla.display("K.1"), "K.1");
    }
}
