//! Testing utilities
//!
//!     Transcription conventions are easy to get slightly wrong: a missing period after the
//!     source label turns a strict line into a loose one, a stray space before a sigil
//!     changes nothing, a missing space after `$` turns a comment into plain text. Tests
//!     that invent their own witness strings drift apart from each other and from real
//!     transcriptions.
//!
//!     So tests that exercise whole witnesses load them from the curated files under
//!     `samples/witnesses/`, through [Samples]:
//!
//!     ```rust,ignore
//!     use synoptic_parser::synoptic::testing::Samples;
//!
//!     let text = Samples::source("A");
//!     let witnesses = Samples::witnesses(&["A", "B"]);
//!     let all = Samples::all();
//!     ```
//!
//!     Short inline strings are still fine for single-line classification cases.
//!
//!     The samples:
//!
//!         A   obverse and reverse, a parallel, a ruling, a continuation, primed labels
//!         B   the same lines with variants, two parallels, a left edge, a double ruling
//!         C   a colophon spanning the reverse and bottom, followed by non-colophon lines
//!
//!     Loaders panic on missing files; they are for tests only.

use crate::synoptic::witness::{Witness, WitnessSet};
use std::fs;
use std::path::PathBuf;

pub struct Samples;

impl Samples {
    /// Directory holding the sample witnesses.
    pub fn dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("samples")
            .join("witnesses")
    }

    /// Sigla of every sample, sorted.
    pub fn sigla() -> Vec<String> {
        let mut sigla: Vec<String> = fs::read_dir(Self::dir())
            .unwrap_or_else(|e| panic!("Failed to list samples: {}", e))
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("txt"))
            .filter_map(|path| path.file_stem()?.to_str().map(String::from))
            .collect();
        sigla.sort();
        sigla
    }

    /// Raw text of one sample.
    pub fn source(siglum: &str) -> String {
        let path = Self::dir().join(format!("{siglum}.txt"));
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    pub fn witness(siglum: &str) -> Witness {
        Witness::new(siglum, Self::source(siglum))
    }

    /// The given samples, in the given order.
    pub fn witnesses(sigla: &[&str]) -> WitnessSet {
        sigla.iter().map(|siglum| Self::witness(siglum)).collect()
    }

    /// Every sample, in siglum order.
    pub fn all() -> WitnessSet {
        Self::sigla()
            .iter()
            .map(|siglum| Self::witness(siglum))
            .collect()
    }
}
