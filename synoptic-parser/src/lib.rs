//! # synoptic-parser
//!
//! Parser and score assembler for synoptic manuscript transcriptions.
//!
//! File Layout
//!
//!     A transcription is plain text, one physical line of the manuscript per line of the
//!     file, annotated with a handful of sigils (`@`, `$`, `//`, `§`, `($___$)`). The
//!     crate turns a set of such witnesses into a synoptic score: every witness line that
//!     carries a `§n` target number is grouped with the lines of the other witnesses that
//!     share it.
//!
//!     src/synoptic
//!       ├── classification   One physical line -> one tagged structural unit
//!       ├── parsing          One witness -> ordered structural entries
//!       ├── assembling       All witnesses -> the score
//!       ├── colophon         The independent colophon scan
//!       ├── formats          Export text, display model, json/yaml
//!       ├── search           Cross-witness search, replace and its undo log
//!       ├── session          Editing session fed by a shared key/value map
//!       └── project          Project folder storage
//!
//! For testing guidelines, see the [testing module](synoptic::testing).

pub mod synoptic;
