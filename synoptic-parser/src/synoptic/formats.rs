//! Output formats for the assembled score
//!
//! This module contains the serializations of a [ScoreDocument]:
//! - score text: the canonical, byte-stable plain-text export
//! - score view: the display model an editor draws
//! - colophons: a plain listing of the colophon transcriptions
//! - json / yaml: the score structure itself

pub mod colophon_text;
pub mod data;
pub mod registry;
pub mod score_text;
pub mod view;

pub use colophon_text::{render_colophons, ColophonsFormatter};
pub use data::{JsonFormatter, YamlFormatter};
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use score_text::{render_score_text, render_score_text_with, ScoreTextFormatter};
pub use view::{ScoreView, ScoreViewFormatter, EMPTY_SCORE_HINT};

use crate::synoptic::assembling::{assemble, Score};
use crate::synoptic::colophon::{extract_colophons, Colophon};
use crate::synoptic::notes::ScoreNotes;
use crate::synoptic::witness::{SiglaMapping, WitnessSet};
use serde::{Deserialize, Serialize};

/// Default width of the reference column in the export text.
pub const DEFAULT_LABEL_WIDTH: usize = 22;

/// Default export header.
pub const DEFAULT_HEADER: &str = "SYNOPTIC SCORE";

/// Presentation knobs shared by the text and display renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Reference labels are left-aligned and padded to this many characters.
    pub label_width: usize,
    /// Use mapped display sigla instead of file sigla in reference labels.
    pub display_sigla: bool,
    pub header: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            label_width: DEFAULT_LABEL_WIDTH,
            display_sigla: false,
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

/// Everything the formatters read: the score, the user notes and the colophons.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreDocument {
    pub score: Score,
    pub notes: ScoreNotes,
    pub colophons: Vec<Colophon>,
    #[serde(skip)]
    pub sigla: SiglaMapping,
    #[serde(skip)]
    pub options: RenderOptions,
}

impl ScoreDocument {
    /// Assemble the score and extract colophons from the current witness texts.
    pub fn build(witnesses: &WitnessSet, notes: &ScoreNotes) -> Self {
        ScoreDocument {
            score: assemble(witnesses),
            notes: notes.clone(),
            colophons: extract_colophons(witnesses),
            sigla: SiglaMapping::default(),
            options: RenderOptions::default(),
        }
    }

    pub fn with_sigla(mut self, sigla: SiglaMapping) -> Self {
        self.sigla = sigla;
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// The siglum shown for a witness under the current options.
    pub fn shown_siglum<'a>(&'a self, siglum: &'a str) -> &'a str {
        if self.options.display_sigla {
            self.sigla.display(siglum)
        } else {
            siglum
        }
    }
}
