//! Structured serializations of the score document

use crate::synoptic::formats::registry::{FormatError, Formatter};
use crate::synoptic::formats::ScoreDocument;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "score-json"
    }

    fn serialize(&self, doc: &ScoreDocument) -> Result<String, FormatError> {
        serde_json::to_string_pretty(doc)
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "Score lines, rulings, comments, notes and colophons as JSON"
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "score-yaml"
    }

    fn serialize(&self, doc: &ScoreDocument) -> Result<String, FormatError> {
        serde_yaml::to_string(doc).map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "Score lines, rulings, comments, notes and colophons as YAML"
    }
}
