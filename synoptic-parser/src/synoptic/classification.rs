//! Line Classification
//!
//!     Every physical line of a transcription is classified on its own, after trimming,
//!     into exactly one [LineClass]. The rules are a declarative table tried in order and
//!     the first match wins. The order matters because the patterns overlap: a ruling
//!     (`$ single ruling`) also looks like a feature comment (`$ ...`), and a strict
//!     numbered line is also a loose one.
//!
//!     Precedence:
//!         1. surface        `@obverse`, `@left edge`, `@column 2`, ...
//!         2. ruling         `$ ruling`, `$ double ruling`
//!         3. comment        `$ rest of tablet blank` (no "ruling" anywhere)
//!         4. parallel       `// F K.3547 r 20'`
//!         5. continuation   `($___$) trailing text`
//!         6. strict line    `§12 7'. text`
//!         7. loose line     `§12 obv 7. text` (older files with free-form labels)
//!
//!     Anything else is [LineClass::NoMatch]: blank lines, headers and free commentary are
//!     inert. Classification never fails.
//!
//!     The classifier is pure. Applying a class to the running parse state (current
//!     surface, the line that parallels attach to) is the witness parser's job.

use crate::synoptic::entry::RulingType;
use crate::synoptic::surface;
use once_cell::sync::Lazy;
use regex::Regex;

/// The rule that produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Surface,
    Ruling,
    Comment,
    Parallel,
    Continuation,
    StrictLine,
    LooseLine,
}

/// Which of the two numbered-line grammars matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineForm {
    /// Source label is digits with an optional prime.
    Strict,
    /// Source label is any run of characters other than a period.
    Loose,
}

/// Result of classifying one trimmed physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Surface(String),
    Ruling(RulingType),
    Comment(String),
    Parallel(String),
    Continuation(String),
    NumberedLine {
        target_line: u64,
        source_label: String,
        content: String,
        form: LineForm,
    },
    NoMatch,
}

/// Grammar rules in precedence order: (kind, pattern).
const LINE_RULES: &[(RuleKind, &str)] = &[
    (RuleKind::Surface, surface::SURFACE_PATTERN),
    (
        RuleKind::Ruling,
        r"(?i)^\$\s*(single|double|triple)?\s*ruling",
    ),
    (RuleKind::Comment, r"^\$\s+"),
    (RuleKind::Parallel, r"^//\s+"),
    (RuleKind::Continuation, r"^\(\$___\$\)\s*(.*)$"),
    (RuleKind::StrictLine, r"^§([0-9]+)\s+([0-9]+'?)\.\s*(.*)$"),
    (RuleKind::LooseLine, r"^§([0-9]+)\s+([^.]+)\.\s*(.*)$"),
];

/// A feature comment must not mention a ruling anywhere on the line.
static RULING_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ruling").unwrap());

/// First size word on a ruling line.
static RULING_SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)single|double|triple").unwrap());

struct LineRule {
    kind: RuleKind,
    regex: Regex,
}

static COMPILED_RULES: Lazy<Vec<LineRule>> = Lazy::new(|| {
    LINE_RULES
        .iter()
        .map(|(kind, pattern)| LineRule {
            kind: *kind,
            regex: Regex::new(pattern).unwrap(),
        })
        .collect()
});

/// Classify one physical line. The line is trimmed first.
pub fn classify_line(line: &str) -> LineClass {
    let trimmed = line.trim();
    for rule in COMPILED_RULES.iter() {
        if let Some(class) = apply_rule(rule, trimmed) {
            return class;
        }
    }
    LineClass::NoMatch
}

/// The kind of the first rule that accepts the line, if any.
pub fn matching_rule(line: &str) -> Option<RuleKind> {
    let trimmed = line.trim();
    COMPILED_RULES
        .iter()
        .find(|rule| apply_rule(rule, trimmed).is_some())
        .map(|rule| rule.kind)
}

fn apply_rule(rule: &LineRule, line: &str) -> Option<LineClass> {
    match rule.kind {
        RuleKind::Surface => {
            if !rule.regex.is_match(line) {
                return None;
            }
            surface::surface_from_marker(line).map(LineClass::Surface)
        }
        RuleKind::Ruling => {
            if !rule.regex.is_match(line) {
                return None;
            }
            let ruling_type = RULING_SIZE
                .find(line)
                .and_then(|m| RulingType::from_word(m.as_str()))
                .unwrap_or_default();
            Some(LineClass::Ruling(ruling_type))
        }
        RuleKind::Comment => {
            if !rule.regex.is_match(line) || RULING_WORD.is_match(line) {
                return None;
            }
            Some(LineClass::Comment(line['$'.len_utf8()..].trim().to_string()))
        }
        RuleKind::Parallel => {
            if !rule.regex.is_match(line) {
                return None;
            }
            Some(LineClass::Parallel(line["//".len()..].trim().to_string()))
        }
        RuleKind::Continuation => {
            let caps = rule.regex.captures(line)?;
            let trailing = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            Some(LineClass::Continuation(trailing.to_string()))
        }
        RuleKind::StrictLine | RuleKind::LooseLine => {
            let caps = rule.regex.captures(line)?;
            // Out-of-range target numbers do not make a line.
            let target_line = caps.get(1)?.as_str().parse::<u64>().ok()?;
            let source_label = caps.get(2)?.as_str().trim().to_string();
            let content = caps
                .get(3)
                .map(|m| m.as_str().trim())
                .unwrap_or_default()
                .to_string();
            let form = if rule.kind == RuleKind::StrictLine {
                LineForm::Strict
            } else {
                LineForm::Loose
            };
            Some(LineClass::NumberedLine {
                target_line,
                source_label,
                content,
                form,
            })
        }
    }
}
