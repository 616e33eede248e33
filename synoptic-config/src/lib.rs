//! Shared configuration loader for the synoptic toolchain.
//!
//! `defaults/synoptic.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`SynopticConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use synoptic_parser::synoptic::formats::RenderOptions;
use synoptic_parser::synoptic::project::ProjectLayout;
use synoptic_parser::synoptic::search::SearchOptions;

const DEFAULT_TOML: &str = include_str!("../defaults/synoptic.default.toml");

/// Top-level configuration consumed by synoptic applications.
#[derive(Debug, Clone, Deserialize)]
pub struct SynopticConfig {
    pub render: RenderConfig,
    pub search: SearchConfig,
    pub project: ProjectConfig,
    pub logging: LoggingConfig,
}

/// Mirrors the knobs exposed by the score renderers.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub label_width: usize,
    pub display_sigla: bool,
    pub header: String,
}

/// Default flags for search and replace.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub use_regex: bool,
    pub case_sensitive: bool,
}

/// File names inside a project folder.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub manuscripts_dir: String,
    pub config_file: String,
    pub index_file: String,
    pub score_file: String,
    pub score_data_file: String,
    pub undo_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub verbosity: u8,
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        RenderOptions {
            label_width: config.label_width,
            display_sigla: config.display_sigla,
            header: config.header.clone(),
        }
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        SearchOptions {
            use_regex: config.use_regex,
            case_sensitive: config.case_sensitive,
        }
    }
}

impl From<&ProjectConfig> for ProjectLayout {
    fn from(config: &ProjectConfig) -> Self {
        ProjectLayout {
            manuscripts_dir: config.manuscripts_dir.clone(),
            config_file: config.config_file.clone(),
            index_file: config.index_file.clone(),
            score_file: config.score_file.clone(),
            score_data_file: config.score_data_file.clone(),
            undo_file: config.undo_file.clone(),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (`search.use_regex`, `render.label_width`).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<SynopticConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<SynopticConfig, ConfigError> {
    Loader::new().build()
}
