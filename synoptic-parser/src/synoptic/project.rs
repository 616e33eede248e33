//! Project folders on the local filesystem
//!
//!     A project is a directory holding the witness texts and everything derived from them:
//!
//!         <root>/project.json              name, creation time, display sigla
//!         <root>/manuscripts/<S>.txt       one witness per file, the stem is the siglum
//!         <root>/manuscripts/index.json    the sigla, as a JSON array
//!         <root>/score.txt                 the exported score text
//!         <root>/score-data.json           reconstructed lines and translations
//!
//!     Older projects keep their witnesses as loose `*.txt` files in the root. Those are
//!     read in place; [Project::init] moves a folder to the layout above by copying them
//!     into `manuscripts/`.
//!
//!     Witnesses are loaded in byte order of their sigla. Directory listings are not
//!     ordered, and the witness order decides the order inside every score line.
//!
//!     File names are configurable through [ProjectLayout].

use crate::synoptic::formats::{render_score_text_with, RenderOptions, ScoreDocument};
use crate::synoptic::notes::ScoreNotes;
use crate::synoptic::search::ReplaceLog;
use crate::synoptic::witness::{
    new_witness_template, witness_id, DuplicateWitness, SiglaMapping, Witness, WitnessSet,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File and directory names inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLayout {
    pub manuscripts_dir: String,
    pub config_file: String,
    pub index_file: String,
    pub score_file: String,
    pub score_data_file: String,
    pub undo_file: String,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        ProjectLayout {
            manuscripts_dir: "manuscripts".to_string(),
            config_file: "project.json".to_string(),
            index_file: "index.json".to_string(),
            score_file: "score.txt".to_string(),
            score_data_file: "score-data.json".to_string(),
            undo_file: ".synoptic-undo.json".to_string(),
        }
    }
}

/// Contents of `project.json`. Unknown keys are kept and written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "SiglaMapping::is_empty")]
    pub sigla: SiglaMapping,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug)]
pub enum ProjectError {
    /// Reading or writing a project file failed
    Io(String),
    /// A project file could not be encoded or decoded
    Json(String),
    /// A witness with the same id already exists
    DuplicateWitness(String),
    /// No witness has the given id
    UnknownWitness(String),
    /// The path is not a directory
    NotAProject(PathBuf),
    /// The siglum cannot be used as a file stem
    InvalidSiglum(String),
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectError::Io(msg) => write!(f, "IO error: {}", msg),
            ProjectError::Json(msg) => write!(f, "JSON error: {}", msg),
            ProjectError::DuplicateWitness(id) => {
                write!(f, "A manuscript with id '{}' already exists", id)
            }
            ProjectError::UnknownWitness(id) => write!(f, "Unknown manuscript '{}'", id),
            ProjectError::NotAProject(path) => {
                write!(f, "Not a project folder: {}", path.display())
            }
            ProjectError::InvalidSiglum(siglum) => write!(f, "Invalid siglum '{}'", siglum),
        }
    }
}

impl std::error::Error for ProjectError {}

impl From<io::Error> for ProjectError {
    fn from(err: io::Error) -> Self {
        ProjectError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ProjectError {
    fn from(err: serde_json::Error) -> Self {
        ProjectError::Json(err.to_string())
    }
}

impl From<DuplicateWitness> for ProjectError {
    fn from(err: DuplicateWitness) -> Self {
        ProjectError::DuplicateWitness(err.0)
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ProjectError + '_ {
    move |err| ProjectError::Io(format!("{}: {}", path.display(), err))
}

fn read_file(path: &Path) -> Result<String, ProjectError> {
    fs::read_to_string(path).map_err(io_error(path))
}

fn write_file(path: &Path, contents: &str) -> Result<(), ProjectError> {
    fs::write(path, contents).map_err(io_error(path))
}

/// A siglum names its witness file, so it must be a plain file stem.
fn check_siglum(siglum: &str) -> Result<(), ProjectError> {
    let trimmed = siglum.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." || siglum.contains(['/', '\\']) {
        return Err(ProjectError::InvalidSiglum(siglum.to_string()));
    }
    Ok(())
}

/// Stems of the `*.txt` files directly inside `dir`, sorted, skipping `exclude`.
fn txt_stems(dir: &Path, exclude: Option<&str>) -> Result<Vec<String>, ProjectError> {
    let mut stems = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let file_name = path.file_name().and_then(|n| n.to_str());
        if file_name.is_some() && file_name == exclude {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            stems.push(stem.to_string());
        }
    }
    stems.sort();
    Ok(stems)
}

/// Decode an optional JSON file. Missing or undecodable files yield the default.
fn read_json_or_default<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> T {
    let Ok(text) = fs::read_to_string(path) else {
        return T::default();
    };
    serde_json::from_str(&text).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), %err, "ignoring unreadable project file");
        T::default()
    })
}

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    layout: ProjectLayout,
    config: ProjectConfig,
    witnesses: WitnessSet,
    notes: ScoreNotes,
    has_manuscripts_dir: bool,
}

impl Project {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ProjectError> {
        Self::open_with(root, ProjectLayout::default())
    }

    pub fn open_with(root: impl AsRef<Path>, layout: ProjectLayout) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ProjectError::NotAProject(root));
        }
        let config: ProjectConfig = read_json_or_default(&root.join(&layout.config_file));
        let notes: ScoreNotes = read_json_or_default(&root.join(&layout.score_data_file));

        let manuscripts_dir = root.join(&layout.manuscripts_dir);
        let has_manuscripts_dir = manuscripts_dir.is_dir();
        let (dir, exclude) = if has_manuscripts_dir {
            (manuscripts_dir, None)
        } else {
            (root.clone(), Some(layout.score_file.as_str()))
        };

        let mut witnesses = WitnessSet::new();
        for siglum in txt_stems(&dir, exclude)? {
            let content = read_file(&dir.join(format!("{siglum}.txt")))?;
            witnesses.upsert(Witness::new(siglum, content));
        }
        tracing::info!(
            root = %root.display(),
            witnesses = witnesses.len(),
            "opened project"
        );

        Ok(Project {
            root,
            layout,
            config,
            witnesses,
            notes,
            has_manuscripts_dir,
        })
    }

    pub fn init(root: impl AsRef<Path>, name: &str) -> Result<Self, ProjectError> {
        Self::init_with(root, name, ProjectLayout::default())
    }

    /// Create or upgrade a project folder.
    ///
    /// Loose root witnesses are copied into the manuscripts folder when that folder did not
    /// exist yet. An existing creation time is kept.
    pub fn init_with(
        root: impl AsRef<Path>,
        name: &str,
        layout: ProjectLayout,
    ) -> Result<Self, ProjectError> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(io_error(root))?;

        let manuscripts_dir = root.join(&layout.manuscripts_dir);
        let existed = manuscripts_dir.is_dir();
        fs::create_dir_all(&manuscripts_dir).map_err(io_error(&manuscripts_dir))?;
        if !existed {
            for stem in txt_stems(root, Some(layout.score_file.as_str()))? {
                let file_name = format!("{stem}.txt");
                let from = root.join(&file_name);
                let to = manuscripts_dir.join(&file_name);
                fs::copy(&from, &to).map_err(io_error(&from))?;
            }
        }

        let config_path = root.join(&layout.config_file);
        let mut config: ProjectConfig = read_json_or_default(&config_path);
        config.name = name.to_string();
        if config.created.is_none() {
            config.created = Some(
                chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            );
        }
        write_file(&config_path, &serde_json::to_string_pretty(&config)?)?;

        let sigla = txt_stems(&manuscripts_dir, None)?;
        write_file(
            &manuscripts_dir.join(&layout.index_file),
            &serde_json::to_string_pretty(&sigla)?,
        )?;
        tracing::info!(root = %root.display(), witnesses = sigla.len(), "initialised project");

        Self::open_with(root, layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn sigla(&self) -> &SiglaMapping {
        &self.config.sigla
    }

    pub fn witnesses(&self) -> &WitnessSet {
        &self.witnesses
    }

    pub fn witnesses_mut(&mut self) -> &mut WitnessSet {
        &mut self.witnesses
    }

    pub fn notes(&self) -> &ScoreNotes {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut ScoreNotes {
        &mut self.notes
    }

    /// Whether witnesses live in the manuscripts folder rather than the root.
    pub fn has_manuscripts_dir(&self) -> bool {
        self.has_manuscripts_dir
    }

    fn witness_dir(&self) -> PathBuf {
        if self.has_manuscripts_dir {
            self.root.join(&self.layout.manuscripts_dir)
        } else {
            self.root.clone()
        }
    }

    pub fn witness_path(&self, siglum: &str) -> PathBuf {
        self.witness_dir().join(format!("{siglum}.txt"))
    }

    pub fn score_path(&self) -> PathBuf {
        self.root.join(&self.layout.score_file)
    }

    /// The score document for the current texts, with this project's display sigla.
    pub fn document(&self, options: RenderOptions) -> ScoreDocument {
        ScoreDocument::build(&self.witnesses, &self.notes)
            .with_sigla(self.config.sigla.clone())
            .with_options(options)
    }

    /// Write one witness back to its file.
    pub fn write_witness(&self, id: &str) -> Result<(), ProjectError> {
        let witness = self
            .witnesses
            .get(id)
            .ok_or_else(|| ProjectError::UnknownWitness(id.to_string()))?;
        let path = self.witness_path(&witness.siglum);
        write_file(&path, &witness.content)?;
        tracing::info!(path = %path.display(), "wrote manuscript");
        Ok(())
    }

    /// Write every witness back to its file.
    pub fn write_witnesses(&self) -> Result<(), ProjectError> {
        for id in self.witnesses.ids() {
            self.write_witness(id)?;
        }
        Ok(())
    }

    /// Create a witness from the starting template and write it.
    ///
    /// Sigla that are blank, `.`, `..` or contain a path separator are rejected before
    /// anything is written.
    pub fn add_witness(&mut self, siglum: &str) -> Result<&Witness, ProjectError> {
        check_siglum(siglum)?;
        let id = witness_id(siglum);
        self.witnesses
            .add(Witness::new(siglum, new_witness_template(siglum)))?;
        self.write_witness(&id)?;
        self.write_index()?;
        self.witnesses
            .get(&id)
            .ok_or(ProjectError::UnknownWitness(id))
    }

    /// Remove a witness and its file.
    pub fn delete_witness(&mut self, id: &str) -> Result<Witness, ProjectError> {
        let witness = self
            .witnesses
            .remove(id)
            .ok_or_else(|| ProjectError::UnknownWitness(id.to_string()))?;
        let path = self.witness_path(&witness.siglum);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(io_error(&path)(err)),
        }
        self.write_index()?;
        tracing::info!(path = %path.display(), "deleted manuscript");
        Ok(witness)
    }

    /// Write the sigla index. Projects without a manuscripts folder have no index.
    pub fn write_index(&self) -> Result<(), ProjectError> {
        if !self.has_manuscripts_dir {
            return Ok(());
        }
        let sigla: Vec<&str> = self.witnesses.iter().map(|w| w.siglum.as_str()).collect();
        let path = self
            .root
            .join(&self.layout.manuscripts_dir)
            .join(&self.layout.index_file);
        write_file(&path, &serde_json::to_string_pretty(&sigla)?)
    }

    /// Write the exported score text. Returns false without writing when it is empty.
    pub fn write_score(&self, document: &ScoreDocument) -> Result<bool, ProjectError> {
        let text = render_score_text_with(document);
        if text.is_empty() {
            return Ok(false);
        }
        let path = self.score_path();
        write_file(&path, &text)?;
        tracing::info!(path = %path.display(), bytes = text.len(), "wrote score");
        Ok(true)
    }

    pub fn write_score_data(&self) -> Result<(), ProjectError> {
        let path = self.root.join(&self.layout.score_data_file);
        write_file(&path, &serde_json::to_string_pretty(&self.notes)?)
    }

    pub fn write_config(&self) -> Result<(), ProjectError> {
        let path = self.root.join(&self.layout.config_file);
        write_file(&path, &serde_json::to_string_pretty(&self.config)?)
    }

    /// The persisted replace journal, empty when there is none.
    pub fn load_replace_log(&self) -> ReplaceLog {
        read_json_or_default(&self.root.join(&self.layout.undo_file))
    }

    pub fn save_replace_log(&self, log: &ReplaceLog) -> Result<(), ProjectError> {
        let path = self.root.join(&self.layout.undo_file);
        write_file(&path, &serde_json::to_string_pretty(log)?)
    }
}
