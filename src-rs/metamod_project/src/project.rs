//! The project aggregate: every registered template under one root.

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::info;
use metamod_model::{FileRecord, ParameterTypeRegistry, RescanSummary};
use serde::{Deserialize, Serialize};

use crate::{
    error::{PersistenceError, ProjectError},
    snapshot,
    walk::{self, TemplateFilter},
};

/// The set of registered template files under a project root, plus the
/// project's classification properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    #[serde(skip)]
    root: PathBuf,
    files: IndexMap<PathBuf, FileRecord>,
    properties: IndexMap<String, String>,
}

/// What a project-wide rescan changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RescanReport {
    /// Templates registered for the first time
    pub new_files: Vec<PathBuf>,
    /// Per-file merge summaries for already-known templates
    pub rescanned: IndexMap<PathBuf, RescanSummary>,
}

/// How `generate_all` treats a failing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerateMode {
    /// Generate every file, collecting failures in the report
    #[default]
    ContinueOnError,
    /// Stop at the first failing file
    FailFast,
}

/// The outcome of `generate_all` in continue-on-error mode.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Output paths written, relative to the project root
    pub written: Vec<PathBuf>,
    /// Per-file failures
    pub failures: Vec<ProjectError>,
}

impl ProjectState {
    /// Opens a project: restores the snapshot when a usable one exists,
    /// otherwise scans the directory tree fresh and persists.
    ///
    /// # Errors
    ///
    /// Returns an error if a fresh scan cannot read a template or write the
    /// snapshot. A broken snapshot is not an error; it falls back to the
    /// fresh scan.
    pub fn open<R>(root: impl Into<PathBuf>, registry: &R) -> Result<Self, ProjectError>
    where
        R: ParameterTypeRegistry + ?Sized,
    {
        let root = root.into();

        if let Some(state) = snapshot::restore(&root) {
            info!(
                "restored {} tracked file(s) under {}",
                state.files.len(),
                root.display()
            );
            return Ok(state);
        }

        let mut state = Self {
            root,
            files: IndexMap::new(),
            properties: IndexMap::new(),
        };
        state.rescan_all(registry)?;
        Ok(state)
    }

    /// Returns the project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the registered file records, keyed by root-relative path.
    pub fn files(&self) -> &IndexMap<PathBuf, FileRecord> {
        &self.files
    }

    /// Returns a mutable handle to one file record.
    pub fn file_mut(&mut self, path: &Path) -> Option<&mut FileRecord> {
        self.files.get_mut(path)
    }

    /// Returns the project's classification properties (category name to
    /// ontology tag id).
    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    /// Sets one classification property.
    pub fn set_property(&mut self, category: impl Into<String>, tag_id: impl Into<String>) {
        self.properties.insert(category.into(), tag_id.into());
    }

    pub(crate) fn rebind_root(&mut self, root: &Path) {
        self.root = root.to_path_buf();
    }

    /// Re-walks the project tree and merges with the current state.
    ///
    /// Known templates are rescanned with the carry-forward merge rule, new
    /// templates are registered fresh, and the snapshot is persisted.
    /// Records whose backing file vanished are kept; see
    /// [`ProjectState::missing_files`].
    ///
    /// # Errors
    ///
    /// Returns an error if a template cannot be read or scanned, or if the
    /// snapshot cannot be written.
    pub fn rescan_all<R>(&mut self, registry: &R) -> Result<RescanReport, ProjectError>
    where
        R: ParameterTypeRegistry + ?Sized,
    {
        let filter = TemplateFilter::new().map_err(ProjectError::InvalidPattern)?;
        let mut report = RescanReport::default();

        for relative in walk::find_templates(&self.root, &filter) {
            let text = self.read_template(&relative)?;

            match self.files.get(&relative) {
                Some(existing) => {
                    let (record, summary) =
                        existing
                            .rescan(&text, registry)
                            .map_err(|error| ProjectError::Scan {
                                path: relative.clone(),
                                error,
                            })?;
                    self.files.insert(relative.clone(), record);
                    report.rescanned.insert(relative, summary);
                }
                None => {
                    let record = FileRecord::scan(relative.clone(), &text, registry).map_err(
                        |error| ProjectError::Scan {
                            path: relative.clone(),
                            error,
                        },
                    )?;
                    self.files.insert(relative.clone(), record);
                    report.new_files.push(relative);
                }
            }
        }

        self.persist()?;
        Ok(report)
    }

    /// Returns the registered paths whose backing file no longer exists.
    pub fn missing_files(&self) -> Vec<&Path> {
        self.files
            .keys()
            .filter(|relative| !self.root.join(relative).exists())
            .map(PathBuf::as_path)
            .collect()
    }

    /// Drops every record whose backing file no longer exists, returning
    /// the dropped paths. The caller persists afterwards.
    pub fn prune_missing(&mut self) -> Vec<PathBuf> {
        let missing: Vec<PathBuf> = self
            .missing_files()
            .into_iter()
            .map(Path::to_path_buf)
            .collect();

        for path in &missing {
            self.files.shift_remove(path);
        }

        missing
    }

    /// Returns true if every parameter of every registered file is
    /// complete.
    pub fn is_complete(&self) -> bool {
        self.files.values().all(FileRecord::is_complete)
    }

    /// Generates the output file for every registered template.
    ///
    /// Each file's generation is independent; in the default
    /// continue-on-error mode a failing file lands in the report and the
    /// rest still generate.
    ///
    /// # Errors
    ///
    /// In fail-fast mode, returns the first per-file failure.
    pub fn generate_all(&self, mode: GenerateMode) -> Result<GenerateReport, ProjectError> {
        let mut report = GenerateReport::default();

        for record in self.files.values() {
            match self.generate_one(record) {
                Ok(output) => report.written.push(output),
                Err(error) => match mode {
                    GenerateMode::FailFast => return Err(error),
                    GenerateMode::ContinueOnError => report.failures.push(error),
                },
            }
        }

        Ok(report)
    }

    fn generate_one(&self, record: &FileRecord) -> Result<PathBuf, ProjectError> {
        let text = self.read_template(record.path())?;

        let output = record
            .generate(&text)
            .map_err(|error| ProjectError::Generate {
                path: record.path().to_path_buf(),
                error,
            })?;

        let relative = record.output_path();
        let target = self.root.join(&relative);
        fs::write(&target, output).map_err(|error| ProjectError::Io {
            path: relative.clone(),
            error,
        })?;

        Ok(relative)
    }

    /// Writes the project snapshot into the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    pub fn persist(&self) -> Result<(), PersistenceError> {
        snapshot::persist(self)
    }

    /// Restores a project from the snapshot under `root`, if a usable one
    /// exists. `None` means "no prior state": callers fall back to a fresh
    /// scan.
    pub fn restore(root: &Path) -> Option<Self> {
        snapshot::restore(root)
    }

    fn read_template(&self, relative: &Path) -> Result<String, ProjectError> {
        let path = self.root.join(relative);
        fs::read_to_string(&path).map_err(|error| ProjectError::Io {
            path: relative.to_path_buf(),
            error,
        })
    }
}
