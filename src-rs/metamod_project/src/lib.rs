//! Project state for meta-model template directories.
//!
//! A project is a directory tree containing template files named by the
//! `*.mm_*` convention. This crate discovers those templates, owns the
//! [`ProjectState`] aggregate tracking each file's parameters, regenerates
//! output files, and persists the whole aggregate as a snapshot inside the
//! project root so a session can be resumed.
//!
//! Persistence is deliberately forgiving on the way in: a missing, corrupt,
//! or out-of-date snapshot restores as "no prior state" and the caller
//! falls back to a fresh scan. There is no cross-process locking; two
//! sessions writing the same root race on the snapshot, last writer wins.

mod error;
mod project;
mod snapshot;
mod walk;

pub use error::{PersistenceError, ProjectError};
pub use project::{GenerateMode, GenerateReport, ProjectState, RescanReport};
pub use snapshot::SNAPSHOT_FILE;
pub use walk::{DEFAULT_IGNORE_PATTERNS, TEMPLATE_PATTERN, TemplateFilter, find_templates};
