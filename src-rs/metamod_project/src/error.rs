//! Error types for project operations and snapshot persistence.

use std::{fmt, io, path::PathBuf};

use metamod_model::GenerateError;
use metamod_tag::TagError;

/// A snapshot read or write failure.
#[derive(Debug)]
pub enum PersistenceError {
    /// The snapshot file could not be read or written
    Io(io::Error),
    /// The snapshot document could not be serialized or deserialized
    Format(serde_json::Error),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "snapshot i/o failed: {err}"),
            Self::Format(err) => write!(f, "snapshot format error: {err}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Format(err) => Some(err),
        }
    }
}

/// An error produced by a project-level operation.
#[derive(Debug)]
pub enum ProjectError {
    /// A discovery glob pattern did not compile
    InvalidPattern(globset::Error),
    /// Reading or writing a file under the project root failed
    Io {
        /// The file involved
        path: PathBuf,
        /// The underlying error
        error: io::Error,
    },
    /// A template's markers could not be scanned
    Scan {
        /// The template file, relative to the project root
        path: PathBuf,
        /// The underlying error
        error: TagError,
    },
    /// Generation failed for one template
    Generate {
        /// The template file, relative to the project root
        path: PathBuf,
        /// The underlying error
        error: GenerateError,
    },
    /// The project snapshot could not be written
    Persistence(PersistenceError),
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern(err) => write!(f, "invalid ignore pattern: {err}"),
            Self::Io { path, error } => write!(f, "{}: {error}", path.display()),
            Self::Scan { path, error } => write!(f, "{}: {error}", path.display()),
            Self::Generate { path, error } => write!(f, "{}: {error}", path.display()),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ProjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern(err) => Some(err),
            Self::Io { error, .. } => Some(error),
            Self::Scan { error, .. } => Some(error),
            Self::Generate { error, .. } => Some(error),
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<PersistenceError> for ProjectError {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err)
    }
}
