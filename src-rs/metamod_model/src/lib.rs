//! Parameter instances and template file registration.
//!
//! This crate owns the middle of the substitution pipeline: the
//! [`ParameterInstance`] model (the value that replaces one placeholder,
//! corpus-derived or hand-entered), the [`Transformation`] that aggregates
//! corpus reference samples into a value, and the [`FileRecord`] that tracks
//! one template file's parameters across scans, edits, and generation.
//!
//! Whether a discovered marker name is a known corpus parameter type is
//! decided by a [`ParameterTypeRegistry`], an explicitly passed-in
//! collaborator.

mod error;
mod file;
mod parameter;
mod registry;
mod transformation;

pub use error::{AggregationError, GenerateError};
pub use file::{FileRecord, RescanSummary, output_file_name};
pub use parameter::{CorpusParameter, CustomParameter, ParameterInstance, ReferenceSample};
pub use registry::{ParameterTypeId, ParameterTypeRegistry, StaticRegistry};
pub use transformation::Transformation;
