//! The parameter-type registry seam.
//!
//! Whether a discovered marker becomes a corpus-backed parameter or a custom
//! one depends on whether its name is a known parameter type. That knowledge
//! lives outside this crate, so scanning takes the registry as an explicit
//! read-only collaborator.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a parameter type in the external corpus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterTypeId(String);

impl ParameterTypeId {
    /// Creates a type id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParameterTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps parameter names to corpus type ids.
pub trait ParameterTypeRegistry {
    /// Returns the type id bound to `name`, if the name is a known
    /// parameter type.
    fn lookup_type_id(&self, name: &str) -> Option<ParameterTypeId>;
}

/// An in-memory registry backed by a fixed name-to-id table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRegistry {
    types: IndexMap<String, ParameterTypeId>,
}

impl StaticRegistry {
    /// Creates an empty registry. Every marker scanned against it becomes a
    /// custom parameter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a parameter name to a type id.
    pub fn insert(&mut self, name: impl Into<String>, id: ParameterTypeId) {
        self.types.insert(name.into(), id);
    }
}

impl ParameterTypeRegistry for StaticRegistry {
    fn lookup_type_id(&self, name: &str) -> Option<ParameterTypeId> {
        self.types.get(name).cloned()
    }
}

impl FromIterator<(String, ParameterTypeId)> for StaticRegistry {
    fn from_iter<I: IntoIterator<Item = (String, ParameterTypeId)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}
