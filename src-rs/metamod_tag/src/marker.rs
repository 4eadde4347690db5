//! Parsed placeholder markers and their canonical keys.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A parsed occurrence of a placeholder marker in a text file.
///
/// A marker is the `#|name(key=value, ...)|#` tag embedded in a template.
/// Two physical occurrences with the same name and argument set are the same
/// logical parameter; see [`Marker::canonical_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    name: String,
    arguments: IndexMap<String, String>,
    offset: usize,
    raw: String,
}

impl Marker {
    pub(crate) fn new(
        name: String,
        arguments: IndexMap<String, String>,
        offset: usize,
        raw: String,
    ) -> Self {
        Self {
            name,
            arguments,
            offset,
            raw,
        }
    }

    /// Returns the marker name (the NAME component of the grammar).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the argument map in the order the arguments were written.
    ///
    /// Quotes have been stripped from both keys and values.
    pub fn arguments(&self) -> &IndexMap<String, String> {
        &self.arguments
    }

    /// Returns the byte offset of the marker in the scanned text.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the raw marker substring exactly as it appears in the text.
    ///
    /// This is the string to replace during generation.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the canonical key identifying this marker's logical parameter.
    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::new(self.name.clone(), &self.arguments)
    }
}

/// The `(name, argument-signature)` pair identifying one logical parameter.
///
/// The signature renders the arguments as `"k1"="v1", "k2"="v2"` in the order
/// they were first discovered, so two markers with the same arguments in a
/// different order are distinct parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalKey {
    name: String,
    signature: String,
}

impl CanonicalKey {
    /// Builds a canonical key from a marker name and its ordered arguments.
    pub fn new(name: String, arguments: &IndexMap<String, String>) -> Self {
        let signature = arguments
            .iter()
            .map(|(key, value)| format!("\"{key}\"=\"{value}\""))
            .collect::<Vec<_>>()
            .join(", ");

        Self { name, signature }
    }

    /// Returns the marker name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rendered argument signature (empty for a bare marker).
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.signature.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}({})", self.name, self.signature)
        }
    }
}
