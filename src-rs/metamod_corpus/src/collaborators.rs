//! Contracts for the external corpus, ontology, and publication services.
//!
//! The tool never talks to these services directly; callers hand in
//! implementations (or test doubles) of these traits.

use std::fmt;

use metamod_model::ParameterTypeId;
use serde::{Deserialize, Serialize};

/// Identifier of a classification tag in the external ontology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagId(String);

impl TagId {
    /// Creates a tag id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tag id together with its human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    /// The ontology tag id
    pub id: TagId,
    /// The tag's display name
    pub name: String,
}

/// The filter a corpus search runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConditions {
    /// The parameter type to search for
    pub type_id: ParameterTypeId,
    /// Classification tags narrowing the search
    pub tags: Vec<TagId>,
}

/// One raw row returned by a corpus search.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    /// Identifier of the corpus annotation record
    pub annotation_id: String,
    /// The row's central-tendency value in its native unit
    pub value: f64,
    /// The row's native unit string
    pub unit: String,
    /// Classification tags attached to the row
    pub tags: Vec<TagRef>,
    /// The publication the row was extracted from, when known
    pub publication_id: Option<String>,
}

/// A corpus search failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    /// What went wrong
    pub message: String,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corpus lookup failed: {}", self.message)
    }
}

impl std::error::Error for LookupError {}

/// The external annotation corpus.
pub trait CorpusSearch {
    /// Runs a filtered search and returns the matching candidate rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus service is unavailable.
    fn search(&self, filter: &FilterConditions) -> Result<Vec<CandidateRow>, LookupError>;
}

/// The external ontology of classification tags.
pub trait Ontology {
    /// Returns the direct children of a tag.
    fn children_of(&self, tag: &TagId) -> Vec<TagId>;

    /// Returns the display name of a tag, if the ontology knows it.
    fn name_of(&self, tag: &TagId) -> Option<String>;

    /// Returns the root category a tag belongs to, if the ontology knows
    /// it.
    fn root_category_of(&self, tag: &TagId) -> Option<TagId>;
}

/// A publication metadata fetch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The service did not answer but a retry may succeed
    Transient(String),
    /// The service answered that the publication cannot be served
    Permanent(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient(message) => write!(f, "transient fetch failure: {message}"),
            Self::Permanent(message) => write!(f, "permanent fetch failure: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Author, year, and journal of one publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationInfo {
    /// Author list as one display string
    pub authors: String,
    /// Publication year
    pub year: String,
    /// Journal name
    pub journal: String,
}

impl PublicationInfo {
    /// The placeholder served when the lookup stays unavailable.
    pub fn unavailable() -> Self {
        Self {
            authors: "no info available".to_string(),
            year: String::new(),
            journal: String::new(),
        }
    }

    /// Returns true if this is the unavailable placeholder.
    pub fn is_unavailable(&self) -> bool {
        *self == Self::unavailable()
    }
}

/// The external publication metadata service.
pub trait PublicationLookup {
    /// Fetches the metadata of one publication.
    ///
    /// # Errors
    ///
    /// Returns a transient error when a retry may succeed and a permanent
    /// one when it will not.
    fn fetch(&self, publication_id: &str) -> Result<PublicationInfo, FetchError>;
}
