//! Candidate aggregation over the external literature corpus.
//!
//! The corpus, the tag ontology, and the publication metadata service are
//! external systems; this crate defines the trait contracts the tool
//! consumes them through, scores raw search rows against a project's
//! classification properties, and caches publication metadata on disk.
//!
//! Accepted candidates bridge into `metamod_model` reference samples via
//! [`Candidate::as_reference_sample`].

mod candidate;
mod collaborators;
mod pub_cache;

pub use candidate::{
    CELL_TYPE_CATEGORY, Candidate, SPECIES_CATEGORY, UNIT_MISMATCH, score_candidates,
};
pub use collaborators::{
    CandidateRow, CorpusSearch, FetchError, FilterConditions, LookupError, Ontology,
    PublicationInfo, PublicationLookup, TagId, TagRef,
};
pub use pub_cache::PublicationCache;
