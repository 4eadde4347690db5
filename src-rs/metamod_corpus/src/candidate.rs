//! Scoring of corpus search rows against project properties.

use std::collections::HashSet;

use indexmap::IndexMap;
use metamod_model::ReferenceSample;
use metamod_unit::{Quantity, Unit};

use crate::collaborators::{CandidateRow, Ontology, TagId, TagRef};

/// The property category holding the project's species tag.
pub const SPECIES_CATEGORY: &str = "species";

/// The property category holding the project's cell-type tag.
pub const CELL_TYPE_CATEGORY: &str = "cell_type";

/// The mismatch label recorded when a row's unit cannot serve the
/// required unit.
pub const UNIT_MISMATCH: &str = "unit";

/// A corpus row scored against the project's properties.
///
/// When the row's unit converts to the required unit, `value` and `unit`
/// are the rescaled pair; otherwise they stay in the row's native unit and
/// the `unit` mismatch is recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Identifier of the corpus annotation record
    pub annotation_id: String,
    /// The candidate value, rescaled when possible
    pub value: f64,
    /// The unit `value` is expressed in
    pub unit: String,
    /// Classification tags attached to the row
    pub tags: Vec<TagRef>,
    /// The publication the row was extracted from, when known
    pub publication_id: Option<String>,
    /// The relevance score; higher is better
    pub score: i32,
    /// Property categories the row failed to match
    pub mismatches: Vec<String>,
}

impl Candidate {
    /// Bridges an accepted candidate into a reference sample for
    /// [`metamod_model::CorpusParameter::attach_references`].
    pub fn as_reference_sample(&self) -> ReferenceSample {
        ReferenceSample {
            id: self.annotation_id.clone(),
            value: self.value,
            unit: self.unit.clone(),
        }
    }
}

/// Scores corpus rows against the project properties and sorts them by
/// descending relevance.
///
/// The weights: a unit that cannot convert to `required_unit` costs 10; a
/// missed cell-type property costs 2; every other missed property costs 1.
/// Matches earn the same weight. A property matches when any row tag is the
/// wanted tag or one of its ontology descendants.
pub fn score_candidates<O>(
    rows: Vec<CandidateRow>,
    properties: &IndexMap<String, TagId>,
    required_unit: Option<&str>,
    ontology: &O,
) -> Vec<Candidate>
where
    O: Ontology + ?Sized,
{
    let mut candidates: Vec<Candidate> = rows
        .into_iter()
        .map(|row| score_row(row, properties, required_unit, ontology))
        .collect();

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

fn score_row<O>(
    row: CandidateRow,
    properties: &IndexMap<String, TagId>,
    required_unit: Option<&str>,
    ontology: &O,
) -> Candidate
where
    O: Ontology + ?Sized,
{
    let mut value = row.value;
    let mut unit = row.unit.clone();
    let mut score = 0;
    let mut mismatches = Vec::new();

    if let Some(required) = required_unit {
        match rescale_to(row.value, &row.unit, required) {
            Some(rescaled) => {
                value = rescaled;
                unit = required.to_string();
            }
            None => {
                score -= 10;
                mismatches.push(UNIT_MISMATCH.to_string());
            }
        }
    }

    for (category, wanted) in properties {
        let weight = if category == CELL_TYPE_CATEGORY { 2 } else { 1 };
        let acceptable = descendants_and_self(wanted, ontology);
        let hit = row.tags.iter().any(|tag| acceptable.contains(&tag.id));

        if hit {
            score += weight;
        } else {
            score -= weight;
            mismatches.push(category.clone());
        }
    }

    Candidate {
        annotation_id: row.annotation_id,
        value,
        unit,
        tags: row.tags,
        publication_id: row.publication_id,
        score,
        mismatches,
    }
}

/// The wanted tag plus its transitive ontology descendants.
fn descendants_and_self<O>(wanted: &TagId, ontology: &O) -> HashSet<TagId>
where
    O: Ontology + ?Sized,
{
    let mut acceptable = HashSet::new();
    let mut stack = vec![wanted.clone()];

    while let Some(tag) = stack.pop() {
        if acceptable.insert(tag.clone()) {
            stack.extend(ontology.children_of(&tag));
        }
    }

    acceptable
}

fn rescale_to(value: f64, from: &str, to: &str) -> Option<f64> {
    let from = Unit::parse(from).ok()?;
    let to = Unit::parse(to).ok()?;
    let rescaled = Quantity::new(value, from).rescale(&to).ok()?;
    Some(rescaled.value())
}
