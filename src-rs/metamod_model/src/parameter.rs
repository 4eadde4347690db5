//! Parameter instances: the value to substitute for one canonical tag key.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{error::AggregationError, registry::ParameterTypeId, transformation::Transformation};

/// One corpus reference record backing a corpus-derived parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSample {
    /// Identifier of the corpus record
    pub id: String,
    /// The record's central-tendency value in its native unit
    pub value: f64,
    /// The record's native unit string
    pub unit: String,
}

/// The value to substitute for one canonical tag key.
///
/// A parameter is either derived from corpus reference records or entered by
/// hand. The variant is fixed at discovery time: names bound in the
/// parameter-type registry become corpus parameters, everything else becomes
/// custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterInstance {
    /// Aggregated from corpus reference records
    Corpus(CorpusParameter),
    /// Entered by hand with a justification
    Custom(CustomParameter),
}

impl ParameterInstance {
    /// Returns the current value, if one is set.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Corpus(parameter) => parameter.value,
            Self::Custom(parameter) => parameter.value,
        }
    }

    /// Returns the current unit, if one is set.
    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::Corpus(parameter) => parameter.unit.as_deref(),
            Self::Custom(parameter) => parameter.unit.as_deref(),
        }
    }

    /// Sets the value and unit together.
    ///
    /// A value is never meaningful without its unit, so the two are only
    /// settable as a pair.
    pub fn set_value(&mut self, value: f64, unit: impl Into<String>) {
        let (slot_value, slot_unit) = match self {
            Self::Corpus(parameter) => (&mut parameter.value, &mut parameter.unit),
            Self::Custom(parameter) => (&mut parameter.value, &mut parameter.unit),
        };
        *slot_value = Some(value);
        *slot_unit = Some(unit.into());
    }

    /// Returns true if the parameter is ready for generation.
    ///
    /// Both variants need a value and a unit; a custom parameter
    /// additionally needs a non-empty justification.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Corpus(parameter) => parameter.value.is_some() && parameter.unit.is_some(),
            Self::Custom(parameter) => {
                parameter.value.is_some()
                    && parameter.unit.is_some()
                    && !parameter.justification.trim().is_empty()
            }
        }
    }

    /// Returns the marker arguments the parameter was discovered with.
    pub fn arguments(&self) -> &IndexMap<String, String> {
        match self {
            Self::Corpus(parameter) => &parameter.arguments,
            Self::Custom(parameter) => &parameter.arguments,
        }
    }

    /// Returns the unit the marker asked for, if it carried a `unit`
    /// argument.
    pub fn required_unit(&self) -> Option<&str> {
        match self {
            Self::Corpus(parameter) => parameter.required_unit.as_deref(),
            Self::Custom(parameter) => parameter.required_unit.as_deref(),
        }
    }

    /// Returns the corpus variant, if this is one.
    pub fn as_corpus_mut(&mut self) -> Option<&mut CorpusParameter> {
        match self {
            Self::Corpus(parameter) => Some(parameter),
            Self::Custom(_) => None,
        }
    }

    /// Returns the custom variant, if this is one.
    pub fn as_custom_mut(&mut self) -> Option<&mut CustomParameter> {
        match self {
            Self::Corpus(_) => None,
            Self::Custom(parameter) => Some(parameter),
        }
    }
}

/// A parameter whose value aggregates corpus reference records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusParameter {
    type_id: ParameterTypeId,
    arguments: IndexMap<String, String>,
    required_unit: Option<String>,
    references: Vec<ReferenceSample>,
    transformation: Transformation,
    value: Option<f64>,
    unit: Option<String>,
}

impl CorpusParameter {
    /// Creates an empty corpus parameter for a marker's arguments.
    ///
    /// A `unit` argument, when present, is remembered as the required unit
    /// for candidate scoring.
    pub fn new(type_id: ParameterTypeId, arguments: IndexMap<String, String>) -> Self {
        let required_unit = arguments.get("unit").cloned();

        Self {
            type_id,
            arguments,
            required_unit,
            references: Vec::new(),
            transformation: Transformation::default(),
            value: None,
            unit: None,
        }
    }

    /// Returns the corpus parameter-type id.
    pub fn type_id(&self) -> &ParameterTypeId {
        &self.type_id
    }

    /// Returns the attached reference samples.
    pub fn references(&self) -> &[ReferenceSample] {
        &self.references
    }

    /// Returns the active transformation.
    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    /// Replaces the active transformation and recomputes the aggregate
    /// over the current reference set.
    ///
    /// # Errors
    ///
    /// Returns an error if the new transformation cannot aggregate the
    /// current samples; the previous transformation and aggregate are kept.
    pub fn set_transformation(
        &mut self,
        transformation: Transformation,
    ) -> Result<(), AggregationError> {
        let aggregate = transformation.apply(&self.references)?;
        self.transformation = transformation;
        self.store_aggregate(aggregate);
        Ok(())
    }

    /// Replaces the full reference set and recomputes the aggregate.
    ///
    /// An empty set clears the aggregate, leaving the parameter incomplete.
    ///
    /// # Errors
    ///
    /// Returns an error if the samples cannot be aggregated; the previous
    /// references and aggregate are kept.
    pub fn attach_references(
        &mut self,
        samples: Vec<ReferenceSample>,
    ) -> Result<(), AggregationError> {
        let aggregate = self.transformation.apply(&samples)?;
        self.references = samples;
        self.store_aggregate(aggregate);
        Ok(())
    }

    fn store_aggregate(&mut self, aggregate: Option<(f64, String)>) {
        match aggregate {
            Some((value, unit)) => {
                self.value = Some(value);
                self.unit = Some(unit);
            }
            None => {
                self.value = None;
                self.unit = None;
            }
        }
    }
}

/// A parameter entered by hand, with a justification for the chosen value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomParameter {
    arguments: IndexMap<String, String>,
    required_unit: Option<String>,
    value: Option<f64>,
    unit: Option<String>,
    justification: String,
}

impl CustomParameter {
    /// Creates an empty custom parameter for a marker's arguments.
    pub fn new(arguments: IndexMap<String, String>) -> Self {
        let required_unit = arguments.get("unit").cloned();

        Self {
            arguments,
            required_unit,
            value: None,
            unit: None,
            justification: String::new(),
        }
    }

    /// Returns the justification text.
    pub fn justification(&self) -> &str {
        &self.justification
    }

    /// Replaces the justification text.
    pub fn set_justification(&mut self, justification: impl Into<String>) {
        self.justification = justification.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn sample(id: &str, value: f64, unit: &str) -> ReferenceSample {
        ReferenceSample {
            id: id.to_string(),
            value,
            unit: unit.to_string(),
        }
    }

    mod success {
        use super::*;

        #[test]
        fn set_value_sets_both_fields_atomically() {
            let mut parameter =
                ParameterInstance::Custom(CustomParameter::new(IndexMap::new()));
            assert!(parameter.value().is_none());
            assert!(parameter.unit().is_none());

            parameter.set_value(3.5, "ms");
            assert_eq!(parameter.value(), Some(3.5));
            assert_eq!(parameter.unit(), Some("ms"));
        }

        #[test]
        fn custom_parameter_needs_a_justification_to_complete() {
            let mut parameter =
                ParameterInstance::Custom(CustomParameter::new(IndexMap::new()));
            parameter.set_value(1.0, "ms");
            assert!(!parameter.is_complete());

            parameter
                .as_custom_mut()
                .expect("should be the custom variant")
                .set_justification("measured in-house");
            assert!(parameter.is_complete());
        }

        #[test]
        fn blank_justification_does_not_count() {
            let mut parameter = CustomParameter::new(IndexMap::new());
            parameter.set_justification("   ");
            let mut instance = ParameterInstance::Custom(parameter);
            instance.set_value(1.0, "ms");
            assert!(!instance.is_complete());
        }

        #[test]
        fn attaching_references_computes_the_mean() {
            let mut parameter =
                CorpusParameter::new(ParameterTypeId::new("7"), IndexMap::new());

            parameter
                .attach_references(vec![sample("a", 5.0, "ms"), sample("b", 5000.0, "us")])
                .expect("units should be compatible");

            let instance = ParameterInstance::Corpus(parameter);
            assert!(instance.is_complete());
            assert_eq!(instance.unit(), Some("ms"));
            let value = instance.value().expect("should have a value");
            assert!((value - 5.0).abs() < 1e-12);
        }

        #[test]
        fn detaching_all_references_clears_the_aggregate() {
            let mut parameter =
                CorpusParameter::new(ParameterTypeId::new("7"), IndexMap::new());
            parameter
                .attach_references(vec![sample("a", 5.0, "ms")])
                .expect("should aggregate");

            parameter
                .attach_references(Vec::new())
                .expect("empty set is not an error");

            let instance = ParameterInstance::Corpus(parameter);
            assert!(!instance.is_complete());
            assert!(instance.value().is_none());
            assert!(instance.unit().is_none());
        }

        #[test]
        fn required_unit_comes_from_the_unit_argument() {
            let parameter = ParameterInstance::Corpus(CorpusParameter::new(
                ParameterTypeId::new("7"),
                args(&[("unit", "mV"), ("cell", "L5")]),
            ));
            assert_eq!(parameter.required_unit(), Some("mV"));

            let bare = ParameterInstance::Custom(CustomParameter::new(IndexMap::new()));
            assert_eq!(bare.required_unit(), None);
        }

        #[test]
        fn serde_round_trips_both_variants() {
            let mut corpus = CorpusParameter::new(
                ParameterTypeId::new("7"),
                args(&[("unit", "ms")]),
            );
            corpus
                .attach_references(vec![sample("a", 5.0, "ms")])
                .expect("should aggregate");
            let mut custom = CustomParameter::new(IndexMap::new());
            custom.set_justification("hand-tuned");

            for instance in [
                ParameterInstance::Corpus(corpus),
                ParameterInstance::Custom(custom),
            ] {
                let json = serde_json::to_string(&instance).expect("should serialize");
                let back: ParameterInstance =
                    serde_json::from_str(&json).expect("should deserialize");
                assert_eq!(back, instance);
            }
        }
    }

    mod error {
        use super::*;

        #[test]
        fn failed_aggregation_keeps_the_previous_state() {
            let mut parameter =
                CorpusParameter::new(ParameterTypeId::new("7"), IndexMap::new());
            parameter
                .attach_references(vec![sample("a", 5.0, "ms")])
                .expect("should aggregate");

            let err = parameter
                .attach_references(vec![sample("b", 1.0, "ms"), sample("c", 1.0, "mV")])
                .expect_err("mixed dimensions should fail");
            assert!(matches!(err, AggregationError::IncompatibleUnits(_)));

            assert_eq!(parameter.references().len(), 1);
            let instance = ParameterInstance::Corpus(parameter);
            assert_eq!(instance.value(), Some(5.0));
        }

        #[test]
        fn custom_transformation_code_fails_on_recompute() {
            let mut parameter =
                CorpusParameter::new(ParameterTypeId::new("7"), IndexMap::new());
            parameter
                .attach_references(vec![sample("a", 5.0, "ms")])
                .expect("should aggregate");

            let err = parameter
                .set_transformation(Transformation::Custom {
                    code: "median".to_string(),
                })
                .expect_err("custom codes are not implemented");
            assert!(matches!(err, AggregationError::NotImplemented { .. }));
            assert_eq!(parameter.transformation(), &Transformation::MeanAggregation);
        }
    }
}
