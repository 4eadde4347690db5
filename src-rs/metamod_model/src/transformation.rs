//! Transformations from reference samples to an aggregate value.

use metamod_unit::{Quantity, Unit};
use serde::{Deserialize, Serialize};

use crate::{error::AggregationError, parameter::ReferenceSample};

/// How a corpus parameter's reference samples become one value.
///
/// Mean aggregation is the only implemented transformation; other codes are
/// a serialized extension point and fail at apply time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transformation {
    /// Convert every sample to the unit of the first sample and take the
    /// arithmetic mean.
    #[default]
    MeanAggregation,
    /// A transformation code with no built-in implementation.
    Custom {
        /// The stored transformation code
        code: String,
    },
}

impl Transformation {
    /// Applies the transformation to a set of reference samples.
    ///
    /// An empty set aggregates to nothing, which is not an error; the
    /// owning parameter simply becomes incomplete.
    ///
    /// # Errors
    ///
    /// Returns an error if a sample's unit does not parse or cannot convert
    /// to the common unit, or if the transformation code has no
    /// implementation.
    pub fn apply(
        &self,
        samples: &[ReferenceSample],
    ) -> Result<Option<(f64, String)>, AggregationError> {
        let Some(first) = samples.first() else {
            return Ok(None);
        };

        match self {
            Self::MeanAggregation => mean_aggregation(first, samples).map(Some),
            Self::Custom { code } => Err(AggregationError::NotImplemented { code: code.clone() }),
        }
    }
}

/// Converts every sample to the first sample's unit and averages.
fn mean_aggregation(
    first: &ReferenceSample,
    samples: &[ReferenceSample],
) -> Result<(f64, String), AggregationError> {
    let common = parse_unit(&first.unit)?;

    let mut sum = 0.0;
    for sample in samples {
        let unit = parse_unit(&sample.unit)?;
        let rescaled = Quantity::new(sample.value, unit)
            .rescale(&common)
            .map_err(AggregationError::IncompatibleUnits)?;
        sum += rescaled.value();
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = sum / samples.len() as f64;

    Ok((mean, first.unit.clone()))
}

fn parse_unit(text: &str) -> Result<Unit, AggregationError> {
    Unit::parse(text).map_err(|error| AggregationError::InvalidUnit {
        unit: text.to_string(),
        error,
    })
}
