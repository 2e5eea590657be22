//! Errors raised while validating indicators and applying the score model.

use thiserror::Error;

use crate::Indicator;

/// Why an indicator value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IndicatorProblem {
    /// The field was absent from the input.
    #[error("is missing")]
    Missing,
    /// The value was non-finite or outside `0.0..=1.0`.
    #[error("value {value} is outside 0.0..=1.0")]
    OutOfRange {
        /// Offending value.
        value: f64,
    },
}

/// Errors returned while building indicator sets, weights, or scores.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// An indicator was missing or outside its declared range.
    #[error("invalid indicator set: {field} {problem}")]
    InvalidIndicatorSet {
        /// Indicator that failed validation.
        field: Indicator,
        /// What was wrong with it.
        problem: IndicatorProblem,
    },
    /// A weight was negative or non-finite.
    #[error("weight for {field} must be finite and non-negative, got {value}")]
    InvalidWeight {
        /// Indicator the weight applies to.
        field: Indicator,
        /// Offending weight.
        value: f64,
    },
    /// Weights did not add up to one.
    #[error("score weights must sum to 1.0, got {sum}")]
    WeightsDoNotSumToOne {
        /// Actual total.
        sum: f64,
    },
    /// An indicator layer did not match the reference raster shape.
    #[error("indicator layer {field} is {actual:?} cells but {expected:?} were expected")]
    LayerShapeMismatch {
        /// Layer with the wrong shape.
        field: Indicator,
        /// `(width, height)` of the reference layer.
        expected: (usize, usize),
        /// `(width, height)` of the offending layer.
        actual: (usize, usize),
    },
}

impl ScoreError {
    /// Shorthand for a missing indicator.
    #[must_use]
    pub const fn missing(field: Indicator) -> Self {
        Self::InvalidIndicatorSet {
            field,
            problem: IndicatorProblem::Missing,
        }
    }

    /// Shorthand for an out-of-range indicator.
    #[must_use]
    pub const fn out_of_range(field: Indicator, value: f64) -> Self {
        Self::InvalidIndicatorSet {
            field,
            problem: IndicatorProblem::OutOfRange { value },
        }
    }
}
