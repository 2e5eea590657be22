//! Indicator weights for the suitability score.
//!
//! The weights must be finite, non-negative, and sum to one so that a score
//! built from indicators in `0.0..=1.0` stays in `0.0..=1.0`.

use crate::{Indicator, ScoreError};

/// Allowed deviation of the weight total from `1.0`.
///
/// Decimal weights such as `0.15` have no exact binary representation, so
/// the total is compared with a small tolerance.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Relative weight of each indicator in the composite score.
///
/// # Examples
/// ```
/// use sitescreen_core::{Indicator, ScoreWeights};
///
/// let weights = ScoreWeights::default();
/// assert_eq!(weights.weight(Indicator::BareAndDry), 0.3);
/// assert!(ScoreWeights::new(0.5, 0.5, 0.0, 0.0, 0.0).is_ok());
/// assert!(ScoreWeights::new(0.5, 0.5, 0.5, 0.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreWeights {
    bare_and_dry: f64,
    flat: f64,
    flood_free: f64,
    near_road: f64,
    unprotected: f64,
}

impl ScoreWeights {
    /// Validate and construct a weight table.
    ///
    /// # Errors
    /// Returns [`ScoreError::InvalidWeight`] for a negative or non-finite
    /// weight and [`ScoreError::WeightsDoNotSumToOne`] when the total
    /// deviates from `1.0` by more than [`WEIGHT_SUM_TOLERANCE`].
    pub fn new(
        bare_and_dry: f64,
        flat: f64,
        flood_free: f64,
        near_road: f64,
        unprotected: f64,
    ) -> Result<Self, ScoreError> {
        Self {
            bare_and_dry,
            flat,
            flood_free,
            near_road,
            unprotected,
        }
        .validate()
    }

    /// Check the invariants and return `self` unchanged.
    ///
    /// Deserialised weights bypass [`ScoreWeights::new`], so callers should
    /// validate them before use.
    ///
    /// # Errors
    /// See [`ScoreWeights::new`].
    #[expect(
        clippy::float_arithmetic,
        reason = "validation compares the weight total against one"
    )]
    pub fn validate(self) -> Result<Self, ScoreError> {
        if let Some(field) = Indicator::ALL.into_iter().find(|&field| {
            let value = self.weight(field);
            !value.is_finite() || value < 0.0
        }) {
            return Err(ScoreError::InvalidWeight {
                field,
                value: self.weight(field),
            });
        }
        let sum = self.total();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoreError::WeightsDoNotSumToOne { sum });
        }
        Ok(self)
    }

    /// Return the weight applied to `indicator`.
    #[must_use]
    pub const fn weight(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::BareAndDry => self.bare_and_dry,
            Indicator::Flat => self.flat,
            Indicator::FloodFree => self.flood_free,
            Indicator::NearRoad => self.near_road,
            Indicator::Unprotected => self.unprotected,
        }
    }

    /// Sum of all weights, accumulated in canonical order.
    #[must_use]
    pub fn total(&self) -> f64 {
        Indicator::ALL
            .into_iter()
            .map(|indicator| self.weight(indicator))
            .sum()
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            bare_and_dry: 0.3,
            flat: 0.2,
            flood_free: 0.2,
            near_road: 0.15,
            unprotected: 0.15,
        }
    }
}
