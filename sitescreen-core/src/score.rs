//! The suitability score: a fixed weighted sum of the five indicators.
//!
//! `score = 0.3·bare_and_dry + 0.2·flat + 0.2·flood_free + 0.15·near_road
//! + 0.15·unprotected`
//!
//! Because the weights sum to one and every indicator lies in `0.0..=1.0`,
//! the score lies in `0.0..=1.0` and never decreases when an indicator
//! increases.
#![expect(
    clippy::float_arithmetic,
    reason = "the score is a floating-point weighted sum"
)]

use std::fmt;

use log::debug;

use crate::indicator::check_unit_interval;
use crate::{Grid, Indicator, IndicatorSet, ScoreError, ScoreWeights};

/// A suitability score, nominally in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Score(f64);

impl Score {
    /// Return the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

/// Compute the suitability score with the default weights.
///
/// # Examples
/// ```
/// use sitescreen_core::{IndicatorSet, compute_score};
///
/// let set = IndicatorSet::new(0.0, 1.0, 0.0, 1.0, 0.0)?;
/// assert!((compute_score(&set).value() - 0.35).abs() < 1e-12);
/// # Ok::<(), sitescreen_core::ScoreError>(())
/// ```
#[must_use]
pub fn compute_score(indicators: &IndicatorSet) -> Score {
    SuitabilityModel::default().score(indicators)
}

/// Per-pixel indicator layers for an area.
///
/// The unprotected indicator is decided for the whole area and is broadcast
/// to every cell when scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorLayers {
    /// Bare and dry pixels.
    pub bare_and_dry: Grid<f64>,
    /// Flat pixels.
    pub flat: Grid<f64>,
    /// Flood-free pixels.
    pub flood_free: Grid<f64>,
    /// Pixels near a road.
    pub near_road: Grid<f64>,
    /// Area-level protected-area indicator.
    pub unprotected: f64,
}

impl IndicatorLayers {
    /// Return the pixel layer for `indicator`, or `None` for the area-level
    /// unprotected indicator.
    #[must_use]
    pub const fn layer(&self, indicator: Indicator) -> Option<&Grid<f64>> {
        match indicator {
            Indicator::BareAndDry => Some(&self.bare_and_dry),
            Indicator::Flat => Some(&self.flat),
            Indicator::FloodFree => Some(&self.flood_free),
            Indicator::NearRoad => Some(&self.near_road),
            Indicator::Unprotected => None,
        }
    }

    fn pixel_layers(&self) -> [(Indicator, &Grid<f64>); 4] {
        [
            (Indicator::BareAndDry, &self.bare_and_dry),
            (Indicator::Flat, &self.flat),
            (Indicator::FloodFree, &self.flood_free),
            (Indicator::NearRoad, &self.near_road),
        ]
    }
}

/// Weighted-sum scoring model.
///
/// # Examples
/// ```
/// use sitescreen_core::{IndicatorSet, ScoreWeights, SuitabilityModel};
///
/// let weights = ScoreWeights::new(0.2, 0.2, 0.2, 0.2, 0.2)?;
/// let model = SuitabilityModel::new(weights);
/// let set = IndicatorSet::new(1.0, 0.0, 0.0, 0.0, 0.0)?;
/// assert!((model.score(&set).value() - 0.2).abs() < 1e-12);
/// # Ok::<(), sitescreen_core::ScoreError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SuitabilityModel {
    weights: ScoreWeights,
}

impl SuitabilityModel {
    /// Build a model from validated weights.
    #[must_use]
    pub const fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Weights applied by this model.
    #[must_use]
    pub const fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Score one indicator set.
    #[must_use]
    pub fn score(&self, indicators: &IndicatorSet) -> Score {
        Score(
            indicators
                .iter()
                .map(|(indicator, value)| self.weights.weight(indicator) * value)
                .sum(),
        )
    }

    /// Score every pixel of `layers`.
    ///
    /// Masked (`NaN`) pixels in any layer stay masked in the result.
    ///
    /// # Errors
    /// Returns [`ScoreError::LayerShapeMismatch`] when the pixel layers are
    /// not co-registered, and [`ScoreError::InvalidIndicatorSet`] when an
    /// unmasked pixel or the area-level indicator lies outside `0.0..=1.0`.
    pub fn score_layers(&self, layers: &IndicatorLayers) -> Result<Grid<f64>, ScoreError> {
        let unprotected = check_unit_interval(Indicator::Unprotected, layers.unprotected)?;
        let reference = &layers.bare_and_dry;
        for (field, layer) in layers.pixel_layers() {
            if !reference.is_aligned_with(layer) {
                return Err(ScoreError::LayerShapeMismatch {
                    field,
                    expected: reference.shape(),
                    actual: layer.shape(),
                });
            }
            if let Some((col, row, &value)) = layer
                .iter_cells()
                .find(|&(_, _, value)| !value.is_nan() && !(0.0..=1.0).contains(value))
            {
                debug!("{field} out of range at cell ({col}, {row})");
                return Err(ScoreError::out_of_range(field, value));
            }
        }

        let mut scores = reference.map(|_| 0.0);
        for (field, layer) in layers.pixel_layers() {
            let weight = self.weights.weight(field);
            for (total, value) in scores.cells_mut().iter_mut().zip(layer.cells()) {
                *total += weight * value;
            }
        }
        let area_term = self.weights.weight(Indicator::Unprotected) * unprotected;
        for total in scores.cells_mut() {
            *total += area_term;
        }
        Ok(scores)
    }
}
