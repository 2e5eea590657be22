//! Errors raised while deriving indicators from provider data.

use sitescreen_core::{AccessError, ProviderError, RasterError, ScoreError, SummaryError};
use thiserror::Error;

/// Errors from compositing and classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    /// No scene survived the date and cloud filters.
    #[error("no scenes available in '{dataset}' for the requested window")]
    EmptyCollection {
        /// Dataset that returned no scenes.
        dataset: String,
    },
    /// A scene lacked a band needed by the rules.
    #[error("band '{band}' is missing from '{dataset}'")]
    MissingBand {
        /// Dataset that was composited.
        dataset: String,
        /// Band that was requested.
        band: String,
    },
    /// Layers could not be combined.
    #[error("raster layers could not be combined: {0}")]
    Raster(#[from] RasterError),
    /// Layers could not be summarised over the area.
    #[error("indicator layers could not be summarised: {0}")]
    Summary(#[from] SummaryError),
    /// The derived indicators were invalid.
    #[error(transparent)]
    Score(#[from] ScoreError),
    /// The area contains no valid pixels.
    #[error("the area of interest contains no valid pixels")]
    EmptyArea,
    /// The ground scale was not positive and finite.
    #[error("metres per map unit must be positive and finite, got {value}")]
    InvalidGroundScale {
        /// Offending value.
        value: f64,
    },
}

/// Errors returned by [`crate::SuitabilityAnalysis::run`].
///
/// Callers typically report every variant with one message; the variants
/// exist for logging and tests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The request had no area of interest. Nothing was run.
    #[error("Draw a polygon or enter a bounding box before running the analysis")]
    NoAreaSelected,
    /// The caller is not logged in.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// A provider call failed.
    #[error("provider request failed: {0}")]
    Provider(#[from] ProviderError),
    /// Indicators could not be derived.
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    /// The score could not be computed.
    #[error(transparent)]
    Score(#[from] ScoreError),
    /// The score summary could not be computed.
    #[error(transparent)]
    Summary(#[from] SummaryError),
}
