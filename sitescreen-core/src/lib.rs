//! Core domain types for the sitescreen suitability engine.
//!
//! The crate owns the construction suitability scoring model and the seams
//! around it:
//!
//! - [`IndicatorSet`] holds the five validated indicators of a location.
//!   Constructors return `Result` so malformed input surfaces before it can
//!   produce a nonsensical score.
//! - [`compute_score`] and [`SuitabilityModel`] apply the weighted sum.
//! - [`Grid`] carries per-pixel layers and the raster algebra used to build
//!   them; [`summarize`] reduces layers to area means.
//! - [`GeoProvider`] abstracts the remote geospatial service, with
//!   [`ProviderSession`] memoising its connection and [`AccessGate`]
//!   guarding it.
//!
//! # Examples
//!
//! ```
//! use sitescreen_core::{IndicatorSet, compute_score};
//!
//! # fn main() -> Result<(), sitescreen_core::ScoreError> {
//! let indicators = IndicatorSet::new(1.0, 1.0, 1.0, 0.0, 1.0)?;
//! let score = compute_score(&indicators);
//! assert!((score.value() - 0.85).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod auth;
mod error;
mod indicator;
pub mod provider;
pub mod raster;
mod score;
pub mod session;
mod summary;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
mod weights;

pub use auth::{AccessDecision, AccessError, AccessGate, CredentialTable, CredentialVerifier};
pub use error::{IndicatorProblem, ScoreError};
pub use indicator::{Indicator, IndicatorRecord, IndicatorSet};
pub use provider::{
    AreaError, AreaOfInterest, CollectionQuery, DatasetCatalog, DateRange, DateRangeError,
    ExportRequest, ExportTask, GeoProvider, ImageCollection, ProviderError, Scene, TileLayer,
    TileStyle,
};
pub use raster::{Grid, GridTransform, RasterError};
pub use score::{IndicatorLayers, Score, SuitabilityModel, compute_score};
pub use session::{ProviderConnector, ProviderSession};
pub use summary::{DEFAULT_SUMMARY_SCALE, Summary, SummaryError, summarize};
pub use weights::{ScoreWeights, WEIGHT_SUM_TOLERANCE};
