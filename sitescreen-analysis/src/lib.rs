//! Indicator derivation and end-to-end analysis for sitescreen.
//!
//! The crate turns provider data into the indicators scored by
//! `sitescreen-core`:
//!
//! - [`median_composite`] and [`mean_composite`] reduce scene collections
//!   per pixel;
//! - [`slope_degrees`], [`RoadIndex`] and [`ProtectedAreaIndex`] measure
//!   terrain, road access and protection status;
//! - [`Classifier`] applies the threshold rules and reduces layers to area
//!   fractions;
//! - [`SuitabilityAnalysis`] chains provider calls, classification, scoring,
//!   summary, tiles and export for one request;
//! - [`SceneProvider`] serves all of it from a JSON scene bundle on disk.

#![forbid(unsafe_code)]

mod classify;
mod composite;
mod error;
mod pipeline;
mod protection;
mod proximity;
pub mod scene;
mod terrain;

pub use classify::{
    ClassificationInputs, ClassificationThresholds, Classifier, OPTICAL_BANDS, RADAR_BANDS,
    classify,
};
pub use composite::{Composite, Reducer, composite, mean_composite, median_composite};
pub use error::{AnalysisError, ClassifyError};
pub use pipeline::{
    AnalysisReport, AnalysisRequest, FLATNESS_SCORE_LABEL, SOIL_SCORE_LABEL, SuitabilityAnalysis,
};
pub use protection::{ProtectedAreaIndex, ProtectionRule};
pub use proximity::RoadIndex;
pub use scene::{SceneConnector, SceneError, SceneProvider};
pub use terrain::slope_degrees;
