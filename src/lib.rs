//! Facade crate for the land-parcel suitability engine.
//!
//! This crate re-exports the scoring core and exposes the raster analysis
//! pipeline behind the `analysis` feature flag.

#![forbid(unsafe_code)]

pub use sitescreen_core::{
    AccessError, AccessGate, AreaOfInterest, CredentialTable, CredentialVerifier, DateRange,
    GeoProvider, Grid, Indicator, IndicatorRecord, IndicatorSet, ProviderError, Score, ScoreError,
    ScoreWeights, Summary, SuitabilityModel, compute_score, summarize,
};

#[cfg(feature = "analysis")]
pub use sitescreen_analysis::{
    AnalysisError, AnalysisReport, AnalysisRequest, ClassificationThresholds, Classifier,
    ProtectionRule, SceneProvider, SuitabilityAnalysis, classify,
};
