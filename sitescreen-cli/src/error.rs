//! Error types emitted by the sitescreen CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use sitescreen_analysis::{AnalysisError, SceneError};
use sitescreen_core::{AccessError, AreaError, DateRangeError, ScoreError};
use thiserror::Error;

/// Errors emitted by the sitescreen CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An option was present but could not be interpreted.
    #[error("invalid --{field} value {value:?}: {reason}")]
    InvalidArgument {
        field: &'static str,
        value: String,
        reason: String,
    },
    /// Reading an input file failed.
    #[error("failed to read {field} file {path:?}: {source}")]
    ReadInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An input file held malformed JSON.
    #[error("failed to parse {field} JSON at {path:?}: {source}")]
    ParseInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The area of interest could not be built.
    #[error("invalid area of interest: {0}")]
    Area(#[from] AreaError),
    /// The acquisition window could not be built.
    #[error(transparent)]
    Dates(#[from] DateRangeError),
    /// Indicators or weights failed validation.
    #[error(transparent)]
    Score(#[from] ScoreError),
    /// The scene bundle could not be loaded.
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// The login was rejected.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// Neither a polygon nor a bounding box was given. Nothing ran.
    #[error("Draw a polygon or enter a bounding box before running the analysis")]
    NoAreaSelected,
    /// The analysis itself failed.
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
    /// Writing the summary CSV failed.
    #[error("failed to write summary CSV to {path:?}: {source}")]
    WriteSummary {
        path: Utf8PathBuf,
        #[source]
        source: csv::Error,
    },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    /// Report whether this is a precondition warning rather than a failure.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::NoAreaSelected)
    }
}
