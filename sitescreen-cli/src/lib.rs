//! Command-line interface for screening land parcels.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod analyse;
mod error;
mod export;
mod inputs;
mod score;

pub use error::CliError;

use analyse::AnalyseArgs;
use export::ExportArgs;
use score::ScoreArgs;

pub(crate) const ARG_INDICATORS: &str = "indicators";
pub(crate) const ARG_BARE_AND_DRY: &str = "bare-and-dry";
pub(crate) const ARG_FLAT: &str = "flat";
pub(crate) const ARG_FLOOD_FREE: &str = "flood-free";
pub(crate) const ARG_NEAR_ROAD: &str = "near-road";
pub(crate) const ARG_UNPROTECTED: &str = "unprotected";
pub(crate) const ARG_WEIGHTS: &str = "weights";
pub(crate) const ENV_INDICATORS: &str = "SITESCREEN_CMDS_SCORE_INDICATORS";

pub(crate) const ARG_SCENE: &str = "scene";
pub(crate) const ARG_AOI: &str = "aoi";
pub(crate) const ARG_BBOX: &str = "bbox";
pub(crate) const ARG_START: &str = "start";
pub(crate) const ARG_END: &str = "end";
pub(crate) const ARG_SUMMARY_CSV: &str = "summary-csv";
pub(crate) const ARG_EXPORT_DIR: &str = "export-dir";
pub(crate) const ARG_CREDENTIALS: &str = "credentials";
pub(crate) const ARG_USERNAME: &str = "username";
pub(crate) const ARG_PASSWORD: &str = "password";
pub(crate) const ARG_PROTECTION_RULE: &str = "protection-rule";
pub(crate) const ARG_MAX_CLOUD_COVER: &str = "max-cloud-cover";
pub(crate) const ENV_ANALYSE_SCENE: &str = "SITESCREEN_CMDS_ANALYSE_SCENE";
pub(crate) const ENV_ANALYSE_USERNAME: &str = "SITESCREEN_CMDS_ANALYSE_USERNAME";
pub(crate) const ENV_ANALYSE_PASSWORD: &str = "SITESCREEN_CMDS_ANALYSE_PASSWORD";

pub(crate) const ARG_OUTPUT_DIR: &str = "output-dir";
pub(crate) const ARG_FILE_PREFIX: &str = "file-prefix";
pub(crate) const ENV_EXPORT_SCENE: &str = "SITESCREEN_CMDS_EXPORT_SCENE";
pub(crate) const ENV_EXPORT_OUTPUT_DIR: &str = "SITESCREEN_CMDS_EXPORT_OUTPUT_DIR";

/// Run the sitescreen CLI with the current process arguments and environment.
///
/// # Errors
/// Returns a [`CliError`] describing the first failure: argument parsing,
/// configuration layering, input loading, or the command itself.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Score(args) => score::run_score(args),
        Command::Analyse(args) => analyse::run_analyse(args),
        Command::Export(args) => export::run_export(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "sitescreen",
    about = "Construction suitability screening for land parcels",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Combine five indicator fractions into a suitability score.
    Score(ScoreArgs),
    /// Classify a scene bundle over an area and report the score.
    Analyse(AnalyseArgs),
    /// Write the per-pixel score raster for an area.
    Export(ExportArgs),
}

#[cfg(test)]
mod tests;
