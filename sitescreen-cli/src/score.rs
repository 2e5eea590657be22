//! Score command implementation for the sitescreen CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sitescreen_core::{IndicatorRecord, IndicatorSet, Score, ScoreWeights, SuitabilityModel};

use crate::inputs::{read_json, write_json};
use crate::{
    ARG_BARE_AND_DRY, ARG_FLAT, ARG_FLOOD_FREE, ARG_INDICATORS, ARG_NEAR_ROAD, ARG_UNPROTECTED,
    ARG_WEIGHTS, CliError, ENV_INDICATORS,
};

/// CLI arguments for the `score` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Combine the five indicator fractions of a parcel into a \
                 weighted suitability score. Indicators can come from a \
                 JSON file, individual flags, or both; flags override the \
                 file.",
    about = "Score a parcel from its indicator fractions"
)]
#[ortho_config(prefix = "SITESCREEN")]
pub(crate) struct ScoreArgs {
    /// JSON file holding `is_bare_and_dry`, `is_flat`, `is_flood_free`,
    /// `is_near_road` and `is_unprotected`.
    #[arg(long = ARG_INDICATORS, value_name = "path")]
    #[serde(default)]
    pub(crate) indicators: Option<Utf8PathBuf>,
    /// Fraction of the parcel that is bare and dry.
    #[arg(long = ARG_BARE_AND_DRY, value_name = "fraction")]
    #[serde(default)]
    pub(crate) bare_and_dry: Option<f64>,
    /// Fraction of the parcel that is flat.
    #[arg(long = ARG_FLAT, value_name = "fraction")]
    #[serde(default)]
    pub(crate) flat: Option<f64>,
    /// Fraction of the parcel outside the flood extent.
    #[arg(long = ARG_FLOOD_FREE, value_name = "fraction")]
    #[serde(default)]
    pub(crate) flood_free: Option<f64>,
    /// Fraction of the parcel near a road.
    #[arg(long = ARG_NEAR_ROAD, value_name = "fraction")]
    #[serde(default)]
    pub(crate) near_road: Option<f64>,
    /// 1 when the parcel is unprotected, 0 otherwise.
    #[arg(long = ARG_UNPROTECTED, value_name = "fraction")]
    #[serde(default)]
    pub(crate) unprotected: Option<f64>,
    /// JSON file overriding the default indicator weights.
    #[arg(long = ARG_WEIGHTS, value_name = "path")]
    #[serde(default)]
    pub(crate) weights: Option<Utf8PathBuf>,
}

impl ScoreArgs {
    pub(crate) fn into_config(self) -> Result<ScoreConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ScoreConfig::try_from(merged)
    }
}

/// Resolved `score` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoreConfig {
    /// Indicator file, read before the flag overrides are applied.
    pub(crate) indicators_path: Option<Utf8PathBuf>,
    /// Indicator values given as flags.
    pub(crate) overrides: IndicatorRecord,
    /// Weight file replacing the default weights.
    pub(crate) weights_path: Option<Utf8PathBuf>,
}

impl TryFrom<ScoreArgs> for ScoreConfig {
    type Error = CliError;

    fn try_from(args: ScoreArgs) -> Result<Self, Self::Error> {
        let overrides = IndicatorRecord {
            is_bare_and_dry: args.bare_and_dry,
            is_flat: args.flat,
            is_flood_free: args.flood_free,
            is_near_road: args.near_road,
            is_unprotected: args.unprotected,
        };
        if args.indicators.is_none() && overrides == IndicatorRecord::default() {
            return Err(CliError::MissingArgument {
                field: ARG_INDICATORS,
                env: ENV_INDICATORS,
            });
        }
        Ok(Self {
            indicators_path: args.indicators,
            overrides,
            weights_path: args.weights,
        })
    }
}

/// JSON document printed by the `score` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ScoreOutput {
    pub(crate) score: Score,
    pub(crate) indicators: IndicatorSet,
    pub(crate) weights: ScoreWeights,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_score_with(args, &mut stdout)
}

pub(crate) fn run_score_with(args: ScoreArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let output = execute_score(&config)?;
    write_json(writer, &output)
}

pub(crate) fn execute_score(config: &ScoreConfig) -> Result<ScoreOutput, CliError> {
    let from_file = config
        .indicators_path
        .as_deref()
        .map(|path| read_json::<IndicatorRecord>(ARG_INDICATORS, path))
        .transpose()?
        .unwrap_or_default();
    let indicators = IndicatorSet::try_from(from_file.overlay(config.overrides))?;
    let weights = match config.weights_path.as_deref() {
        Some(path) => read_json::<ScoreWeights>(ARG_WEIGHTS, path)?.validate()?,
        None => ScoreWeights::default(),
    };
    let score = SuitabilityModel::new(weights).score(&indicators);
    info!("scored parcel at {score}");
    Ok(ScoreOutput {
        score,
        indicators,
        weights,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ScoreConfig, CliError> {
    let merged = ScoreArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ScoreConfig::try_from(merged)
}
