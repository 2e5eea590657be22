//! Export command implementation for the sitescreen CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sitescreen_analysis::{AnalysisError, AnalysisRequest, ClassificationThresholds};
use sitescreen_core::{DateRange, ExportRequest, ExportTask, ProviderError};

use crate::analyse::{load_selected_area, run_analysis, thresholds_from_options};
use crate::inputs::{AreaSource, resolve_dates};
use crate::{
    ARG_AOI, ARG_BBOX, ARG_END, ARG_FILE_PREFIX, ARG_MAX_CLOUD_COVER, ARG_OUTPUT_DIR,
    ARG_PROTECTION_RULE, ARG_SCENE, ARG_START, CliError, ENV_EXPORT_OUTPUT_DIR, ENV_EXPORT_SCENE,
};

/// CLI arguments for the `export` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Run the suitability analysis and write the per-pixel \
                 score raster as an ESRI ASCII grid. Cells outside the \
                 area are written as no-data.",
    about = "Export the score raster for a parcel"
)]
#[ortho_config(prefix = "SITESCREEN")]
pub(crate) struct ExportArgs {
    /// Scene bundle JSON.
    #[arg(long = ARG_SCENE, value_name = "path")]
    #[serde(default)]
    pub(crate) scene: Option<Utf8PathBuf>,
    /// Directory receiving the raster.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
    /// File name prefix of the raster.
    #[arg(long = ARG_FILE_PREFIX, value_name = "name")]
    #[serde(default)]
    pub(crate) file_prefix: Option<String>,
    /// GeoJSON file holding the area polygon.
    #[arg(long = ARG_AOI, value_name = "path")]
    #[serde(default)]
    pub(crate) aoi: Option<Utf8PathBuf>,
    /// Bounding box `min_x,min_y,max_x,max_y` in degrees.
    #[arg(long = ARG_BBOX, value_name = "bounds", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) bbox: Option<String>,
    /// First acquisition date (inclusive, `YYYY-MM-DD`).
    #[arg(long = ARG_START, value_name = "date")]
    #[serde(default)]
    pub(crate) start: Option<String>,
    /// Last acquisition date (exclusive, `YYYY-MM-DD`).
    #[arg(long = ARG_END, value_name = "date")]
    #[serde(default)]
    pub(crate) end: Option<String>,
    /// `containment` (default) or `overlap`.
    #[arg(long = ARG_PROTECTION_RULE, value_name = "rule")]
    #[serde(default)]
    pub(crate) protection_rule: Option<String>,
    /// Drop optical scenes cloudier than this percentage.
    #[arg(long = ARG_MAX_CLOUD_COVER, value_name = "percent")]
    #[serde(default)]
    pub(crate) max_cloud_cover: Option<f64>,
}

impl ExportArgs {
    pub(crate) fn into_config(self) -> Result<ExportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ExportConfig::try_from(merged)
    }
}

/// Resolved `export` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExportConfig {
    pub(crate) scene: Utf8PathBuf,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) file_prefix: Option<String>,
    pub(crate) area: AreaSource,
    pub(crate) dates: DateRange,
    pub(crate) thresholds: ClassificationThresholds,
}

impl TryFrom<ExportArgs> for ExportConfig {
    type Error = CliError;

    fn try_from(args: ExportArgs) -> Result<Self, Self::Error> {
        let scene = args.scene.ok_or(CliError::MissingArgument {
            field: ARG_SCENE,
            env: ENV_EXPORT_SCENE,
        })?;
        let output_dir = args.output_dir.ok_or(CliError::MissingArgument {
            field: ARG_OUTPUT_DIR,
            env: ENV_EXPORT_OUTPUT_DIR,
        })?;
        Ok(Self {
            scene,
            output_dir,
            file_prefix: args.file_prefix,
            area: AreaSource::from_options(args.aoi, args.bbox.as_deref())?,
            dates: resolve_dates(args.start.as_deref(), args.end.as_deref())?,
            thresholds: thresholds_from_options(
                args.protection_rule.as_deref(),
                args.max_cloud_cover,
            )?,
        })
    }
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_export_with(args, &mut stdout)
}

pub(crate) fn run_export_with(args: ExportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let task = execute_export(&config)?;
    writeln!(writer, "{}", task.id).map_err(CliError::WriteOutput)
}

pub(crate) fn execute_export(config: &ExportConfig) -> Result<ExportTask, CliError> {
    let aoi = load_selected_area(&config.area)?;
    let mut export = ExportRequest::new(&aoi).with_folder(config.output_dir.as_str());
    if let Some(prefix) = &config.file_prefix {
        export = export.with_file_prefix(prefix.as_str());
    }
    let request = AnalysisRequest::new(Some(aoi), config.dates).with_export(export);
    let report = run_analysis(&config.scene, config.thresholds, None, &request)?;
    report.export.ok_or_else(|| {
        AnalysisError::Provider(ProviderError::Unsupported {
            operation: "export_raster",
        })
        .into()
    })
}
