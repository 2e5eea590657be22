//! Analyse command implementation for the sitescreen CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sitescreen_analysis::{
    AnalysisError, AnalysisReport, AnalysisRequest, ClassificationThresholds, Classifier,
    ProtectionRule, SceneConnector, SuitabilityAnalysis,
};
use sitescreen_core::{
    AccessGate, AreaOfInterest, CredentialTable, DateRange, ExportRequest, ExportTask, IndicatorSet,
    ProviderSession, Score, Summary, TileLayer,
};

use crate::inputs::{AreaSource, read_json, resolve_dates, write_json};
use crate::{
    ARG_AOI, ARG_BBOX, ARG_CREDENTIALS, ARG_END, ARG_EXPORT_DIR, ARG_MAX_CLOUD_COVER,
    ARG_PASSWORD, ARG_PROTECTION_RULE, ARG_SCENE, ARG_START, ARG_SUMMARY_CSV, ARG_USERNAME,
    CliError, ENV_ANALYSE_PASSWORD, ENV_ANALYSE_SCENE, ENV_ANALYSE_USERNAME,
};

/// CLI arguments for the `analyse` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Classify a scene bundle over an area of interest, derive \
                 the five suitability indicators and print the weighted \
                 score. The area comes from a GeoJSON polygon or a \
                 bounding box; the polygon wins when both are set.",
    about = "Analyse a parcel from a scene bundle"
)]
#[ortho_config(prefix = "SITESCREEN")]
pub(crate) struct AnalyseArgs {
    /// Scene bundle JSON supplying imagery, terrain, water, roads and
    /// protected areas.
    #[arg(long = ARG_SCENE, value_name = "path")]
    #[serde(default)]
    pub(crate) scene: Option<Utf8PathBuf>,
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
    /// Write the soil and flatness means to this CSV file.
    #[arg(long = ARG_SUMMARY_CSV, value_name = "path")]
    #[serde(default)]
    pub(crate) summary_csv: Option<Utf8PathBuf>,
    /// Also export the score raster into this directory.
    #[arg(long = ARG_EXPORT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) export_dir: Option<Utf8PathBuf>,
    /// JSON object mapping usernames to passwords. Enables the login gate.
    #[arg(long = ARG_CREDENTIALS, value_name = "path")]
    #[serde(default)]
    pub(crate) credentials: Option<Utf8PathBuf>,
    /// Username checked against the credentials file.
    #[arg(long = ARG_USERNAME, value_name = "name")]
    #[serde(default)]
    pub(crate) username: Option<String>,
    /// Password checked against the credentials file.
    #[arg(long = ARG_PASSWORD, value_name = "password")]
    #[serde(default)]
    pub(crate) password: Option<String>,
    /// `containment` (default) or `overlap`.
    #[arg(long = ARG_PROTECTION_RULE, value_name = "rule")]
    #[serde(default)]
    pub(crate) protection_rule: Option<String>,
    /// Drop optical scenes cloudier than this percentage.
    #[arg(long = ARG_MAX_CLOUD_COVER, value_name = "percent")]
    #[serde(default)]
    pub(crate) max_cloud_cover: Option<f64>,
}

impl AnalyseArgs {
    pub(crate) fn into_config(self) -> Result<AnalyseConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AnalyseConfig::try_from(merged)
    }
}

/// Login requested through the credentials options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Login {
    pub(crate) credentials: Utf8PathBuf,
    pub(crate) username: String,
    pub(crate) password: String,
}

impl Login {
    fn from_options(
        credentials: Option<Utf8PathBuf>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Option<Self>, CliError> {
        let Some(credentials_path) = credentials else {
            return Ok(None);
        };
        let user = username.ok_or(CliError::MissingArgument {
            field: ARG_USERNAME,
            env: ENV_ANALYSE_USERNAME,
        })?;
        let secret = password.ok_or(CliError::MissingArgument {
            field: ARG_PASSWORD,
            env: ENV_ANALYSE_PASSWORD,
        })?;
        Ok(Some(Self {
            credentials: credentials_path,
            username: user,
            password: secret,
        }))
    }

    /// Load the credential table and log in.
    pub(crate) fn authenticate(&self) -> Result<AccessGate<CredentialTable>, CliError> {
        let table: CredentialTable = read_json(ARG_CREDENTIALS, &self.credentials)?;
        let mut gate = AccessGate::new(table);
        gate.login(&self.username, &self.password)?;
        Ok(gate)
    }
}

/// Resolved `analyse` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnalyseConfig {
    pub(crate) scene: Utf8PathBuf,
    pub(crate) area: AreaSource,
    pub(crate) dates: DateRange,
    pub(crate) summary_csv: Option<Utf8PathBuf>,
    pub(crate) export_dir: Option<Utf8PathBuf>,
    pub(crate) login: Option<Login>,
    pub(crate) thresholds: ClassificationThresholds,
}

impl TryFrom<AnalyseArgs> for AnalyseConfig {
    type Error = CliError;

    fn try_from(args: AnalyseArgs) -> Result<Self, Self::Error> {
        let scene = args.scene.ok_or(CliError::MissingArgument {
            field: ARG_SCENE,
            env: ENV_ANALYSE_SCENE,
        })?;
        let area = AreaSource::from_options(args.aoi, args.bbox.as_deref())?;
        let dates = resolve_dates(args.start.as_deref(), args.end.as_deref())?;
        let login = Login::from_options(args.credentials, args.username, args.password)?;
        let thresholds = thresholds_from_options(
            args.protection_rule.as_deref(),
            args.max_cloud_cover,
        )?;
        Ok(Self {
            scene,
            area,
            dates,
            summary_csv: args.summary_csv,
            export_dir: args.export_dir,
            login,
            thresholds,
        })
    }
}

pub(crate) fn thresholds_from_options(
    protection_rule: Option<&str>,
    max_cloud_cover: Option<f64>,
) -> Result<ClassificationThresholds, CliError> {
    let mut thresholds = ClassificationThresholds::default();
    if let Some(text) = protection_rule {
        thresholds.protection_rule = text.parse::<ProtectionRule>().map_err(|reason| {
            CliError::InvalidArgument {
                field: ARG_PROTECTION_RULE,
                value: text.to_owned(),
                reason,
            }
        })?;
    }
    if let Some(percent) = max_cloud_cover {
        thresholds.max_cloud_cover = percent;
    }
    Ok(thresholds)
}

/// JSON document printed by the `analyse` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct AnalyseOutput {
    pub(crate) score: Score,
    pub(crate) indicators: IndicatorSet,
    pub(crate) summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tiles: Option<TileLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) export: Option<ExportTask>,
}

impl From<AnalysisReport> for AnalyseOutput {
    fn from(report: AnalysisReport) -> Self {
        Self {
            score: report.score,
            indicators: report.indicators,
            summary: report.summary,
            tiles: report.tiles,
            export: report.export,
        }
    }
}

pub(crate) fn run_analyse(args: AnalyseArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_analyse_with(args, &mut stdout)
}

pub(crate) fn run_analyse_with(args: AnalyseArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let output = execute_analyse(&config)?;
    write_json(writer, &output)
}

pub(crate) fn execute_analyse(config: &AnalyseConfig) -> Result<AnalyseOutput, CliError> {
    let aoi = load_selected_area(&config.area)?;
    let gate = config.login.as_ref().map(Login::authenticate).transpose()?;
    let export = config
        .export_dir
        .as_deref()
        .map(|dir| ExportRequest::new(&aoi).with_folder(dir.as_str()));
    let mut request = AnalysisRequest::new(Some(aoi), config.dates);
    if let Some(export_request) = export {
        request = request.with_export(export_request);
    }
    let report = run_analysis(&config.scene, config.thresholds, gate.as_ref(), &request)?;
    if let Some(path) = config.summary_csv.as_deref() {
        write_summary_csv(path, &report.summary)?;
        info!("wrote summary to {path}");
    }
    Ok(AnalyseOutput::from(report))
}

/// Load the area of interest, refusing to go further when none was given.
pub(crate) fn load_selected_area(area: &AreaSource) -> Result<AreaOfInterest, CliError> {
    area.load()?.ok_or_else(|| {
        warn!("no area selected; nothing to analyse");
        CliError::NoAreaSelected
    })
}

/// Connect to the scene bundle and run `request`, behind `gate` when a
/// login was requested.
pub(crate) fn run_analysis(
    scene: &Utf8Path,
    thresholds: ClassificationThresholds,
    gate: Option<&AccessGate<CredentialTable>>,
    request: &AnalysisRequest,
) -> Result<AnalysisReport, CliError> {
    if let Some(guard) = gate {
        guard.require_login().map_err(AnalysisError::from)?;
    }
    let session = ProviderSession::new(SceneConnector::new(scene));
    let provider = session.provider().map_err(AnalysisError::from)?;
    let analysis = SuitabilityAnalysis::new(provider)
        .with_classifier(Classifier::new(thresholds))
        .with_metres_per_unit(provider.metres_per_unit());
    Ok(analysis.run(request)?)
}

fn write_summary_csv(path: &Utf8Path, summary: &Summary) -> Result<(), CliError> {
    let to_error = |source: csv::Error| CliError::WriteSummary {
        path: path.to_path_buf(),
        source,
    };
    let file = sitescreen_fs::create_file(path).map_err(|err| to_error(err.into()))?;
    write_summary(file, summary).map_err(to_error)
}

/// Write `summary` as a two-column table headed `,Mean Value`.
///
/// Layers without a mean get an empty value.
pub(crate) fn write_summary<W: Write>(out: W, summary: &Summary) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["", "Mean Value"])?;
    for (label, mean) in summary.iter() {
        let value = mean.map(|value| value.to_string()).unwrap_or_default();
        writer.write_record([label, value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<AnalyseConfig, CliError> {
    let merged = AnalyseArgs::merge_from_layers(layers).map_err(CliError::from)?;
    AnalyseConfig::try_from(merged)
}
