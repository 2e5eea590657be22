//! Focused unit tests covering the export command.

use super::helpers::{Workspace, assert_close};
use super::*;
use crate::export::{ExportArgs, ExportConfig, execute_export, run_export_with};
use rstest::{fixture, rstest};

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

fn args_for(workspace: &Workspace) -> ExportArgs {
    ExportArgs {
        scene: Some(workspace.scene(None)),
        output_dir: Some(workspace.path("rasters")),
        bbox: Some("0,0,60,30".to_owned()),
        ..ExportArgs::default()
    }
}

#[rstest]
fn converting_export_without_output_dir_errors() {
    let args = ExportArgs {
        scene: Some("scene.json".into()),
        ..ExportArgs::default()
    };
    match ExportConfig::try_from(args).expect_err("missing output dir") {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_OUTPUT_DIR);
            assert_eq!(env, ENV_EXPORT_OUTPUT_DIR);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn exports_the_score_raster(workspace: Workspace) {
    let args = ExportArgs {
        file_prefix: Some("parcel_7".to_owned()),
        ..args_for(&workspace)
    };
    let config = ExportConfig::try_from(args).expect("config");
    let task = execute_export(&config).expect("export");

    let raster = workspace.path("rasters/parcel_7.asc");
    assert_eq!(task.id, format!("file:{raster}"));
    assert_eq!(task.description, "Suitability_GeoTIFF");
    let text = std::fs::read_to_string(&raster).expect("raster written");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("ncols 2"));
    assert_eq!(lines.next(), Some("nrows 1"));
    let cells: Vec<f64> = text
        .lines()
        .last()
        .expect("data row")
        .split(' ')
        .map(|cell| cell.parse().expect("numeric cell"))
        .collect();
    assert_eq!(cells.len(), 2);
    assert_close(cells[0], 1.0);
    assert_close(cells[1], 0.5);
}

#[rstest]
fn export_without_area_is_refused(workspace: Workspace) {
    let args = ExportArgs {
        bbox: None,
        ..args_for(&workspace)
    };
    let config = ExportConfig::try_from(args).expect("config");
    let err = execute_export(&config).expect_err("no area");
    assert!(
        matches!(err, CliError::NoAreaSelected),
        "unexpected error {err:?}"
    );
    assert!(err.is_warning());
    assert!(!workspace.path("rasters").exists());
}

#[rstest]
fn prints_the_task_id(workspace: Workspace) {
    let mut buffer = Vec::new();
    run_export_with(args_for(&workspace), &mut buffer).expect("export");
    let raster = workspace.path("rasters/land_suitability_score.asc");
    assert_eq!(
        String::from_utf8(buffer).expect("utf-8"),
        format!("file:{raster}\n")
    );
}
