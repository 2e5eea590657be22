//! Focused unit tests covering score command configuration and output.

use super::helpers::{Workspace, assert_close};
use super::*;
use crate::score::{ScoreArgs, ScoreConfig, config_from_layers_for_test, execute_score};
use rstest::rstest;
use serde_json::json;
use sitescreen_core::{Indicator, IndicatorProblem, ScoreError};

fn flags(values: [f64; 5]) -> ScoreArgs {
    let [bare_and_dry, flat, flood_free, near_road, unprotected] = values;
    ScoreArgs {
        bare_and_dry: Some(bare_and_dry),
        flat: Some(flat),
        flood_free: Some(flood_free),
        near_road: Some(near_road),
        unprotected: Some(unprotected),
        ..ScoreArgs::default()
    }
}

#[rstest]
fn converting_score_without_inputs_errors() {
    let err = ScoreConfig::try_from(ScoreArgs::default()).expect_err("no indicators");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_INDICATORS);
            assert_eq!(env, ENV_INDICATORS);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case([1.0, 1.0, 1.0, 1.0, 1.0], 1.0)]
#[case([0.0, 0.0, 0.0, 0.0, 0.0], 0.0)]
#[case([0.5, 1.0, 0.5, 1.0, 1.0], 0.75)]
#[case([0.8, 0.6, 0.9, 0.4, 1.0], 0.75)]
fn scores_flag_indicators(#[case] values: [f64; 5], #[case] expected: f64) {
    let config = ScoreConfig::try_from(flags(values)).expect("config");
    let output = execute_score(&config).expect("score");
    assert_close(output.score.value(), expected);
}

#[rstest]
fn flags_override_the_indicator_file() {
    let workspace = Workspace::new();
    let path = workspace.write_json(
        "indicators.json",
        &json!({
            "is_bare_and_dry": 0.5,
            "is_flat": 1.0,
            "is_flood_free": 0.5,
            "is_near_road": 1.0,
            "is_unprotected": 1.0
        }),
    );
    let args = ScoreArgs {
        indicators: Some(path),
        unprotected: Some(0.0),
        ..ScoreArgs::default()
    };
    let config = ScoreConfig::try_from(args).expect("config");
    let output = execute_score(&config).expect("score");
    assert_close(output.indicators.value(Indicator::Unprotected), 0.0);
    assert_close(output.score.value(), 0.6);
}

#[rstest]
fn missing_indicator_is_named() {
    let args = ScoreArgs {
        bare_and_dry: Some(0.5),
        ..ScoreArgs::default()
    };
    let config = ScoreConfig::try_from(args).expect("config");
    let err = execute_score(&config).expect_err("incomplete indicators");
    match err {
        CliError::Score(ScoreError::InvalidIndicatorSet { field, problem }) => {
            assert_eq!(field, Indicator::Flat);
            assert_eq!(problem, IndicatorProblem::Missing);
        }
        other => panic!("expected InvalidIndicatorSet, found {other:?}"),
    }
}

#[rstest]
fn out_of_range_flag_is_rejected() {
    let config = ScoreConfig::try_from(flags([1.5, 1.0, 1.0, 1.0, 1.0])).expect("config");
    let err = execute_score(&config).expect_err("out of range");
    assert!(
        matches!(
            err,
            CliError::Score(ScoreError::InvalidIndicatorSet {
                field: Indicator::BareAndDry,
                problem: IndicatorProblem::OutOfRange { .. },
            })
        ),
        "unexpected error {err:?}"
    );
}

#[rstest]
fn custom_weights_are_validated() {
    let workspace = Workspace::new();
    let path = workspace.write_json(
        "weights.json",
        &json!({
            "bare_and_dry": 0.5,
            "flat": 0.5,
            "flood_free": 0.5,
            "near_road": 0.0,
            "unprotected": 0.0
        }),
    );
    let args = ScoreArgs {
        weights: Some(path),
        ..flags([1.0, 1.0, 1.0, 1.0, 1.0])
    };
    let config = ScoreConfig::try_from(args).expect("config");
    let err = execute_score(&config).expect_err("weights sum to 1.5");
    assert!(
        matches!(err, CliError::Score(ScoreError::WeightsDoNotSumToOne { .. })),
        "unexpected error {err:?}"
    );
}

#[rstest]
fn custom_weights_change_the_score() {
    let workspace = Workspace::new();
    let path = workspace.write_json(
        "weights.json",
        &json!({
            "bare_and_dry": 1.0,
            "flat": 0.0,
            "flood_free": 0.0,
            "near_road": 0.0,
            "unprotected": 0.0
        }),
    );
    let args = ScoreArgs {
        weights: Some(path),
        ..flags([0.25, 1.0, 1.0, 1.0, 1.0])
    };
    let config = ScoreConfig::try_from(args).expect("config");
    let output = execute_score(&config).expect("score");
    assert_close(output.score.value(), 0.25);
}

#[rstest]
fn unreadable_indicator_file_names_the_path() {
    let workspace = Workspace::new();
    let path = workspace.write("indicators.json", "{ not json");
    let args = ScoreArgs {
        indicators: Some(path.clone()),
        ..ScoreArgs::default()
    };
    let config = ScoreConfig::try_from(args).expect("config");
    let err = execute_score(&config).expect_err("malformed file");
    match err {
        CliError::ParseInput {
            field,
            path: reported,
            ..
        } => {
            assert_eq!(field, ARG_INDICATORS);
            assert_eq!(reported, path);
        }
        other => panic!("expected ParseInput, found {other:?}"),
    }
}

#[rstest]
fn score_output_serialises_score_and_indicators() {
    let config = ScoreConfig::try_from(flags([0.5, 1.0, 0.5, 1.0, 1.0])).expect("config");
    let output = execute_score(&config).expect("score");
    let mut buffer = Vec::new();
    crate::inputs::write_json(&mut buffer, &output).expect("write");
    let value: serde_json::Value = serde_json::from_slice(&buffer).expect("json");
    assert_close(value["score"].as_f64().expect("score number"), 0.75);
    assert_eq!(value["indicators"]["is_flat"], json!(1.0));
    assert!(buffer.ends_with(b"\n"));
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;

    let workspace = Workspace::new();
    let from_file = workspace.path("from-file.json");
    let from_env = workspace.path("from-env.json");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({ "indicators": from_file.as_str(), "flat": 0.1, "near_road": 0.2 }),
        None,
    );
    composer.push_environment(json!({ "indicators": from_env.as_str(), "flat": 0.3 }));
    composer.push_cli(json!({ "flat": 0.9 }));

    let config = config_from_layers_for_test(composer.layers()).expect("merged config");
    assert_eq!(config.indicators_path, Some(from_env));
    assert_eq!(config.overrides.is_flat, Some(0.9));
    assert_eq!(config.overrides.is_near_road, Some(0.2));
    assert_eq!(config.weights_path, None);
}

#[rstest]
fn invalid_layer_maps_to_configuration_error() {
    use ortho_config::MergeComposer;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "flat": "level" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}
