//! Behaviour-driven step definitions driving the analyse CLI scenarios.

use super::helpers::{Workspace, assert_close};
use super::*;
use crate::analyse::{AnalyseConfig, AnalyseOutput, execute_analyse};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sitescreen_core::AccessError;
use std::cell::RefCell;

/// Aggregates analyse CLI scenario state so each step only needs a single
/// world argument.
#[derive(Debug)]
struct AnalyseWorld {
    workspace: Workspace,
    cli_args: RefCell<Vec<String>>,
    cli_result: RefCell<Option<Result<AnalyseOutput, CliError>>>,
}

impl AnalyseWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            cli_args: RefCell::new(Vec::new()),
            cli_result: RefCell::new(None),
        }
    }

    fn push_flag(&self, flag: &str, value: &str) {
        self.cli_args
            .borrow_mut()
            .extend([format!("--{flag}"), value.to_owned()]);
    }

    fn expect_error<F: FnOnce(&CliError)>(&self, check: F) {
        let borrowed = self.cli_result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        check(error);
    }
}

#[fixture]
fn world() -> AnalyseWorld {
    AnalyseWorld::new()
}

#[given("a scene bundle for a two-pixel parcel")]
fn scene_bundle(#[from(world)] world: &AnalyseWorld) {
    let path = world.workspace.scene(None);
    world.push_flag(ARG_SCENE, path.as_str());
}

#[given("I omit the scene bundle")]
fn omit_scene(#[from(world)] world: &AnalyseWorld) {
    world.cli_args.borrow_mut().clear();
}

#[given("I pass the bounding box {bbox}")]
fn bounding_box(#[from(world)] world: &AnalyseWorld, bbox: String) {
    world.push_flag(ARG_BBOX, &bbox);
}

#[given("I log in as {username} with password {password}")]
fn log_in(#[from(world)] world: &AnalyseWorld, username: String, password: String) {
    let credentials = world.workspace.credentials();
    world.push_flag(ARG_CREDENTIALS, credentials.as_str());
    world.push_flag(ARG_USERNAME, &username);
    world.push_flag(ARG_PASSWORD, &password);
}

#[when("I run the analyse command")]
fn run_analyse_command(#[from(world)] world: &AnalyseWorld) {
    let mut invocation = vec!["sitescreen".to_owned(), "analyse".to_owned()];
    invocation.extend(world.cli_args.borrow().iter().cloned());
    let outcome = Cli::try_parse_from(invocation)
        .map_err(CliError::ArgumentParsing)
        .and_then(|cli| match cli.command {
            Command::Analyse(args) => AnalyseConfig::try_from(args),
            other => panic!("expected analyse command, found {other:?}"),
        })
        .and_then(|config| execute_analyse(&config));
    world.cli_result.replace(Some(outcome));
}

#[then("the command reports a score of {expected}")]
fn reports_score(#[from(world)] world: &AnalyseWorld, expected: f64) {
    let borrowed = world.cli_result.borrow();
    let output = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");
    assert_close(output.score.value(), expected);
}

#[then("the CLI reports that the \"scene\" flag is missing")]
fn reports_missing_scene(#[from(world)] world: &AnalyseWorld) {
    world.expect_error(|error| match error {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_SCENE),
        other => panic!("unexpected error {other:?}"),
    });
}

#[then("the command warns that an area is needed")]
fn warns_about_missing_area(#[from(world)] world: &AnalyseWorld) {
    world.expect_error(|error| {
        assert!(
            matches!(error, CliError::NoAreaSelected),
            "unexpected error {error:?}"
        );
        assert!(error.is_warning());
        assert!(!error.to_string().starts_with("Analysis failed"));
    });
}

#[then("the CLI reports invalid credentials")]
fn reports_invalid_credentials(#[from(world)] world: &AnalyseWorld) {
    world.expect_error(|error| {
        assert!(
            matches!(error, CliError::Access(AccessError::InvalidCredentials)),
            "unexpected error {error:?}"
        );
    });
}

macro_rules! register_analyse_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/analyse_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: AnalyseWorld) {
            let _ = world;
        }
    };
}

register_analyse_scenario!(
    analysing_a_bounding_box,
    "analysing a bounding box prints the score"
);
register_analyse_scenario!(rejecting_missing_scene, "rejecting a missing scene bundle");
register_analyse_scenario!(analysing_without_area, "analysing without an area");
register_analyse_scenario!(rejecting_wrong_password, "rejecting a wrong password");
register_analyse_scenario!(logging_in_first, "logging in before analysing");
