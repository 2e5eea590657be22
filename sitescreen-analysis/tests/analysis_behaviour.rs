//! Behavioural coverage for the end-to-end analysis and its protection rule.
#![expect(
    clippy::float_arithmetic,
    reason = "assertions compare floating-point scores"
)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use geo::{Coord, Rect, line_string};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sitescreen_analysis::{
    AnalysisError, AnalysisReport, AnalysisRequest, ClassificationThresholds, Classifier,
    ProtectionRule, SuitabilityAnalysis,
};
use sitescreen_core::test_support::MemoryProvider;
use sitescreen_core::{
    AreaOfInterest, DatasetCatalog, DateRange, Grid, GridTransform, Indicator, Scene,
};

struct Parcel {
    provider: MemoryProvider,
    aoi: Option<AreaOfInterest>,
    rule: ProtectionRule,
}

type Outcome = RefCell<Option<Result<AnalysisReport, AnalysisError>>>;

fn grid(cells: [f64; 2]) -> Grid<f64> {
    let transform = GridTransform::new(Coord { x: 0.0, y: 30.0 }, 30.0);
    Grid::from_vec(2, 1, transform, cells.to_vec()).expect("valid grid")
}

fn scene(bands: &[(&str, [f64; 2])]) -> Scene {
    Scene {
        acquired: "2023-11-12".parse().expect("valid date"),
        cloudy_pixel_percentage: Some(2.0),
        bands: bands
            .iter()
            .map(|&(name, cells)| (name.to_owned(), grid(cells)))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[fixture]
fn parcel() -> RefCell<Option<Parcel>> {
    RefCell::new(None)
}

#[fixture]
fn outcome() -> Outcome {
    RefCell::new(None)
}

#[given("a two-pixel parcel whose west half is bare and dry")]
fn given_parcel(#[from(parcel)] parcel: &RefCell<Option<Parcel>>) {
    let catalog = DatasetCatalog::default();
    let provider = MemoryProvider::default()
        .with_scene(
            &catalog.optical,
            scene(&[
                ("B4", [1200.0, 300.0]),
                ("B8", [1400.0, 3000.0]),
                ("B11", [2500.0, 800.0]),
            ]),
        )
        .with_scene(
            &catalog.radar,
            scene(&[("VV", [-18.0, -9.0]), ("VH", [-24.0, -14.0])]),
        )
        .with_elevation(grid([4.0, 4.0]))
        .with_surface_water(grid([0.0, 1.0]))
        .with_roads(vec![line_string![(x: 0.0, y: -200.0), (x: 0.0, y: 200.0)]]);
    *parcel.borrow_mut() = Some(Parcel {
        provider,
        aoi: Some(AreaOfInterest::from_bounds(0.0, 0.0, 60.0, 30.0).expect("valid area")),
        rule: ProtectionRule::default(),
    });
}

#[given("a protected reserve spanning x from {min_x} to {max_x}")]
fn given_reserve(#[from(parcel)] parcel: &RefCell<Option<Parcel>>, min_x: f64, max_x: f64) {
    let mut guard = parcel.borrow_mut();
    let state = guard.as_mut().expect("parcel must be given first");
    let reserve = Rect::new(
        Coord { x: min_x, y: -10.0 },
        Coord { x: max_x, y: 100.0 },
    );
    state.provider = state
        .provider
        .clone()
        .with_protected_areas(vec![reserve.to_polygon()]);
}

#[given("the protection rule {rule}")]
fn given_rule(#[from(parcel)] parcel: &RefCell<Option<Parcel>>, rule: String) {
    let mut guard = parcel.borrow_mut();
    let state = guard.as_mut().expect("parcel must be given first");
    state.rule = rule.parse().expect("known protection rule");
}

#[given("no area is selected")]
fn given_no_area(#[from(parcel)] parcel: &RefCell<Option<Parcel>>) {
    let mut guard = parcel.borrow_mut();
    let state = guard.as_mut().expect("parcel must be given first");
    state.aoi = None;
}

#[when("I analyse the parcel")]
fn when_analyse(
    #[from(parcel)] parcel: &RefCell<Option<Parcel>>,
    #[from(outcome)] outcome: &Outcome,
) {
    let guard = parcel.borrow();
    let state = guard.as_ref().expect("parcel must be given first");
    let classifier = Classifier::new(ClassificationThresholds {
        protection_rule: state.rule,
        ..ClassificationThresholds::default()
    });
    let dates = DateRange::parse("2023-11-01", "2023-12-01").expect("valid dates");
    let request = AnalysisRequest::new(state.aoi.clone(), dates);
    let result = SuitabilityAnalysis::new(&state.provider)
        .with_classifier(classifier)
        .run(&request);
    *outcome.borrow_mut() = Some(result);
}

fn report(outcome: &Outcome) -> AnalysisReport {
    outcome
        .borrow()
        .clone()
        .expect("analysis must run")
        .expect("analysis should succeed")
}

#[then("the unprotected indicator is {expected}")]
fn then_unprotected(#[from(outcome)] outcome: &Outcome, expected: f64) {
    let value = report(outcome).indicators.value(Indicator::Unprotected);
    assert!(
        (value - expected).abs() < f64::EPSILON,
        "expected {expected}, got {value}"
    );
}

#[then("the score is {expected}")]
fn then_score(#[from(outcome)] outcome: &Outcome, expected: f64) {
    let score = report(outcome).score;
    assert!(
        (score.value() - expected).abs() < 1e-12,
        "expected {expected}, got {score}"
    );
}

#[then("the analysis asks for an area")]
fn then_refused(#[from(outcome)] outcome: &Outcome) {
    let err = outcome
        .borrow()
        .clone()
        .expect("analysis must run")
        .expect_err("analysis should be refused");
    assert_eq!(err, AnalysisError::NoAreaSelected);
    assert_eq!(
        err.to_string(),
        "Draw a polygon or enter a bounding box before running the analysis"
    );
}

#[scenario(path = "tests/features/analysis.feature", index = 0)]
fn reserve_enclosing_the_parcel(parcel: RefCell<Option<Parcel>>, outcome: Outcome) {
    let _ = (parcel, outcome);
}

#[scenario(path = "tests/features/analysis.feature", index = 1)]
fn reserve_covering_part_of_the_parcel(parcel: RefCell<Option<Parcel>>, outcome: Outcome) {
    let _ = (parcel, outcome);
}

#[scenario(path = "tests/features/analysis.feature", index = 2)]
fn partial_overlap_under_overlap_rule(parcel: RefCell<Option<Parcel>>, outcome: Outcome) {
    let _ = (parcel, outcome);
}

#[scenario(path = "tests/features/analysis.feature", index = 3)]
fn no_area_selected(parcel: RefCell<Option<Parcel>>, outcome: Outcome) {
    let _ = (parcel, outcome);
}
