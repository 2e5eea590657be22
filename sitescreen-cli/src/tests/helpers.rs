//! Test helpers for writing scene bundles and input files to a scratch
//! directory.

use camino::Utf8PathBuf;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Scratch directory that lives as long as the test.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("write input file");
        path
    }

    pub(super) fn write_json(&self, name: &str, value: &Value) -> Utf8PathBuf {
        self.write(name, &value.to_string())
    }

    /// Write the two-pixel parcel bundle, optionally with one reserve
    /// spanning `min_x..max_x`.
    pub(super) fn scene(&self, reserve: Option<(f64, f64)>) -> Utf8PathBuf {
        self.write_json("scene.json", &parcel_bundle(reserve))
    }

    pub(super) fn credentials(&self) -> Utf8PathBuf {
        self.write_json(
            "credentials.json",
            &json!({ "admin": "demo123", "engineer": "build2024" }),
        )
    }
}

/// A 2x1 parcel of 30 m cells. The west cell is bare, dry and flat; the
/// east cell is vegetated and inside the flood extent. A road runs along
/// the western edge.
pub(super) fn parcel_bundle(reserve: Option<(f64, f64)>) -> Value {
    let protected_areas = reserve.map_or(Value::Null, |(min_x, max_x)| {
        json!({
            "type": "Polygon",
            "coordinates": [[
                [min_x, -10.0], [max_x, -10.0], [max_x, 100.0], [min_x, 100.0], [min_x, -10.0]
            ]]
        })
    });
    json!({
        "grid": { "origin": [0.0, 30.0], "cell_size": 30.0, "width": 2, "height": 1 },
        "collections": {
            "COPERNICUS/S2_SR": [
                { "acquired": "2023-11-12", "cloudy_pixel_percentage": 2.0,
                  "bands": {
                      "B4": [1200.0, 300.0],
                      "B8": [1400.0, 3000.0],
                      "B11": [2500.0, 800.0]
                  } }
            ],
            "COPERNICUS/S1_GRD": [
                { "acquired": "2023-11-12",
                  "bands": { "VV": [-18.0, -9.0], "VH": [-24.0, -14.0] } }
            ]
        },
        "elevation": [4.0, 4.0],
        "surface_water": [0.0, 1.0],
        "roads": { "type": "LineString", "coordinates": [[0.0, -200.0], [0.0, 200.0]] },
        "protected_areas": protected_areas
    })
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
