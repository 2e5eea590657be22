//! File-backed [`GeoProvider`] serving a pre-extracted scene bundle.
//!
//! A bundle holds everything one analysis needs on a single grid: dated
//! scenes per collection, elevation, the surface-water mask and the vector
//! layers. The command line tool uses it to run offline; the layout is
//! described in the `bundle` module.

mod ascii;
mod bundle;

use std::collections::BTreeMap;
use std::io::{self, BufWriter};

use camino::{Utf8Path, Utf8PathBuf};
use geo::{LineString, Polygon};
use log::{debug, info};
use sitescreen_core::{
    AreaOfInterest, CollectionQuery, ExportRequest, ExportTask, GeoProvider, Grid,
    ImageCollection, ProviderConnector, ProviderError, RasterError, Scene, TileLayer, TileStyle,
};
use thiserror::Error;

pub use ascii::NODATA;
use bundle::SceneBundle;

/// Errors raised while loading a scene bundle.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The bundle file could not be read.
    #[error("failed to read scene bundle from {path}: {source}")]
    Io {
        /// Location of the bundle.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The bundle was not valid JSON of the expected shape.
    #[error("failed to decode scene bundle from {origin}: {source}")]
    Decode {
        /// Where the JSON came from.
        origin: String,
        /// Decoder error returned by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A raster layer did not match the bundle grid.
    #[error("layer '{layer}' does not fit the bundle grid: {source}")]
    Layer {
        /// Layer name.
        layer: String,
        /// Raster validation error.
        #[source]
        source: RasterError,
    },
    /// A vector layer held invalid geometry.
    #[error("invalid {layer} geometry: {source}")]
    Geometry {
        /// Layer name.
        layer: &'static str,
        /// Conversion error returned by `geojson`.
        #[source]
        source: Box<geojson::Error>,
    },
    /// The grid's ground scale was not positive and finite.
    #[error("metres per map unit must be positive and finite, got {value}")]
    InvalidGroundScale {
        /// Offending value.
        value: f64,
    },
}

/// Provider answering every request from one scene bundle.
///
/// Requests are not clipped: the bundle is expected to cover the area
/// being analysed.
#[derive(Debug, Clone)]
pub struct SceneProvider {
    metres_per_unit: f64,
    collections: BTreeMap<String, Vec<Scene>>,
    elevation: Option<Grid<f64>>,
    surface_water: Option<Grid<f64>>,
    roads: Vec<LineString<f64>>,
    protected_areas: Vec<Polygon<f64>>,
}

impl SceneProvider {
    /// Load the bundle at `path`.
    ///
    /// # Errors
    /// Returns [`SceneError::Io`] when the file cannot be read, otherwise as
    /// [`SceneProvider::from_json`].
    pub fn load(path: &Utf8Path) -> Result<Self, SceneError> {
        let text = sitescreen_fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = serde_json::from_str(&text).map_err(|source| SceneError::Decode {
            origin: path.to_string(),
            source,
        })?;
        let provider = Self::from_bundle(bundle)?;
        info!(
            "loaded scene bundle {path} with {} collections",
            provider.collections.len()
        );
        Ok(provider)
    }

    /// Build a provider from bundle JSON.
    ///
    /// # Errors
    /// Returns [`SceneError::Decode`] for malformed JSON,
    /// [`SceneError::Layer`] when a raster does not fit the grid and
    /// [`SceneError::Geometry`] for invalid vector data.
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        let bundle = serde_json::from_str(text).map_err(|source| SceneError::Decode {
            origin: "inline JSON".to_owned(),
            source,
        })?;
        Self::from_bundle(bundle)
    }

    fn from_bundle(raw: SceneBundle) -> Result<Self, SceneError> {
        let SceneBundle {
            grid,
            collections,
            elevation,
            surface_water,
            roads,
            protected_areas,
        } = raw;
        let metres_per_unit = grid.metres_per_unit;
        if !metres_per_unit.is_finite() || metres_per_unit <= 0.0 {
            return Err(SceneError::InvalidGroundScale {
                value: metres_per_unit,
            });
        }

        let mut scenes_by_dataset = BTreeMap::new();
        for (dataset, scenes) in collections {
            let converted = scenes
                .into_iter()
                .map(|scene| grid.scene(&dataset, scene))
                .collect::<Result<Vec<_>, _>>()?;
            debug!("bundle collection '{dataset}' has {} scenes", converted.len());
            scenes_by_dataset.insert(dataset, converted);
        }

        Ok(Self {
            metres_per_unit,
            collections: scenes_by_dataset,
            elevation: elevation
                .map(|cells| grid.layer("elevation", cells))
                .transpose()?,
            surface_water: surface_water
                .map(|cells| grid.layer("surface_water", cells))
                .transpose()?,
            roads: bundle::lines(roads)?,
            protected_areas: bundle::polygons(protected_areas)?,
        })
    }

    /// Ground metres per map unit of the bundle grid.
    #[must_use]
    pub const fn metres_per_unit(&self) -> f64 {
        self.metres_per_unit
    }

    /// Dataset ids with at least one scene entry.
    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}

impl GeoProvider for SceneProvider {
    fn load_image_collection(
        &self,
        query: &CollectionQuery,
    ) -> Result<ImageCollection, ProviderError> {
        let scenes = self.collections.get(&query.dataset).ok_or_else(|| {
            ProviderError::request_failed(
                "load_image_collection",
                &format_args!("dataset '{}' is not in the bundle", query.dataset),
            )
        })?;
        let selected: Vec<Scene> = scenes
            .iter()
            .filter(|scene| query.accepts(scene))
            .map(|scene| {
                let mut kept = scene.clone();
                if !query.bands.is_empty() {
                    kept.bands.retain(|name, _| query.bands.contains(name));
                }
                kept
            })
            .collect();
        debug!(
            "'{}' kept {} of {} scenes for {}",
            query.dataset,
            selected.len(),
            scenes.len(),
            query.dates
        );
        Ok(ImageCollection {
            dataset: query.dataset.clone(),
            scenes: selected,
        })
    }

    fn elevation(&self, _dataset: &str, _aoi: &AreaOfInterest) -> Result<Grid<f64>, ProviderError> {
        self.elevation.clone().ok_or(ProviderError::Unsupported {
            operation: "elevation",
        })
    }

    fn surface_water_max_extent(
        &self,
        _dataset: &str,
        _aoi: &AreaOfInterest,
    ) -> Result<Grid<f64>, ProviderError> {
        self.surface_water.clone().ok_or(ProviderError::Unsupported {
            operation: "surface_water_max_extent",
        })
    }

    fn roads(
        &self,
        _dataset: &str,
        _aoi: &AreaOfInterest,
    ) -> Result<Vec<LineString<f64>>, ProviderError> {
        Ok(self.roads.clone())
    }

    fn protected_areas(
        &self,
        _dataset: &str,
        _aoi: &AreaOfInterest,
    ) -> Result<Vec<Polygon<f64>>, ProviderError> {
        Ok(self.protected_areas.clone())
    }

    fn render_tiles(
        &self,
        _layer: &Grid<f64>,
        _style: &TileStyle,
    ) -> Result<TileLayer, ProviderError> {
        Err(ProviderError::Unsupported {
            operation: "render_tiles",
        })
    }

    /// Write `layer` to `<folder>/<file_prefix>.asc` as an ESRI ASCII grid.
    ///
    /// The raster is written at its native resolution; cells whose centre
    /// lies outside the request region are written as [`NODATA`].
    fn export_raster(
        &self,
        layer: &Grid<f64>,
        request: &ExportRequest,
    ) -> Result<ExportTask, ProviderError> {
        const OPERATION: &str = "export_raster";
        let pixels = u64::try_from(layer.cells().len()).unwrap_or(u64::MAX);
        if pixels > request.max_pixels {
            return Err(ProviderError::request_failed(
                OPERATION,
                &format_args!(
                    "{pixels} pixels exceed the limit of {}",
                    request.max_pixels
                ),
            ));
        }
        let path = Utf8PathBuf::from(&request.folder).join(format!("{}.asc", request.file_prefix));
        let file = sitescreen_fs::create_file(&path)
            .map_err(|err| ProviderError::request_failed(OPERATION, &err))?;
        ascii::write_ascii_grid(BufWriter::new(file), layer, &request.region)
            .map_err(|err| ProviderError::request_failed(OPERATION, &err))?;
        info!("exported '{}' to {path}", request.description);
        Ok(ExportTask {
            id: format!("file:{path}"),
            description: request.description.clone(),
            destination: path.into_string(),
        })
    }
}

/// Connects a [`ProviderSession`](sitescreen_core::ProviderSession) to a
/// bundle on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneConnector {
    path: Utf8PathBuf,
}

impl SceneConnector {
    /// Connector for the bundle at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Bundle location.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl ProviderConnector for SceneConnector {
    type Provider = SceneProvider;

    fn connect(&self) -> Result<Self::Provider, ProviderError> {
        SceneProvider::load(&self.path).map_err(|err| ProviderError::Unavailable {
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use sitescreen_core::{DateRange, ProviderSession};
    use tempfile::TempDir;

    const BUNDLE: &str = r#"{
        "grid": { "origin": [0.0, 30.0], "cell_size": 30.0, "width": 2, "height": 1 },
        "collections": {
            "optical": [
                { "acquired": "2023-11-05", "cloudy_pixel_percentage": 4.0,
                  "bands": { "B4": [1200.0, null], "B8": [1400.0, 3000.0] } },
                { "acquired": "2023-11-06", "cloudy_pixel_percentage": 40.0,
                  "bands": { "B4": [1.0, 1.0], "B8": [1.0, 1.0] } },
                { "acquired": "2024-01-06", "cloudy_pixel_percentage": 1.0,
                  "bands": { "B4": [1.0, 1.0], "B8": [1.0, 1.0] } }
            ]
        },
        "elevation": [10.0, 12.0],
        "roads": { "type": "LineString", "coordinates": [[0, -500], [0, 500]] }
    }"#;

    #[fixture]
    fn provider() -> SceneProvider {
        SceneProvider::from_json(BUNDLE).expect("valid bundle")
    }

    fn aoi() -> AreaOfInterest {
        AreaOfInterest::from_bounds(0.0, 0.0, 60.0, 30.0).expect("valid area")
    }

    #[rstest]
    fn filters_scenes_and_bands(provider: SceneProvider) {
        let dates = DateRange::parse("2023-11-01", "2023-12-01").expect("valid dates");
        let query = CollectionQuery::new("optical", &aoi(), dates)
            .with_bands(["B4"])
            .with_max_cloud_cover(10.0);
        let collection = provider.load_image_collection(&query).expect("collection");
        assert_eq!(collection.len(), 1);
        let scene = collection.scenes.first().expect("scene");
        assert_eq!(scene.bands.keys().collect::<Vec<_>>(), ["B4"]);
        let red = scene.band("B4").expect("band");
        assert!(red.cells().get(1).is_some_and(|value| value.is_nan()));
    }

    #[rstest]
    fn unknown_dataset_fails(provider: SceneProvider) {
        let dates = DateRange::parse("2023-11-01", "2023-12-01").expect("valid dates");
        let query = CollectionQuery::new("radar", &aoi(), dates);
        let err = provider.load_image_collection(&query).unwrap_err();
        assert!(matches!(err, ProviderError::RequestFailed { .. }));
    }

    #[rstest]
    fn missing_layers_are_unsupported(provider: SceneProvider) {
        let elevation = provider.elevation("dem", &aoi()).expect("elevation");
        assert_eq!(elevation.cells(), &[10.0, 12.0]);
        assert_eq!(
            provider.surface_water_max_extent("water", &aoi()),
            Err(ProviderError::Unsupported {
                operation: "surface_water_max_extent"
            })
        );
        assert_eq!(provider.roads("roads", &aoi()).expect("roads").len(), 1);
        assert!(provider.protected_areas("wdpa", &aoi()).expect("areas").is_empty());
    }

    #[rstest]
    fn exports_ascii_grid(provider: SceneProvider) {
        let dir = TempDir::new().expect("tempdir");
        let folder = Utf8PathBuf::from_path_buf(dir.path().join("exports")).expect("utf-8 path");
        let layer = provider.elevation("dem", &aoi()).expect("elevation");
        let request = ExportRequest::new(&aoi()).with_folder(folder.as_str());
        let task = provider.export_raster(&layer, &request).expect("export");
        let expected = folder.join("land_suitability_score.asc");
        assert_eq!(task.destination, expected.as_str());
        let text = std::fs::read_to_string(&expected).expect("exported file");
        assert!(text.starts_with("ncols 2\nnrows 1\n"));
        assert!(text.ends_with("10 12\n"));
    }

    #[rstest]
    fn oversized_export_is_refused(provider: SceneProvider) {
        let layer = provider.elevation("dem", &aoi()).expect("elevation");
        let request = ExportRequest::new(&aoi()).with_max_pixels(1);
        let err = provider.export_raster(&layer, &request).unwrap_err();
        assert!(matches!(err, ProviderError::RequestFailed { .. }));
    }

    #[rstest]
    #[case(r#"{ "grid": { "origin": [0, 1], "cell_size": 1, "width": 1, "height": 1, "metres_per_unit": 0 } }"#)]
    #[case(r#"{ "grid": { "origin": [0, 1], "cell_size": 1, "width": 2, "height": 1 }, "elevation": [1] }"#)]
    #[case("not json")]
    fn rejects_malformed_bundles(#[case] text: &str) {
        assert!(SceneProvider::from_json(text).is_err());
    }

    #[rstest]
    fn session_connects_to_bundle_on_disk() {
        let dir = TempDir::new().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("scene.json")).expect("utf-8 path");
        std::fs::write(&path, BUNDLE).expect("write bundle");
        let session = ProviderSession::new(SceneConnector::new(path));
        let provider = session.provider().expect("provider");
        assert_eq!(provider.datasets().collect::<Vec<_>>(), ["optical"]);
        assert!(session.is_initialized());
    }

    #[rstest]
    fn missing_bundle_is_unavailable() {
        let session = ProviderSession::new(SceneConnector::new("/nonexistent/scene.json"));
        assert!(matches!(
            session.provider(),
            Err(ProviderError::Unavailable { .. })
        ));
        assert!(!session.is_initialized());
    }
}
