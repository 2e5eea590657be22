//! Requests and results exchanged with a geospatial provider.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use geo::{Polygon, Rect};

use super::{AreaOfInterest, DateRange};
use crate::Grid;

/// Dataset identifiers requested from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DatasetCatalog {
    /// Surface-reflectance optical collection with `B4`, `B8` and `B11`.
    pub optical: String,
    /// Radar backscatter collection with `VV` and `VH`.
    pub radar: String,
    /// Digital elevation model.
    pub elevation: String,
    /// Historical maximum surface-water extent.
    pub surface_water: String,
    /// Road network.
    pub roads: String,
    /// Protected-area polygons.
    pub protected_areas: String,
}

impl Default for DatasetCatalog {
    fn default() -> Self {
        Self {
            optical: "COPERNICUS/S2_SR".to_owned(),
            radar: "COPERNICUS/S1_GRD".to_owned(),
            elevation: "USGS/SRTMGL1_003".to_owned(),
            surface_water: "JRC/GSW1_3/MaxExtent".to_owned(),
            roads: "users/giswqs/public/osm_roads".to_owned(),
            protected_areas: "WCMC/WDPA/current/polygons".to_owned(),
        }
    }
}

/// Image collection request: dataset, footprint, window, bands and filters.
///
/// # Examples
/// ```
/// use sitescreen_core::{AreaOfInterest, CollectionQuery, DateRange};
///
/// let aoi = AreaOfInterest::from_bounds(103.6, 1.2, 103.8, 1.4)?;
/// let dates = DateRange::parse("2023-11-01", "2023-12-01")?;
/// let query = CollectionQuery::new("COPERNICUS/S2_SR", &aoi, dates)
///     .with_bands(["B4", "B8", "B11"])
///     .with_max_cloud_cover(10.0);
/// assert_eq!(query.bands.len(), 3);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionQuery {
    /// Dataset identifier.
    pub dataset: String,
    /// Footprint the scenes must cover.
    pub bounds: Rect<f64>,
    /// Acquisition window.
    pub dates: DateRange,
    /// Bands to return. Empty selects every band.
    pub bands: Vec<String>,
    /// Keep only scenes whose cloudy pixel percentage is strictly below
    /// this value.
    pub max_cloud_cover: Option<f64>,
}

impl CollectionQuery {
    /// Query every band of `dataset` over `aoi` within `dates`.
    #[must_use]
    pub fn new(dataset: impl Into<String>, aoi: &AreaOfInterest, dates: DateRange) -> Self {
        Self {
            dataset: dataset.into(),
            bounds: aoi.bounds(),
            dates,
            bands: Vec::new(),
            max_cloud_cover: None,
        }
    }

    /// Restrict the query to `bands`.
    #[must_use]
    pub fn with_bands<I, S>(mut self, bands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bands = bands.into_iter().map(Into::into).collect();
        self
    }

    /// Keep only scenes with cloud cover strictly below `percentage`.
    #[must_use]
    pub const fn with_max_cloud_cover(mut self, percentage: f64) -> Self {
        self.max_cloud_cover = Some(percentage);
        self
    }

    /// Report whether `scene` passes the date and cloud filters.
    ///
    /// A scene without cloud metadata fails an active cloud filter.
    #[must_use]
    pub fn accepts(&self, scene: &Scene) -> bool {
        let clear_enough = self.max_cloud_cover.is_none_or(|limit| {
            scene
                .cloudy_pixel_percentage
                .is_some_and(|cloudy| cloudy < limit)
        });
        self.dates.contains(scene.acquired) && clear_enough
    }
}

/// One acquisition: a set of co-registered bands.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Acquisition date.
    pub acquired: NaiveDate,
    /// Percentage of cloudy pixels, when the dataset records it.
    pub cloudy_pixel_percentage: Option<f64>,
    /// Band rasters keyed by band name.
    pub bands: BTreeMap<String, Grid<f64>>,
}

impl Scene {
    /// Return the raster for `band`.
    #[must_use]
    pub fn band(&self, band: &str) -> Option<&Grid<f64>> {
        self.bands.get(band)
    }
}

/// Scenes returned for a [`CollectionQuery`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageCollection {
    /// Dataset the scenes came from.
    pub dataset: String,
    /// Matching scenes in acquisition order.
    pub scenes: Vec<Scene>,
}

impl ImageCollection {
    /// Number of scenes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Report whether the collection holds no scenes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

/// Colour ramp used to render a score layer as map tiles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileStyle {
    /// Value mapped to the first palette colour.
    pub min: f64,
    /// Value mapped to the last palette colour.
    pub max: f64,
    /// Palette from low to high.
    pub palette: Vec<String>,
}

impl Default for TileStyle {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            palette: ["red", "yellow", "green"].map(str::to_owned).to_vec(),
        }
    }
}

/// Rendered tile layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TileLayer {
    /// Layer name shown by a map client.
    pub name: String,
    /// URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,
}

/// Batch export of a raster to provider-side storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    /// Task description.
    pub description: String,
    /// Destination folder.
    pub folder: String,
    /// File name prefix.
    pub file_prefix: String,
    /// Output resolution in metres.
    pub scale: f64,
    /// Output coordinate reference system.
    pub crs: String,
    /// Largest raster the export accepts.
    pub max_pixels: u64,
    /// Region to export; cells outside it are written as no-data.
    pub region: Polygon<f64>,
}

impl ExportRequest {
    /// Export `aoi` with the default description, destination and format.
    #[must_use]
    pub fn new(aoi: &AreaOfInterest) -> Self {
        Self {
            description: "Suitability_GeoTIFF".to_owned(),
            folder: "EarthEngineExports".to_owned(),
            file_prefix: "land_suitability_score".to_owned(),
            scale: 30.0,
            crs: "EPSG:4326".to_owned(),
            max_pixels: 1_000_000_000,
            region: aoi.polygon().clone(),
        }
    }

    /// Override the destination folder.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Override the file name prefix.
    #[must_use]
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Override the pixel limit.
    #[must_use]
    pub const fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }
}

/// Handle of a started export. The export runs independently of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExportTask {
    /// Provider task identifier.
    pub id: String,
    /// Description the task was started with.
    pub description: String,
    /// Where the output will appear.
    pub destination: String,
}
