//! In-memory provider and connector used by unit and behaviour tests.

use std::cell::Cell;
use std::collections::BTreeMap;

use geo::{LineString, Polygon};

use crate::{
    AreaOfInterest, CollectionQuery, ExportRequest, ExportTask, GeoProvider, Grid,
    ImageCollection, ProviderConnector, ProviderError, Scene, TileLayer, TileStyle,
};

/// `GeoProvider` serving preloaded layers regardless of the dataset id.
///
/// Image collections are keyed by dataset id; every other layer is shared.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    collections: BTreeMap<String, Vec<Scene>>,
    elevation: Option<Grid<f64>>,
    surface_water: Option<Grid<f64>>,
    roads: Vec<LineString<f64>>,
    protected_areas: Vec<Polygon<f64>>,
    exports: Cell<usize>,
}

impl MemoryProvider {
    /// Add a scene to the collection `dataset`.
    #[must_use]
    pub fn with_scene(mut self, dataset: &str, scene: Scene) -> Self {
        self.collections
            .entry(dataset.to_owned())
            .or_default()
            .push(scene);
        self
    }

    /// Serve `grid` as elevation.
    #[must_use]
    pub fn with_elevation(mut self, grid: Grid<f64>) -> Self {
        self.elevation = Some(grid);
        self
    }

    /// Serve `grid` as the surface-water mask.
    #[must_use]
    pub fn with_surface_water(mut self, grid: Grid<f64>) -> Self {
        self.surface_water = Some(grid);
        self
    }

    /// Serve `roads`.
    #[must_use]
    pub fn with_roads(mut self, roads: Vec<LineString<f64>>) -> Self {
        self.roads = roads;
        self
    }

    /// Serve `areas` as protected areas.
    #[must_use]
    pub fn with_protected_areas(mut self, areas: Vec<Polygon<f64>>) -> Self {
        self.protected_areas = areas;
        self
    }

    /// Number of exports started so far.
    #[must_use]
    pub fn exports_started(&self) -> usize {
        self.exports.get()
    }
}

impl GeoProvider for MemoryProvider {
    fn load_image_collection(
        &self,
        query: &CollectionQuery,
    ) -> Result<ImageCollection, ProviderError> {
        let scenes = self
            .collections
            .get(&query.dataset)
            .ok_or_else(|| ProviderError::RequestFailed {
                operation: "load_image_collection",
                message: format!("unknown dataset '{}'", query.dataset),
            })?
            .iter()
            .filter(|scene| query.accepts(scene))
            .map(|scene| {
                let mut selected = scene.clone();
                if !query.bands.is_empty() {
                    selected.bands.retain(|name, _| query.bands.contains(name));
                }
                selected
            })
            .collect();
        Ok(ImageCollection {
            dataset: query.dataset.clone(),
            scenes,
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

    fn render_tiles(&self, _layer: &Grid<f64>, style: &TileStyle) -> Result<TileLayer, ProviderError> {
        Ok(TileLayer {
            name: "Suitability Score".to_owned(),
            url_template: format!("memory://{}/{{z}}/{{x}}/{{y}}", style.palette.join("-")),
        })
    }

    fn export_raster(
        &self,
        _layer: &Grid<f64>,
        request: &ExportRequest,
    ) -> Result<ExportTask, ProviderError> {
        let next = self.exports.get() + 1;
        self.exports.set(next);
        Ok(ExportTask {
            id: format!("memory-export-{next}"),
            description: request.description.clone(),
            destination: format!("{}/{}", request.folder, request.file_prefix),
        })
    }
}

/// Connector handing out clones of a [`MemoryProvider`], optionally failing
/// the first few attempts.
#[derive(Debug)]
pub struct MemoryConnector {
    provider: MemoryProvider,
    failures: Cell<usize>,
    attempts: Cell<usize>,
}

impl MemoryConnector {
    /// Connector that always succeeds.
    #[must_use]
    pub const fn new(provider: MemoryProvider) -> Self {
        Self::failing(provider, 0)
    }

    /// Connector that fails the first `failures` attempts.
    #[must_use]
    pub const fn failing(provider: MemoryProvider, failures: usize) -> Self {
        Self {
            provider,
            failures: Cell::new(failures),
            attempts: Cell::new(0),
        }
    }

    /// Number of connection attempts made.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl ProviderConnector for MemoryConnector {
    type Provider = MemoryProvider;

    fn connect(&self) -> Result<Self::Provider, ProviderError> {
        self.attempts.set(self.attempts.get() + 1);
        let remaining = self.failures.get();
        if remaining > 0 {
            self.failures.set(remaining - 1);
            return Err(ProviderError::Unavailable {
                reason: "simulated outage".to_owned(),
            });
        }
        Ok(self.provider.clone())
    }
}
