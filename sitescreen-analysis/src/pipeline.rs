//! End-to-end suitability analysis of one area of interest.
#![expect(
    clippy::float_arithmetic,
    reason = "the summary scale is converted from metres to map units"
)]

use log::{info, warn};
use sitescreen_core::{
    AccessGate, AreaOfInterest, CollectionQuery, CredentialVerifier, DatasetCatalog, DateRange,
    ExportRequest, ExportTask, GeoProvider, Grid, IndicatorSet, Score, SuitabilityModel, Summary,
    TileLayer, TileStyle, summarize,
};

use crate::{
    AnalysisError, ClassificationInputs, Classifier, OPTICAL_BANDS, ProtectedAreaIndex,
    RADAR_BANDS, RoadIndex, mean_composite, median_composite,
};

/// Summary label of the bare-and-dry layer mean.
pub const SOIL_SCORE_LABEL: &str = "Soil Score (Bare & Dry)";

/// Summary label of the flatness layer mean.
pub const FLATNESS_SCORE_LABEL: &str = "Flatness Score";

/// What to analyse and which side effects to trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Area to analyse. A request without one is refused.
    pub aoi: Option<AreaOfInterest>,
    /// Acquisition window for the satellite collections.
    pub dates: DateRange,
    /// Whether to render the score layer as map tiles.
    pub render_tiles: bool,
    /// Export to start once the score layer is ready.
    pub export: Option<ExportRequest>,
}

impl AnalysisRequest {
    /// Request for `aoi` over `dates` without tiles or export.
    #[must_use]
    pub const fn new(aoi: Option<AreaOfInterest>, dates: DateRange) -> Self {
        Self {
            aoi,
            dates,
            render_tiles: false,
            export: None,
        }
    }

    /// Also render the score layer as tiles.
    #[must_use]
    pub const fn with_tiles(mut self) -> Self {
        self.render_tiles = true;
        self
    }

    /// Also start `export`.
    #[must_use]
    pub fn with_export(mut self, export: ExportRequest) -> Self {
        self.export = Some(export);
        self
    }
}

/// Result of a completed analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Area-level indicator fractions.
    pub indicators: IndicatorSet,
    /// Score of [`AnalysisReport::indicators`].
    pub score: Score,
    /// Per-pixel score.
    pub score_layer: Grid<f64>,
    /// Area means of the soil and flatness layers.
    pub summary: Summary,
    /// Rendered tiles, when requested.
    pub tiles: Option<TileLayer>,
    /// Started export, when requested.
    pub export: Option<ExportTask>,
}

/// Suitability analysis backed by a [`GeoProvider`].
///
/// Every provider failure aborts the run; nothing partial is returned.
#[derive(Debug, Clone)]
pub struct SuitabilityAnalysis<P> {
    provider: P,
    catalog: DatasetCatalog,
    classifier: Classifier,
    model: SuitabilityModel,
    metres_per_unit: f64,
}

impl<P: GeoProvider> SuitabilityAnalysis<P> {
    /// Analysis with the default datasets, thresholds and weights on a
    /// metre-based grid.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            catalog: DatasetCatalog::default(),
            classifier: Classifier::default(),
            model: SuitabilityModel::default(),
            metres_per_unit: 1.0,
        }
    }

    /// Use `catalog` for dataset ids.
    #[must_use]
    pub fn with_catalog(mut self, catalog: DatasetCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Use `classifier` for the indicator rules.
    #[must_use]
    pub const fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Use `model` for scoring.
    #[must_use]
    pub const fn with_model(mut self, model: SuitabilityModel) -> Self {
        self.model = model;
        self
    }

    /// Ground metres per map unit of the provider's grids.
    #[must_use]
    pub const fn with_metres_per_unit(mut self, metres_per_unit: f64) -> Self {
        self.metres_per_unit = metres_per_unit;
        self
    }

    /// The provider in use.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Run `request` once the gate confirms a login.
    ///
    /// # Errors
    /// Returns [`AnalysisError::Access`] before any provider call when
    /// nobody is logged in, otherwise as [`SuitabilityAnalysis::run`].
    pub fn run_authorised<V: CredentialVerifier>(
        &self,
        gate: &AccessGate<V>,
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport, AnalysisError> {
        gate.require_login()?;
        self.run(request)
    }

    /// Classify, score and summarise the requested area.
    ///
    /// # Errors
    /// Returns [`AnalysisError::NoAreaSelected`] without contacting the
    /// provider when the request has no area, [`AnalysisError::Provider`]
    /// when a provider call fails and [`AnalysisError::Classify`] when the
    /// data cannot be classified.
    pub fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        let Some(aoi) = request.aoi.as_ref() else {
            warn!("analysis requested without an area of interest");
            return Err(AnalysisError::NoAreaSelected);
        };
        let bounds = aoi.bounds();
        info!(
            "analysing ({}, {})..({}, {}) for {}",
            bounds.min().x,
            bounds.min().y,
            bounds.max().x,
            bounds.max().y,
            request.dates
        );
        let thresholds = self.classifier.thresholds();

        let optical_query = CollectionQuery::new(self.catalog.optical.as_str(), aoi, request.dates)
            .with_bands(OPTICAL_BANDS)
            .with_max_cloud_cover(thresholds.max_cloud_cover);
        let radar_query = CollectionQuery::new(self.catalog.radar.as_str(), aoi, request.dates)
            .with_bands(RADAR_BANDS);
        let optical = self.provider.load_image_collection(&optical_query)?;
        let radar = self.provider.load_image_collection(&radar_query)?;
        info!(
            "loaded {} optical and {} radar scenes",
            optical.len(),
            radar.len()
        );
        let optical_composite = median_composite(&optical, &OPTICAL_BANDS)?;
        let radar_composite = mean_composite(&radar, &RADAR_BANDS)?;

        let elevation = self.provider.elevation(&self.catalog.elevation, aoi)?;
        let surface_water = self
            .provider
            .surface_water_max_extent(&self.catalog.surface_water, aoi)?;
        let roads = RoadIndex::new(&self.provider.roads(&self.catalog.roads, aoi)?);
        let protected_areas = ProtectedAreaIndex::new(
            self.provider
                .protected_areas(&self.catalog.protected_areas, aoi)?,
        );

        let inputs = ClassificationInputs {
            optical: &optical_composite,
            radar: &radar_composite,
            elevation: &elevation,
            surface_water: &surface_water,
            roads: &roads,
            protected_areas: &protected_areas,
            metres_per_unit: self.metres_per_unit,
        };
        let layers = self.classifier.classify_layers(aoi, &inputs)?;
        let indicators = self
            .classifier
            .fractions(aoi, &layers, self.metres_per_unit)?;
        let score = self.model.score(&indicators);
        let score_layer = self.model.score_layers(&layers)?;
        let summary = summarize(
            [
                (SOIL_SCORE_LABEL, &layers.bare_and_dry),
                (FLATNESS_SCORE_LABEL, &layers.flat),
            ],
            aoi.polygon(),
            thresholds.summary_scale / self.metres_per_unit,
        )?;
        info!("suitability score {score}");

        let tiles = request
            .render_tiles
            .then(|| self.provider.render_tiles(&score_layer, &TileStyle::default()))
            .transpose()?;
        let export = request
            .export
            .as_ref()
            .map(|export| self.provider.export_raster(&score_layer, export))
            .transpose()?;
        if let Some(task) = &export {
            info!("started export {} to {}", task.id, task.destination);
        }

        Ok(AnalysisReport {
            indicators,
            score,
            score_layer,
            summary,
            tiles,
            export,
        })
    }
}
