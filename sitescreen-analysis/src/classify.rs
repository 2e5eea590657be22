//! Threshold rules turning measurements into indicator layers.
//!
//! | Indicator | Rule |
//! |---|---|
//! | bare and dry | `NDVI(B8, B4) < 0.2` and `B11 > 1000` and `VV < -15` and `VH < -20` |
//! | flat | slope `< 5` degrees |
//! | flood free | outside the maximum water extent |
//! | near road | nearest road `< 1000` m |
//! | unprotected | area not inside a protected area |
#![expect(
    clippy::float_arithmetic,
    reason = "ground distances are converted between metres and map units"
)]

use log::{debug, info};
use serde::{Deserialize, Serialize};
use sitescreen_core::{AreaOfInterest, Grid, Indicator, IndicatorLayers, IndicatorSet, summarize};

use crate::{ClassifyError, Composite, ProtectedAreaIndex, ProtectionRule, RoadIndex, slope_degrees};

/// Optical bands read by the bare-soil rule.
pub const OPTICAL_BANDS: [&str; 3] = ["B4", "B8", "B11"];

/// Radar polarisations read by the dryness rule.
pub const RADAR_BANDS: [&str; 2] = ["VV", "VH"];

/// Thresholds and parameters of the classification rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    /// Vegetation index below which soil counts as bare.
    pub ndvi_max: f64,
    /// Short-wave infrared reflectance above which soil counts as bare.
    pub swir_min: f64,
    /// VV backscatter in dB below which soil counts as dry.
    pub vv_max_db: f64,
    /// VH backscatter in dB below which soil counts as dry.
    pub vh_max_db: f64,
    /// Slope in degrees below which terrain counts as flat.
    pub slope_max_degrees: f64,
    /// Road distance in metres below which a pixel counts as near a road.
    pub road_distance_max: f64,
    /// Radius in metres searched for roads. Pixels with no road inside it
    /// are not near a road.
    pub road_search_radius: f64,
    /// Optical scenes must have strictly less cloud cover than this
    /// percentage.
    pub max_cloud_cover: f64,
    /// Sampling resolution in metres used for area fractions.
    pub summary_scale: f64,
    /// How protected areas disqualify a site.
    pub protection_rule: ProtectionRule,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            ndvi_max: 0.2,
            swir_min: 1000.0,
            vv_max_db: -15.0,
            vh_max_db: -20.0,
            slope_max_degrees: 5.0,
            road_distance_max: 1000.0,
            road_search_radius: 1000.0,
            max_cloud_cover: 10.0,
            summary_scale: 30.0,
            protection_rule: ProtectionRule::Containment,
        }
    }
}

/// Data the rules are evaluated on.
///
/// Every raster must share the optical composite's grid.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationInputs<'a> {
    /// Median optical composite with [`OPTICAL_BANDS`].
    pub optical: &'a Composite,
    /// Mean radar composite with [`RADAR_BANDS`].
    pub radar: &'a Composite,
    /// Elevation in metres.
    pub elevation: &'a Grid<f64>,
    /// Maximum water extent, `1.0` for water.
    pub surface_water: &'a Grid<f64>,
    /// Road network.
    pub roads: &'a RoadIndex,
    /// Protected areas.
    pub protected_areas: &'a ProtectedAreaIndex,
    /// Ground metres per map unit of the grid.
    pub metres_per_unit: f64,
}

/// Evaluates the classification rules.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Classifier {
    thresholds: ClassificationThresholds,
}

impl Classifier {
    /// Build a classifier with custom thresholds.
    #[must_use]
    pub const fn new(thresholds: ClassificationThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use.
    #[must_use]
    pub const fn thresholds(&self) -> &ClassificationThresholds {
        &self.thresholds
    }

    /// Per-pixel indicator layers for `aoi`.
    ///
    /// # Errors
    /// Returns [`ClassifyError::MissingBand`] when a composite lacks a band,
    /// [`ClassifyError::Raster`] when layers are not co-registered and
    /// [`ClassifyError::InvalidGroundScale`] for a bad ground scale.
    pub fn classify_layers(
        &self,
        aoi: &AreaOfInterest,
        inputs: &ClassificationInputs<'_>,
    ) -> Result<IndicatorLayers, ClassifyError> {
        let t = &self.thresholds;
        let metres_per_unit = ground_scale(inputs.metres_per_unit)?;

        let red = inputs.optical.band("B4")?;
        let nir = inputs.optical.band("B8")?;
        let swir = inputs.optical.band("B11")?;
        let vv = inputs.radar.band("VV")?;
        let vh = inputs.radar.band("VH")?;

        let bare = nir.normalized_difference(red)?.lt(t.ndvi_max).and(&swir.gt(t.swir_min))?;
        let bare_and_dry = bare
            .and(&vv.lt(t.vv_max_db))?
            .and(&vh.lt(t.vh_max_db))?;

        let spacing = inputs.elevation.transform().cell_size * metres_per_unit;
        let flat = slope_degrees(inputs.elevation, spacing)?.lt(t.slope_max_degrees);
        red.ensure_aligned(&flat)?;

        red.ensure_aligned(inputs.surface_water)?;
        let flood_free = inputs.surface_water.not();

        let near_road = inputs.roads.near_road_layer(
            &red.map(|_| 0.0),
            t.road_distance_max / metres_per_unit,
            t.road_search_radius / metres_per_unit,
        );

        let unprotected = if inputs
            .protected_areas
            .is_unprotected(aoi.polygon(), t.protection_rule)
        {
            1.0
        } else {
            0.0
        };
        debug!(
            "classified {}x{} pixels, unprotected = {unprotected}",
            red.width(),
            red.height()
        );

        Ok(IndicatorLayers {
            bare_and_dry,
            flat,
            flood_free,
            near_road,
            unprotected,
        })
    }

    /// Indicator fractions for `aoi`.
    ///
    /// Each pixel indicator becomes the share of the area satisfying it; the
    /// unprotected indicator is `0.0` or `1.0`.
    ///
    /// # Errors
    /// As [`Classifier::classify_layers`], plus [`ClassifyError::EmptyArea`]
    /// when no valid pixel falls inside the area.
    pub fn classify(
        &self,
        aoi: &AreaOfInterest,
        inputs: &ClassificationInputs<'_>,
    ) -> Result<IndicatorSet, ClassifyError> {
        let layers = self.classify_layers(aoi, inputs)?;
        self.fractions(aoi, &layers, inputs.metres_per_unit)
    }

    /// Reduce indicator layers to their area fractions over `aoi`.
    ///
    /// # Errors
    /// Returns [`ClassifyError::EmptyArea`] when a layer has no valid pixel
    /// inside the area.
    pub fn fractions(
        &self,
        aoi: &AreaOfInterest,
        layers: &IndicatorLayers,
        metres_per_unit: f64,
    ) -> Result<IndicatorSet, ClassifyError> {
        let scale = self.thresholds.summary_scale / ground_scale(metres_per_unit)?;
        let pixel_layers = Indicator::ALL
            .into_iter()
            .filter_map(|indicator| layers.layer(indicator).map(|grid| (indicator.as_str(), grid)));
        let summary = summarize(pixel_layers, aoi.polygon(), scale)?;
        let fraction = |indicator: Indicator| {
            summary
                .get(indicator.as_str())
                .flatten()
                .ok_or(ClassifyError::EmptyArea)
        };
        let indicators = IndicatorSet::new(
            fraction(Indicator::BareAndDry)?,
            fraction(Indicator::Flat)?,
            fraction(Indicator::FloodFree)?,
            fraction(Indicator::NearRoad)?,
            layers.unprotected,
        )?;
        info!("area indicators: {indicators:?}");
        Ok(indicators)
    }
}

/// Indicator fractions for `aoi` with the default thresholds.
///
/// # Errors
/// See [`Classifier::classify`].
pub fn classify(
    aoi: &AreaOfInterest,
    inputs: &ClassificationInputs<'_>,
) -> Result<IndicatorSet, ClassifyError> {
    Classifier::default().classify(aoi, inputs)
}

fn ground_scale(value: f64) -> Result<f64, ClassifyError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ClassifyError::InvalidGroundScale { value })
    }
}
