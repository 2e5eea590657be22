//! Seam to the remote geospatial compute provider.
//!
//! Satellite retrieval, compositing at source, tile rendering and batch
//! export all happen behind [`GeoProvider`]. The analysis code only sees
//! rasters on a shared grid and vector features.

mod area;
mod error;
mod types;

use geo::{LineString, Polygon};

use crate::Grid;

pub use area::{AreaError, AreaOfInterest, DateRange, DateRangeError};
pub use error::ProviderError;
pub use types::{
    CollectionQuery, DatasetCatalog, ExportRequest, ExportTask, ImageCollection, Scene, TileLayer,
    TileStyle,
};

/// Geospatial data and compute provider.
///
/// Every raster returned for one area must share a single grid so that
/// layers can be combined cell by cell.
///
/// # Examples
///
/// ```rust
/// use geo::{LineString, Polygon};
/// use sitescreen_core::{
///     AreaOfInterest, CollectionQuery, ExportRequest, ExportTask, GeoProvider, Grid,
///     ImageCollection, ProviderError, TileLayer, TileStyle,
/// };
///
/// struct Offline;
///
/// impl GeoProvider for Offline {
///     fn load_image_collection(
///         &self,
///         _query: &CollectionQuery,
///     ) -> Result<ImageCollection, ProviderError> {
///         Err(ProviderError::Unavailable { reason: "offline".into() })
///     }
///     fn elevation(&self, _: &str, _: &AreaOfInterest) -> Result<Grid<f64>, ProviderError> {
///         Err(ProviderError::Unavailable { reason: "offline".into() })
///     }
///     fn surface_water_max_extent(
///         &self,
///         _: &str,
///         _: &AreaOfInterest,
///     ) -> Result<Grid<f64>, ProviderError> {
///         Err(ProviderError::Unavailable { reason: "offline".into() })
///     }
///     fn roads(&self, _: &str, _: &AreaOfInterest) -> Result<Vec<LineString<f64>>, ProviderError> {
///         Ok(Vec::new())
///     }
///     fn protected_areas(
///         &self,
///         _: &str,
///         _: &AreaOfInterest,
///     ) -> Result<Vec<Polygon<f64>>, ProviderError> {
///         Ok(Vec::new())
///     }
///     fn render_tiles(&self, _: &Grid<f64>, _: &TileStyle) -> Result<TileLayer, ProviderError> {
///         Err(ProviderError::Unsupported { operation: "render_tiles" })
///     }
///     fn export_raster(
///         &self,
///         _: &Grid<f64>,
///         _: &ExportRequest,
///     ) -> Result<ExportTask, ProviderError> {
///         Err(ProviderError::Unsupported { operation: "export_raster" })
///     }
/// }
///
/// let aoi = AreaOfInterest::from_bounds(103.6, 1.2, 103.8, 1.4)?;
/// assert!(Offline.roads("roads", &aoi)?.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait GeoProvider {
    /// Load the scenes of a collection matching `query`.
    ///
    /// Implementations apply the date window and cloud filter and return
    /// only the requested bands.
    fn load_image_collection(&self, query: &CollectionQuery)
    -> Result<ImageCollection, ProviderError>;

    /// Elevation in metres over `aoi`.
    fn elevation(&self, dataset: &str, aoi: &AreaOfInterest) -> Result<Grid<f64>, ProviderError>;

    /// Historical maximum water extent over `aoi`: `1.0` where water has
    /// ever been observed, `0.0` elsewhere.
    fn surface_water_max_extent(
        &self,
        dataset: &str,
        aoi: &AreaOfInterest,
    ) -> Result<Grid<f64>, ProviderError>;

    /// Road centrelines intersecting the neighbourhood of `aoi`.
    fn roads(
        &self,
        dataset: &str,
        aoi: &AreaOfInterest,
    ) -> Result<Vec<LineString<f64>>, ProviderError>;

    /// Protected-area polygons intersecting `aoi`.
    fn protected_areas(
        &self,
        dataset: &str,
        aoi: &AreaOfInterest,
    ) -> Result<Vec<Polygon<f64>>, ProviderError>;

    /// Render `layer` as a tiled map layer.
    fn render_tiles(&self, layer: &Grid<f64>, style: &TileStyle)
    -> Result<TileLayer, ProviderError>;

    /// Start a batch export of `layer` and return without waiting for it.
    fn export_raster(
        &self,
        layer: &Grid<f64>,
        request: &ExportRequest,
    ) -> Result<ExportTask, ProviderError>;
}

impl<P: GeoProvider + ?Sized> GeoProvider for &P {
    fn load_image_collection(
        &self,
        query: &CollectionQuery,
    ) -> Result<ImageCollection, ProviderError> {
        (**self).load_image_collection(query)
    }

    fn elevation(&self, dataset: &str, aoi: &AreaOfInterest) -> Result<Grid<f64>, ProviderError> {
        (**self).elevation(dataset, aoi)
    }

    fn surface_water_max_extent(
        &self,
        dataset: &str,
        aoi: &AreaOfInterest,
    ) -> Result<Grid<f64>, ProviderError> {
        (**self).surface_water_max_extent(dataset, aoi)
    }

    fn roads(
        &self,
        dataset: &str,
        aoi: &AreaOfInterest,
    ) -> Result<Vec<LineString<f64>>, ProviderError> {
        (**self).roads(dataset, aoi)
    }

    fn protected_areas(
        &self,
        dataset: &str,
        aoi: &AreaOfInterest,
    ) -> Result<Vec<Polygon<f64>>, ProviderError> {
        (**self).protected_areas(dataset, aoi)
    }

    fn render_tiles(&self, layer: &Grid<f64>, style: &TileStyle) -> Result<TileLayer, ProviderError> {
        (**self).render_tiles(layer, style)
    }

    fn export_raster(
        &self,
        layer: &Grid<f64>,
        request: &ExportRequest,
    ) -> Result<ExportTask, ProviderError> {
        (**self).export_raster(layer, request)
    }
}
