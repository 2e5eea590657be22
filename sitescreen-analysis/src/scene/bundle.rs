//! On-disk JSON layout of a scene bundle.
//!
//! ```json
//! {
//!   "grid": { "origin": [0.0, 30.0], "cell_size": 30.0, "width": 2, "height": 1 },
//!   "collections": {
//!     "COPERNICUS/S2_SR": [
//!       { "acquired": "2023-11-05", "cloudy_pixel_percentage": 4.0,
//!         "bands": { "B4": [1200.0, null] } }
//!     ]
//!   },
//!   "elevation": [10.0, 10.0],
//!   "surface_water": [0.0, 1.0],
//!   "roads": { "type": "FeatureCollection", "features": [] },
//!   "protected_areas": { "type": "FeatureCollection", "features": [] }
//! }
//! ```
//!
//! Cells are row-major from the north-west corner; `null` marks a masked
//! cell.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use geo::{Coord, LineString, Polygon};
use geojson::GeoJson;
use log::warn;
use serde::Deserialize;
use sitescreen_core::{Grid, GridTransform, Scene};

use super::SceneError;

#[derive(Debug, Deserialize)]
pub(super) struct SceneBundle {
    pub(super) grid: BundleGrid,
    #[serde(default)]
    pub(super) collections: BTreeMap<String, Vec<BundleScene>>,
    #[serde(default)]
    pub(super) elevation: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub(super) surface_water: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub(super) roads: Option<GeoJson>,
    #[serde(default)]
    pub(super) protected_areas: Option<GeoJson>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BundleGrid {
    origin: [f64; 2],
    cell_size: f64,
    width: usize,
    height: usize,
    #[serde(default = "default_metres_per_unit")]
    pub(super) metres_per_unit: f64,
}

const fn default_metres_per_unit() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
pub(super) struct BundleScene {
    acquired: NaiveDate,
    #[serde(default)]
    cloudy_pixel_percentage: Option<f64>,
    bands: BTreeMap<String, Vec<Option<f64>>>,
}

impl BundleGrid {
    pub(super) fn layer(
        &self,
        layer: &str,
        cells: Vec<Option<f64>>,
    ) -> Result<Grid<f64>, SceneError> {
        let [x, y] = self.origin;
        let transform = GridTransform::new(Coord { x, y }, self.cell_size);
        let values = cells
            .into_iter()
            .map(|cell| cell.unwrap_or(f64::NAN))
            .collect();
        Grid::from_vec(self.width, self.height, transform, values).map_err(|source| {
            SceneError::Layer {
                layer: layer.to_owned(),
                source,
            }
        })
    }

    pub(super) fn scene(&self, dataset: &str, scene: BundleScene) -> Result<Scene, SceneError> {
        let mut bands = BTreeMap::new();
        for (name, cells) in scene.bands {
            let label = format!("{dataset}/{}/{name}", scene.acquired);
            let grid = self.layer(&label, cells)?;
            bands.insert(name, grid);
        }
        Ok(Scene {
            acquired: scene.acquired,
            cloudy_pixel_percentage: scene.cloudy_pixel_percentage,
            bands,
        })
    }
}

/// Road centrelines in `geojson`. Other geometry kinds are skipped.
pub(super) fn lines(geojson: Option<GeoJson>) -> Result<Vec<LineString<f64>>, SceneError> {
    let mut roads = Vec::new();
    for geometry in geometries("roads", geojson)? {
        match geometry {
            geo::Geometry::LineString(line) => roads.push(line),
            geo::Geometry::MultiLineString(multi) => roads.extend(multi.0),
            other => warn!("skipping non-linear road geometry {other:?}"),
        }
    }
    Ok(roads)
}

/// Polygons in `geojson`. Other geometry kinds are skipped.
pub(super) fn polygons(geojson: Option<GeoJson>) -> Result<Vec<Polygon<f64>>, SceneError> {
    let mut areas = Vec::new();
    for geometry in geometries("protected_areas", geojson)? {
        match geometry {
            geo::Geometry::Polygon(polygon) => areas.push(polygon),
            geo::Geometry::MultiPolygon(multi) => areas.extend(multi.0),
            other => warn!("skipping non-areal protected geometry {other:?}"),
        }
    }
    Ok(areas)
}

fn geometries(
    layer: &'static str,
    geojson: Option<GeoJson>,
) -> Result<Vec<geo::Geometry<f64>>, SceneError> {
    let raw: Vec<geojson::Geometry> = match geojson {
        None => Vec::new(),
        Some(GeoJson::Geometry(geometry)) => vec![geometry],
        Some(GeoJson::Feature(feature)) => feature.geometry.into_iter().collect(),
        Some(GeoJson::FeatureCollection(collection)) => collection
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .collect(),
    };
    let mut flat = Vec::with_capacity(raw.len());
    for geometry in raw {
        let converted = geo::Geometry::<f64>::try_from(geometry).map_err(|source| {
            SceneError::Geometry {
                layer,
                source: Box::new(source),
            }
        })?;
        flatten(converted, &mut flat);
    }
    Ok(flat)
}

fn flatten(geometry: geo::Geometry<f64>, out: &mut Vec<geo::Geometry<f64>>) {
    if let geo::Geometry::GeometryCollection(collection) = geometry {
        for member in collection.0 {
            flatten(member, out);
        }
    } else {
        out.push(geometry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn grid() -> BundleGrid {
        BundleGrid {
            origin: [0.0, 20.0],
            cell_size: 10.0,
            width: 2,
            height: 2,
            metres_per_unit: 1.0,
        }
    }

    #[rstest]
    fn null_cells_become_masked() {
        let layer = grid()
            .layer("elevation", vec![Some(1.0), None, Some(3.0), Some(4.0)])
            .expect("layer");
        assert!(layer.get(1, 0).is_some_and(|value| value.is_nan()));
        assert_eq!(layer.get(0, 1), Some(&3.0));
    }

    #[rstest]
    fn wrong_cell_count_names_the_layer() {
        let err = grid().layer("surface_water", vec![Some(0.0)]).unwrap_err();
        assert!(matches!(err, SceneError::Layer { ref layer, .. } if layer == "surface_water"));
    }

    #[rstest]
    fn multi_geometries_are_flattened() {
        let geojson: GeoJson = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": {}, "geometry": {
                    "type": "MultiLineString",
                    "coordinates": [[[0, 0], [1, 0]], [[0, 1], [1, 1]]] } },
                { "type": "Feature", "properties": {}, "geometry": {
                    "type": "Point", "coordinates": [5, 5] } },
                { "type": "Feature", "properties": {}, "geometry": null }
            ]
        }"#
        .parse()
        .expect("valid GeoJSON");
        assert_eq!(lines(Some(geojson)).expect("roads").len(), 2);
    }

    #[rstest]
    fn polygons_accept_a_bare_geometry() {
        let geojson: GeoJson =
            r#"{ "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]] }"#
                .parse()
                .expect("valid GeoJSON");
        assert_eq!(polygons(Some(geojson)).expect("areas").len(), 1);
        assert!(polygons(None).expect("areas").is_empty());
    }
}
