//! Distance from pixels to the road network.
#![expect(
    clippy::float_arithmetic,
    reason = "point-to-segment distances are floating-point"
)]

use geo::{BoundingRect, Coord, Line, LineString};
use log::debug;
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use sitescreen_core::Grid;

/// A single road segment stored in the R-tree.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RoadSegment {
    line: Line<f64>,
}

impl RTreeObject for RoadSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let rect = self.line.bounding_rect();
        AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
    }
}

impl PointDistance for RoadSegment {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let [px, py] = *point;
        let start = self.line.start;
        let delta = self.line.delta();
        let length_2 = delta.x * delta.x + delta.y * delta.y;
        let t = if length_2 > 0.0 {
            (((px - start.x) * delta.x + (py - start.y) * delta.y) / length_2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let dx = px - (start.x + t * delta.x);
        let dy = py - (start.y + t * delta.y);
        dx * dx + dy * dy
    }
}

/// Spatial index over road centrelines.
///
/// # Examples
/// ```
/// use geo::{Coord, line_string};
/// use sitescreen_analysis::RoadIndex;
///
/// let index = RoadIndex::new(&[line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)]]);
/// let distance = index.distance_to_nearest(Coord { x: 50.0, y: 30.0 }, 1000.0);
/// assert_eq!(distance, Some(30.0));
/// ```
#[derive(Debug, Clone)]
pub struct RoadIndex {
    tree: RTree<RoadSegment>,
}

impl RoadIndex {
    /// Index every segment of `roads`.
    #[must_use]
    pub fn new(roads: &[LineString<f64>]) -> Self {
        let segments: Vec<RoadSegment> = roads
            .iter()
            .flat_map(LineString::lines)
            .map(|line| RoadSegment { line })
            .collect();
        debug!("indexed {} road segments", segments.len());
        Self {
            tree: RTree::bulk_load(segments),
        }
    }

    /// Number of indexed segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Report whether no road was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Distance to the nearest road within `search_radius` of `point`.
    #[must_use]
    pub fn distance_to_nearest(&self, point: Coord<f64>, search_radius: f64) -> Option<f64> {
        let query = [point.x, point.y];
        self.tree
            .locate_within_distance(query, search_radius * search_radius)
            .map(|segment| segment.distance_2(&query))
            .min_by(f64::total_cmp)
            .map(f64::sqrt)
    }

    /// Near-road layer on the grid of `template`.
    ///
    /// A cell is `1.0` when its centre lies strictly closer than `threshold`
    /// to a road found within `search_radius`, and `0.0` otherwise. Masked
    /// template cells stay masked.
    #[must_use]
    pub fn near_road_layer(
        &self,
        template: &Grid<f64>,
        threshold: f64,
        search_radius: f64,
    ) -> Grid<f64> {
        let transform = *template.transform();
        let mut layer = template.map(|_| 0.0);
        for ((col, row, source), cell) in template.iter_cells().zip(layer.cells_mut()) {
            *cell = if source.is_nan() {
                f64::NAN
            } else {
                let centre = transform.cell_center(col, row);
                let near = self
                    .distance_to_nearest(centre, search_radius)
                    .is_some_and(|distance| distance < threshold);
                if near { 1.0 } else { 0.0 }
            };
        }
        layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;
    use rstest::{fixture, rstest};
    use sitescreen_core::GridTransform;

    #[fixture]
    fn index() -> RoadIndex {
        RoadIndex::new(&[line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 3000.0)]])
    }

    #[rstest]
    #[case(Coord { x: 999.0, y: 1500.0 }, Some(999.0))]
    #[case(Coord { x: 1000.0, y: 1500.0 }, Some(1000.0))]
    #[case(Coord { x: 1000.5, y: 1500.0 }, None)]
    #[case(Coord { x: -30.0, y: -40.0 }, Some(50.0))]
    fn measures_to_nearest_segment(
        index: RoadIndex,
        #[case] point: Coord<f64>,
        #[case] expected: Option<f64>,
    ) {
        assert_eq!(index.distance_to_nearest(point, 1000.0), expected);
    }

    #[rstest]
    fn threshold_is_strict(index: RoadIndex) {
        // Cell centres at x = 500, 1000 and 1500.
        let transform = GridTransform::new(Coord { x: 250.0, y: 1750.0 }, 500.0);
        let template = Grid::filled(3, 1, transform, 0.5).expect("valid grid");
        let layer = index.near_road_layer(&template, 1000.0, 1000.0);
        assert_eq!(layer.cells(), &[1.0, 0.0, 0.0]);
    }

    #[rstest]
    fn empty_network_is_never_near() {
        let index = RoadIndex::new(&[]);
        assert!(index.is_empty());
        let transform = GridTransform::new(Coord { x: 0.0, y: 10.0 }, 10.0);
        let template = Grid::filled(2, 1, transform, 1.0).expect("valid grid");
        assert_eq!(index.near_road_layer(&template, 1000.0, 1000.0).cells(), &[0.0, 0.0]);
    }

    #[rstest]
    fn masked_template_cells_stay_masked(index: RoadIndex) {
        let transform = GridTransform::new(Coord { x: 0.0, y: 10.0 }, 10.0);
        let template = Grid::from_vec(2, 1, transform, vec![f64::NAN, 1.0]).expect("valid grid");
        let layer = index.near_road_layer(&template, 1000.0, 1000.0);
        assert!(layer.cells().first().is_some_and(|value| value.is_nan()));
        assert_eq!(layer.cells().get(1), Some(&1.0));
    }
}
