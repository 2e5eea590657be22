//! Protected-area test for an area of interest.

use std::fmt;
use std::str::FromStr;

use geo::{BooleanOps, BoundingRect, Contains, Intersects, MultiPolygon, Polygon};
use log::debug;
use rstar::{AABB, RTree, RTreeObject};

/// How an area is judged to be protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionRule {
    /// Protected only when the protected areas fully contain it.
    #[default]
    Containment,
    /// Protected when it touches or overlaps any protected area.
    Overlap,
}

impl ProtectionRule {
    /// Lowercase name used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Containment => "containment",
            Self::Overlap => "overlap",
        }
    }
}

impl fmt::Display for ProtectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtectionRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "containment" | "contains" => Ok(Self::Containment),
            "overlap" | "intersects" => Ok(Self::Overlap),
            _ => Err(format!("unknown protection rule '{s}'")),
        }
    }
}

struct ProtectedEntry {
    envelope: AABB<[f64; 2]>,
    polygon: Polygon<f64>,
}

impl RTreeObject for ProtectedEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over protected-area polygons.
///
/// # Examples
/// ```
/// use geo::{Coord, Rect};
/// use sitescreen_analysis::{ProtectedAreaIndex, ProtectionRule};
///
/// let reserve = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 10.0 }).to_polygon();
/// let index = ProtectedAreaIndex::new(vec![reserve]);
/// let straddling = Rect::new(Coord { x: 8.0, y: 8.0 }, Coord { x: 12.0, y: 12.0 }).to_polygon();
/// assert!(index.is_unprotected(&straddling, ProtectionRule::Containment));
/// assert!(!index.is_unprotected(&straddling, ProtectionRule::Overlap));
/// ```
pub struct ProtectedAreaIndex {
    tree: RTree<ProtectedEntry>,
}

impl ProtectedAreaIndex {
    /// Index `areas`. Empty polygons are skipped.
    #[must_use]
    pub fn new(areas: Vec<Polygon<f64>>) -> Self {
        let entries: Vec<ProtectedEntry> = areas
            .into_iter()
            .filter_map(|polygon| {
                let rect = polygon.bounding_rect()?;
                Some(ProtectedEntry {
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                    polygon,
                })
            })
            .collect();
        debug!("indexed {} protected areas", entries.len());
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed areas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Report whether no protected area was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Report whether `aoi` is protected under `rule`.
    ///
    /// Containment is tested against the union of the candidate polygons,
    /// so an area spanning adjacent or overlapping reserves is protected.
    #[must_use]
    pub fn is_protected(&self, aoi: &Polygon<f64>, rule: ProtectionRule) -> bool {
        let Some(rect) = aoi.bounding_rect() else {
            return false;
        };
        let query = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        let mut candidates = self.tree.locate_in_envelope_intersecting(&query);
        match rule {
            ProtectionRule::Overlap => candidates.any(|entry| entry.polygon.intersects(aoi)),
            ProtectionRule::Containment => {
                let Some(first) = candidates.next() else {
                    return false;
                };
                let merged = candidates.fold(
                    MultiPolygon::new(vec![first.polygon.clone()]),
                    |merged, entry| merged.union(&entry.polygon),
                );
                merged.contains(aoi)
            }
        }
    }

    /// Negation of [`ProtectedAreaIndex::is_protected`].
    #[must_use]
    pub fn is_unprotected(&self, aoi: &Polygon<f64>, rule: ProtectionRule) -> bool {
        !self.is_protected(aoi, rule)
    }
}

impl fmt::Debug for ProtectedAreaIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectedAreaIndex")
            .field("areas", &self.len())
            .finish()
    }
}
