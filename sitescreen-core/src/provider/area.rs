//! Area of interest and acquisition window for a provider request.

use std::fmt;

use chrono::NaiveDate;
use geo::{Area, BoundingRect, Coord, Polygon, Rect};
use geojson::GeoJson;
use thiserror::Error;

/// Errors raised when building an [`AreaOfInterest`].
#[derive(Debug, Error)]
pub enum AreaError {
    /// The bounding box had non-finite or inverted corners.
    #[error("invalid bounding box [{min_x}, {min_y}, {max_x}, {max_y}]")]
    InvalidBounds {
        /// Minimum longitude.
        min_x: f64,
        /// Minimum latitude.
        min_y: f64,
        /// Maximum longitude.
        max_x: f64,
        /// Maximum latitude.
        max_y: f64,
    },
    /// The polygon encloses no area.
    #[error("area of interest must enclose a non-zero area")]
    Degenerate,
    /// The polygon contained a non-finite coordinate.
    #[error("area of interest contains a non-finite coordinate")]
    NonFinite,
    /// The GeoJSON text could not be parsed.
    #[error("invalid GeoJSON: {source}")]
    GeoJson {
        /// Underlying parse error.
        #[source]
        source: Box<geojson::Error>,
    },
    /// The GeoJSON held something other than a single polygon.
    #[error("GeoJSON area must be a single polygon, got {kind}")]
    UnsupportedGeometry {
        /// Kind of geometry found.
        kind: String,
    },
}

impl From<geojson::Error> for AreaError {
    fn from(source: geojson::Error) -> Self {
        Self::GeoJson {
            source: Box::new(source),
        }
    }
}

/// Polygon delimiting the land parcel under analysis, in WGS84 degrees.
///
/// # Examples
/// ```
/// use sitescreen_core::AreaOfInterest;
///
/// let aoi = AreaOfInterest::from_bounds(103.6, 1.2, 103.8, 1.4)?;
/// assert_eq!(aoi.bounds().min().x, 103.6);
/// assert!(AreaOfInterest::from_bounds(1.0, 1.0, 1.0, 2.0).is_err());
/// # Ok::<(), sitescreen_core::AreaError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOfInterest {
    polygon: Polygon<f64>,
    bounds: Rect<f64>,
}

impl AreaOfInterest {
    /// Bounding box offered when no area has been drawn:
    /// `[min_lon, min_lat, max_lon, max_lat]`.
    pub const DEFAULT_BOUNDS: [f64; 4] = [103.6, 1.2, 103.8, 1.4];

    /// Wrap a polygon after checking it encloses a finite, non-zero area.
    ///
    /// # Errors
    /// Returns [`AreaError::NonFinite`] or [`AreaError::Degenerate`].
    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self, AreaError> {
        let finite = polygon
            .exterior()
            .coords()
            .chain(polygon.interiors().iter().flat_map(|ring| ring.coords()))
            .all(|c| c.x.is_finite() && c.y.is_finite());
        if !finite {
            return Err(AreaError::NonFinite);
        }
        if polygon.unsigned_area() <= 0.0 {
            return Err(AreaError::Degenerate);
        }
        let bounds = polygon.bounding_rect().ok_or(AreaError::Degenerate)?;
        Ok(Self { polygon, bounds })
    }

    /// Build a rectangular area from its corners.
    ///
    /// # Errors
    /// Returns [`AreaError::InvalidBounds`] when a corner is non-finite or
    /// the minimum is not strictly below the maximum on either axis.
    pub fn from_bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, AreaError> {
        let valid = [min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite())
            && min_x < max_x
            && min_y < max_y;
        if !valid {
            return Err(AreaError::InvalidBounds {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }
        let rect = Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y });
        Self::from_polygon(rect.to_polygon())
    }

    /// Parse a GeoJSON polygon, feature, or single-feature collection.
    ///
    /// # Errors
    /// Returns [`AreaError::GeoJson`] for malformed input and
    /// [`AreaError::UnsupportedGeometry`] for anything but one polygon.
    pub fn from_geojson(text: &str) -> Result<Self, AreaError> {
        let geometry = match text.parse::<GeoJson>()? {
            GeoJson::Geometry(geometry) => geometry,
            GeoJson::Feature(feature) => {
                feature
                    .geometry
                    .ok_or_else(|| AreaError::UnsupportedGeometry {
                        kind: "feature without geometry".to_owned(),
                    })?
            }
            GeoJson::FeatureCollection(collection) => {
                let count = collection.features.len();
                let mut features = collection.features.into_iter();
                match (features.next().and_then(|f| f.geometry), count) {
                    (Some(geometry), 1) => geometry,
                    _ => {
                        return Err(AreaError::UnsupportedGeometry {
                            kind: format!("feature collection of {count} features"),
                        });
                    }
                }
            }
        };
        match geo::Geometry::<f64>::try_from(geometry)? {
            geo::Geometry::Polygon(polygon) => Self::from_polygon(polygon),
            other => Err(AreaError::UnsupportedGeometry {
                kind: geometry_kind(&other).to_owned(),
            }),
        }
    }

    /// The area polygon.
    #[must_use]
    pub const fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Axis-aligned bounds of the polygon.
    #[must_use]
    pub const fn bounds(&self) -> Rect<f64> {
        self.bounds
    }
}

const fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}

/// Errors raised when building a [`DateRange`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    /// The start date was not before the end date.
    #[error("date range start {start} must be before end {end}")]
    Empty {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },
    /// A date string could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    Parse {
        /// Offending input.
        value: String,
    },
}

/// Half-open acquisition window `[start, end)`.
///
/// # Examples
/// ```
/// use sitescreen_core::DateRange;
///
/// let range = DateRange::parse("2023-11-01", "2023-12-01")?;
/// assert!(range.contains("2023-11-30".parse().unwrap()));
/// assert!(!range.contains("2023-12-01".parse().unwrap()));
/// # Ok::<(), sitescreen_core::DateRangeError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Default window start.
    pub const DEFAULT_START: &'static str = "2023-11-01";
    /// Default window end (exclusive).
    pub const DEFAULT_END: &'static str = "2023-12-01";

    /// Build a range, rejecting empty or inverted windows.
    ///
    /// # Errors
    /// Returns [`DateRangeError::Empty`] when `start >= end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start >= end {
            return Err(DateRangeError::Empty { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse both ends from `YYYY-MM-DD` strings.
    ///
    /// # Errors
    /// Returns [`DateRangeError::Parse`] for malformed dates and
    /// [`DateRangeError::Empty`] for an empty window.
    pub fn parse(start: &str, end: &str) -> Result<Self, DateRangeError> {
        let parse = |value: &str| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                DateRangeError::Parse {
                    value: value.to_owned(),
                }
            })
        };
        Self::new(parse(start)?, parse(end)?)
    }

    /// First day of the window.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day after the window.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Report whether `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use rstest::rstest;

    #[rstest]
    fn default_bounds_build_an_area() {
        let [min_x, min_y, max_x, max_y] = AreaOfInterest::DEFAULT_BOUNDS;
        let aoi = AreaOfInterest::from_bounds(min_x, min_y, max_x, max_y).expect("valid area");
        assert_eq!(aoi.bounds().max(), Coord { x: 103.8, y: 1.4 });
    }

    #[rstest]
    #[case(1.0, 1.0, 1.0, 2.0)]
    #[case(2.0, 1.0, 1.0, 2.0)]
    #[case(f64::NAN, 1.0, 2.0, 2.0)]
    fn rejects_degenerate_bounds(
        #[case] min_x: f64,
        #[case] min_y: f64,
        #[case] max_x: f64,
        #[case] max_y: f64,
    ) {
        let err = AreaOfInterest::from_bounds(min_x, min_y, max_x, max_y).unwrap_err();
        assert!(matches!(err, AreaError::InvalidBounds { .. }));
    }

    #[rstest]
    fn rejects_collinear_polygon() {
        let line = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 2.0)];
        let err = AreaOfInterest::from_polygon(line).unwrap_err();
        assert!(matches!(err, AreaError::Degenerate));
    }

    #[rstest]
    fn parses_feature_geojson() {
        let text = r#"{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
            }
        }"#;
        let aoi = AreaOfInterest::from_geojson(text).expect("valid area");
        assert_eq!(aoi.bounds().width(), 1.0);
    }

    #[rstest]
    fn rejects_point_geojson() {
        let err = AreaOfInterest::from_geojson(r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#)
            .unwrap_err();
        assert!(matches!(err, AreaError::UnsupportedGeometry { ref kind } if kind == "Point"));
    }

    #[rstest]
    fn rejects_malformed_geojson() {
        let err = AreaOfInterest::from_geojson("{not json").unwrap_err();
        assert!(matches!(err, AreaError::GeoJson { .. }));
    }

    #[rstest]
    #[case("2023-11-01", "2023-11-01")]
    #[case("2023-12-01", "2023-11-01")]
    fn rejects_empty_date_ranges(#[case] start: &str, #[case] end: &str) {
        let err = DateRange::parse(start, end).unwrap_err();
        assert!(matches!(err, DateRangeError::Empty { .. }));
    }

    #[rstest]
    fn rejects_malformed_dates() {
        let err = DateRange::parse("01/11/2023", "2023-12-01").unwrap_err();
        assert_eq!(
            err,
            DateRangeError::Parse {
                value: "01/11/2023".to_owned()
            }
        );
    }

    #[rstest]
    fn default_window_is_november_2023() {
        let range = DateRange::parse(DateRange::DEFAULT_START, DateRange::DEFAULT_END)
            .expect("valid default");
        assert_eq!(range.to_string(), "2023-11-01..2023-12-01");
    }
}
