//! Area means of raster layers over an area of interest.
//!
//! The area is sampled on a regular lattice whose spacing is the summary
//! scale. Each retained sample stands for the same patch of ground, so the
//! plain mean over samples is the area-weighted mean of the layer.
#![expect(
    clippy::float_arithmetic,
    reason = "sampling positions and means are floating-point"
)]

use geo::{BoundingRect, Coord, InteriorPoint, Intersects, Point, Polygon};
use log::debug;
use thiserror::Error;

use crate::Grid;

/// Sampling resolution in map units, matching the 30 m optical and
/// elevation pixels.
pub const DEFAULT_SUMMARY_SCALE: f64 = 30.0;

/// Upper bound on lattice samples for one summary.
const MAX_SAMPLES: usize = 10_000_000;

/// Errors raised while summarising layers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    /// The sampling scale was not positive and finite.
    #[error("summary scale must be positive and finite, got {scale}")]
    InvalidScale {
        /// Offending scale.
        scale: f64,
    },
    /// The same label was requested twice.
    #[error("summary label '{label}' was requested more than once")]
    DuplicateLabel {
        /// Repeated label.
        label: String,
    },
    /// The area would need more samples than allowed at this scale.
    #[error("area needs {required} samples at this scale, limit is {limit}")]
    TooManySamples {
        /// Samples the lattice would contain.
        required: usize,
        /// Maximum permitted.
        limit: usize,
    },
}

/// Labelled area means in the order they were requested.
///
/// A `None` mean marks a layer with no valid samples inside the area.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    entries: Vec<(String, Option<f64>)>,
}

impl Summary {
    /// Return the mean recorded for `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<Option<f64>> {
        self.entries
            .iter()
            .find(|(name, _)| name == label)
            .map(|&(_, mean)| mean)
    }

    /// Iterate over `(label, mean)` pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.entries
            .iter()
            .map(|(label, mean)| (label.as_str(), *mean))
    }

    /// Labels in request order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether the summary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Summary {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, mean) in &self.entries {
            map.serialize_entry(label, mean)?;
        }
        map.end()
    }
}

/// Compute the area-weighted mean of each labelled layer over `aoi`.
///
/// Samples falling outside a layer or on masked (`NaN`) cells are skipped
/// for that layer. An area smaller than one sample is represented by its
/// interior point.
///
/// # Errors
/// Returns [`SummaryError::InvalidScale`] for a non-positive scale,
/// [`SummaryError::DuplicateLabel`] for a repeated label and
/// [`SummaryError::TooManySamples`] when the lattice would be too dense.
///
/// # Examples
/// ```
/// use geo::{Coord, Rect};
/// use sitescreen_core::{Grid, GridTransform, summarize};
///
/// let transform = GridTransform::new(Coord { x: 0.0, y: 60.0 }, 30.0);
/// let flat = Grid::from_vec(2, 2, transform, vec![1.0, 0.0, 1.0, 1.0])?;
/// let aoi = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 60.0, y: 60.0 }).to_polygon();
/// let summary = summarize([("Flatness Score", &flat)], &aoi, 30.0)?;
/// assert_eq!(summary.get("Flatness Score"), Some(Some(0.75)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn summarize<'a, I>(layers: I, aoi: &Polygon<f64>, scale: f64) -> Result<Summary, SummaryError>
where
    I: IntoIterator<Item = (&'a str, &'a Grid<f64>)>,
{
    if !scale.is_finite() || scale <= 0.0 {
        return Err(SummaryError::InvalidScale { scale });
    }
    let samples = sample_points(aoi, scale)?;
    debug!("summarising over {} samples at scale {scale}", samples.len());

    let mut summary = Summary::default();
    for (label, layer) in layers {
        if summary.get(label).is_some() {
            return Err(SummaryError::DuplicateLabel {
                label: label.to_owned(),
            });
        }
        summary.entries.push((label.to_owned(), layer_mean(layer, &samples)));
    }
    Ok(summary)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "sample counts stay far below 2^52"
)]
fn layer_mean(layer: &Grid<f64>, samples: &[Coord<f64>]) -> Option<f64> {
    let (sum, count) = samples
        .iter()
        .filter_map(|&sample| layer.sample(sample).copied())
        .filter(|value| !value.is_nan())
        .fold((0.0, 0_usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    reason = "lattice extents are finite, non-negative and bounded by MAX_SAMPLES"
)]
fn sample_points(aoi: &Polygon<f64>, scale: f64) -> Result<Vec<Coord<f64>>, SummaryError> {
    let Some(bounds) = aoi.bounding_rect() else {
        return Ok(Vec::new());
    };
    let span_x = (bounds.width() / scale).ceil().max(1.0);
    let span_y = (bounds.height() / scale).ceil().max(1.0);
    let required = span_x * span_y;
    if !required.is_finite() || required > MAX_SAMPLES as f64 {
        return Err(SummaryError::TooManySamples {
            required: if required.is_finite() {
                required as usize
            } else {
                usize::MAX
            },
            limit: MAX_SAMPLES,
        });
    }
    let (columns, rows) = (span_x as usize, span_y as usize);

    let min = bounds.min();
    let mut samples = Vec::new();
    for row in 0..rows {
        for col in 0..columns {
            let sample = Coord {
                x: min.x + (col as f64 + 0.5) * scale,
                y: min.y + (row as f64 + 0.5) * scale,
            };
            if aoi.intersects(&Point::from(sample)) {
                samples.push(sample);
            }
        }
    }
    if samples.is_empty()
        && let Some(point) = aoi.interior_point()
    {
        samples.push(point.0);
    }
    Ok(samples)
}
