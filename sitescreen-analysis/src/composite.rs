//! Per-pixel compositing of a scene collection.
//!
//! Optical scenes are reduced with the median, which suppresses residual
//! cloud and shadow; radar scenes are averaged to damp speckle. Masked
//! samples (`NaN`) are ignored, and a pixel masked in every scene stays
//! masked.
#![expect(
    clippy::float_arithmetic,
    reason = "compositing averages floating-point samples"
)]

use std::collections::BTreeMap;

use log::debug;
use sitescreen_core::{Grid, ImageCollection};

use crate::ClassifyError;

/// Per-pixel reduction applied across scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    /// Middle value; mean of the two middle values for even counts.
    Median,
    /// Arithmetic mean.
    Mean,
}

impl Reducer {
    fn reduce(self, samples: &mut Vec<f64>) -> f64 {
        samples.retain(|value| !value.is_nan());
        if samples.is_empty() {
            return f64::NAN;
        }
        match self {
            Self::Mean => {
                let total: f64 = samples.iter().sum();
                #[expect(
                    clippy::cast_precision_loss,
                    reason = "scene counts stay far below 2^52"
                )]
                let count = samples.len() as f64;
                total / count
            }
            Self::Median => {
                samples.sort_by(f64::total_cmp);
                let upper = samples.len().div_euclid(2);
                let high = samples.get(upper).copied().unwrap_or(f64::NAN);
                if samples.len().is_multiple_of(2) {
                    let low = upper
                        .checked_sub(1)
                        .and_then(|index| samples.get(index))
                        .copied()
                        .unwrap_or(f64::NAN);
                    (low + high) / 2.0
                } else {
                    high
                }
            }
        }
    }
}

/// Composite bands keyed by name, all on one grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    dataset: String,
    bands: BTreeMap<String, Grid<f64>>,
}

impl Composite {
    /// Return the composite for `band`.
    ///
    /// # Errors
    /// Returns [`ClassifyError::MissingBand`] when the band was not
    /// composited.
    pub fn band(&self, band: &str) -> Result<&Grid<f64>, ClassifyError> {
        self.bands
            .get(band)
            .ok_or_else(|| ClassifyError::MissingBand {
                dataset: self.dataset.clone(),
                band: band.to_owned(),
            })
    }

    /// Dataset the composite was built from.
    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }
}

/// Median composite of `bands` across `collection`.
///
/// # Errors
/// See [`composite`].
pub fn median_composite(
    collection: &ImageCollection,
    bands: &[&str],
) -> Result<Composite, ClassifyError> {
    composite(collection, bands, Reducer::Median)
}

/// Mean composite of `bands` across `collection`.
///
/// # Errors
/// See [`composite`].
pub fn mean_composite(
    collection: &ImageCollection,
    bands: &[&str],
) -> Result<Composite, ClassifyError> {
    composite(collection, bands, Reducer::Mean)
}

/// Reduce each of `bands` across the scenes of `collection`.
///
/// # Errors
/// Returns [`ClassifyError::EmptyCollection`] for a collection without
/// scenes, [`ClassifyError::MissingBand`] when a scene lacks a band and
/// [`ClassifyError::Raster`] when scenes are not co-registered.
pub fn composite(
    collection: &ImageCollection,
    bands: &[&str],
    reducer: Reducer,
) -> Result<Composite, ClassifyError> {
    let Some((first, rest)) = collection.scenes.split_first() else {
        return Err(ClassifyError::EmptyCollection {
            dataset: collection.dataset.clone(),
        });
    };
    debug!(
        "compositing {} scenes of '{}' with {reducer:?}",
        collection.len(),
        collection.dataset
    );

    let missing = |band: &str| ClassifyError::MissingBand {
        dataset: collection.dataset.clone(),
        band: band.to_owned(),
    };
    let mut composited = BTreeMap::new();
    for &band in bands {
        let reference = first.band(band).ok_or_else(|| missing(band))?;
        let mut layers = Vec::with_capacity(collection.len());
        layers.push(reference);
        for scene in rest {
            let layer = scene.band(band).ok_or_else(|| missing(band))?;
            reference.ensure_aligned(layer)?;
            layers.push(layer);
        }

        let mut reduced = reference.map(|_| f64::NAN);
        let mut samples = Vec::with_capacity(layers.len());
        for (index, cell) in reduced.cells_mut().iter_mut().enumerate() {
            samples.clear();
            samples.extend(layers.iter().filter_map(|layer| layer.cells().get(index)));
            *cell = reducer.reduce(&mut samples);
        }
        composited.insert(band.to_owned(), reduced);
    }
    Ok(Composite {
        dataset: collection.dataset.clone(),
        bands: composited,
    })
}
