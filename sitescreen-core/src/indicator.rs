//! The five suitability indicators and the validated record that holds them.
//!
//! Each indicator is a value in `0.0..=1.0`: booleans map to `0.0`/`1.0`
//! and area aggregates are the fraction of the area satisfying the rule.
//!
//! # Examples
//! ```
//! use sitescreen_core::Indicator;
//!
//! assert_eq!(Indicator::FloodFree.as_str(), "is_flood_free");
//! assert_eq!("near_road".parse::<Indicator>(), Ok(Indicator::NearRoad));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::ScoreError;

/// One of the five suitability indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Indicator {
    /// Bare soil (low NDVI, bright SWIR) that is also dry (low backscatter).
    BareAndDry,
    /// Terrain slope below the flatness threshold.
    Flat,
    /// Outside the historical maximum surface-water extent.
    FloodFree,
    /// Within the road proximity threshold.
    NearRoad,
    /// Not contained in a protected area. Area-level.
    Unprotected,
}

impl Indicator {
    /// All indicators in canonical order.
    pub const ALL: [Self; 5] = [
        Self::BareAndDry,
        Self::Flat,
        Self::FloodFree,
        Self::NearRoad,
        Self::Unprotected,
    ];

    /// Return the canonical field name, e.g. `is_bare_and_dry`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BareAndDry => "is_bare_and_dry",
            Self::Flat => "is_flat",
            Self::FloodFree => "is_flood_free",
            Self::NearRoad => "is_near_road",
            Self::Unprotected => "is_unprotected",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Indicator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace('-', "_");
        let name = normalised.strip_prefix("is_").unwrap_or(&normalised);
        match name {
            "bare_and_dry" => Ok(Self::BareAndDry),
            "flat" => Ok(Self::Flat),
            "flood_free" => Ok(Self::FloodFree),
            "near_road" => Ok(Self::NearRoad),
            "unprotected" => Ok(Self::Unprotected),
            _ => Err(format!("unknown indicator '{s}'")),
        }
    }
}

/// A validated set of indicator values for one location or area.
///
/// # Examples
/// ```
/// use sitescreen_core::{Indicator, IndicatorSet, ScoreError};
///
/// let set = IndicatorSet::new(0.0, 1.0, 0.0, 1.0, 0.0)?;
/// assert_eq!(set.value(Indicator::Flat), 1.0);
///
/// let err = IndicatorSet::new(0.0, 1.5, 0.0, 1.0, 0.0).unwrap_err();
/// assert!(matches!(err, ScoreError::InvalidIndicatorSet { field: Indicator::Flat, .. }));
/// # Ok::<(), ScoreError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorSet {
    is_bare_and_dry: f64,
    is_flat: f64,
    is_flood_free: f64,
    is_near_road: f64,
    is_unprotected: f64,
}

impl IndicatorSet {
    /// Validate and construct an [`IndicatorSet`].
    ///
    /// # Errors
    /// Returns [`ScoreError::InvalidIndicatorSet`] naming the first field, in
    /// canonical order, that is non-finite or outside `0.0..=1.0`.
    pub fn new(
        is_bare_and_dry: f64,
        is_flat: f64,
        is_flood_free: f64,
        is_near_road: f64,
        is_unprotected: f64,
    ) -> Result<Self, ScoreError> {
        let record = IndicatorRecord {
            is_bare_and_dry: Some(is_bare_and_dry),
            is_flat: Some(is_flat),
            is_flood_free: Some(is_flood_free),
            is_near_road: Some(is_near_road),
            is_unprotected: Some(is_unprotected),
        };
        Self::try_from(record)
    }

    /// Return the value of `indicator`.
    #[must_use]
    pub const fn value(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::BareAndDry => self.is_bare_and_dry,
            Indicator::Flat => self.is_flat,
            Indicator::FloodFree => self.is_flood_free,
            Indicator::NearRoad => self.is_near_road,
            Indicator::Unprotected => self.is_unprotected,
        }
    }

    /// Iterate over `(indicator, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Indicator, f64)> + '_ {
        Indicator::ALL
            .into_iter()
            .map(|indicator| (indicator, self.value(indicator)))
    }
}

/// Check that `value` lies in the closed unit interval.
pub(crate) fn check_unit_interval(field: Indicator, value: f64) -> Result<f64, ScoreError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ScoreError::out_of_range(field, value))
    }
}

/// Unvalidated indicator input where any field may be absent.
///
/// This is the shape read from JSON or assembled from command-line flags;
/// convert it with [`IndicatorSet::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct IndicatorRecord {
    /// Bare and dry indicator.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_bare_and_dry: Option<f64>,
    /// Flatness indicator.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_flat: Option<f64>,
    /// Flood-free indicator.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_flood_free: Option<f64>,
    /// Road proximity indicator.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_near_road: Option<f64>,
    /// Protected-area indicator.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_unprotected: Option<f64>,
}

impl IndicatorRecord {
    /// Return the raw value for `indicator`, if present.
    #[must_use]
    pub const fn get(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::BareAndDry => self.is_bare_and_dry,
            Indicator::Flat => self.is_flat,
            Indicator::FloodFree => self.is_flood_free,
            Indicator::NearRoad => self.is_near_road,
            Indicator::Unprotected => self.is_unprotected,
        }
    }

    /// Overlay the present fields of `overrides` on top of `self`.
    #[must_use]
    pub fn overlay(self, overrides: Self) -> Self {
        Self {
            is_bare_and_dry: overrides.is_bare_and_dry.or(self.is_bare_and_dry),
            is_flat: overrides.is_flat.or(self.is_flat),
            is_flood_free: overrides.is_flood_free.or(self.is_flood_free),
            is_near_road: overrides.is_near_road.or(self.is_near_road),
            is_unprotected: overrides.is_unprotected.or(self.is_unprotected),
        }
    }
}

impl TryFrom<IndicatorRecord> for IndicatorSet {
    type Error = ScoreError;

    fn try_from(record: IndicatorRecord) -> Result<Self, Self::Error> {
        let require = |indicator: Indicator| {
            record
                .get(indicator)
                .ok_or_else(|| ScoreError::missing(indicator))
                .and_then(|value| check_unit_interval(indicator, value))
        };
        Ok(Self {
            is_bare_and_dry: require(Indicator::BareAndDry)?,
            is_flat: require(Indicator::Flat)?,
            is_flood_free: require(Indicator::FloodFree)?,
            is_near_road: require(Indicator::NearRoad)?,
            is_unprotected: require(Indicator::Unprotected)?,
        })
    }
}

impl From<IndicatorSet> for IndicatorRecord {
    fn from(set: IndicatorSet) -> Self {
        Self {
            is_bare_and_dry: Some(set.is_bare_and_dry),
            is_flat: Some(set.is_flat),
            is_flood_free: Some(set.is_flood_free),
            is_near_road: Some(set.is_near_road),
            is_unprotected: Some(set.is_unprotected),
        }
    }
}
