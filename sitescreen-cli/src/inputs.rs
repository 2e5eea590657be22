//! Input helpers shared by the analysis commands.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Serialize, de::DeserializeOwned};
use sitescreen_core::{AreaOfInterest, DateRange};

use crate::{ARG_AOI, ARG_BBOX, CliError};

/// Where the area of interest comes from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AreaSource {
    /// GeoJSON polygon file; takes precedence over a bounding box.
    Polygon(Utf8PathBuf),
    /// `[min_x, min_y, max_x, max_y]` in degrees.
    Bounds([f64; 4]),
    /// Nothing selected.
    Unselected,
}

impl AreaSource {
    pub(crate) fn from_options(
        aoi: Option<Utf8PathBuf>,
        bbox: Option<&str>,
    ) -> Result<Self, CliError> {
        match (aoi, bbox) {
            (Some(path), _) => Ok(Self::Polygon(path)),
            (None, Some(text)) => parse_bbox(text).map(Self::Bounds),
            (None, None) => Ok(Self::Unselected),
        }
    }

    /// Build the area, or `None` when nothing was selected.
    pub(crate) fn load(&self) -> Result<Option<AreaOfInterest>, CliError> {
        match self {
            Self::Polygon(path) => {
                let text = read_text(ARG_AOI, path)?;
                Ok(Some(AreaOfInterest::from_geojson(&text)?))
            }
            Self::Bounds([min_x, min_y, max_x, max_y]) => Ok(Some(AreaOfInterest::from_bounds(
                *min_x, *min_y, *max_x, *max_y,
            )?)),
            Self::Unselected => Ok(None),
        }
    }
}

/// Parse `min_x,min_y,max_x,max_y`.
pub(crate) fn parse_bbox(text: &str) -> Result<[f64; 4], CliError> {
    let invalid = |reason: String| CliError::InvalidArgument {
        field: ARG_BBOX,
        value: text.to_owned(),
        reason,
    };
    let values = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| invalid(err.to_string()))?;
    <[f64; 4]>::try_from(values)
        .map_err(|found| invalid(format!("expected 4 numbers, found {}", found.len())))
}

/// Parse the acquisition window, defaulting either end.
pub(crate) fn resolve_dates(start: Option<&str>, end: Option<&str>) -> Result<DateRange, CliError> {
    Ok(DateRange::parse(
        start.unwrap_or(DateRange::DEFAULT_START),
        end.unwrap_or(DateRange::DEFAULT_END),
    )?)
}

pub(crate) fn read_text(field: &'static str, path: &Utf8Path) -> Result<String, CliError> {
    sitescreen_fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}

/// Load a JSON document from disk.
pub(crate) fn read_json<T: DeserializeOwned>(
    field: &'static str,
    path: &Utf8Path,
) -> Result<T, CliError> {
    let text = read_text(field, path)?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
