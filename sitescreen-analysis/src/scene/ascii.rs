//! ESRI ASCII grid writer used by the scene provider's export.
#![expect(
    clippy::float_arithmetic,
    reason = "the lower-left corner is derived from the grid origin"
)]

use std::io::{self, Write};

use geo::{Intersects, Point, Polygon};
use sitescreen_core::Grid;

/// Value written for masked cells and cells outside the export region.
pub const NODATA: f64 = -9999.0;

/// Write `layer` as an ESRI ASCII grid, masking cells whose centre lies
/// outside `region`.
pub(super) fn write_ascii_grid<W: Write>(
    mut out: W,
    layer: &Grid<f64>,
    region: &Polygon<f64>,
) -> io::Result<()> {
    let transform = layer.transform();
    #[expect(
        clippy::cast_precision_loss,
        reason = "raster heights stay far below 2^52"
    )]
    let rows = layer.height() as f64;
    writeln!(out, "ncols {}", layer.width())?;
    writeln!(out, "nrows {}", layer.height())?;
    writeln!(out, "xllcorner {}", transform.origin.x)?;
    writeln!(out, "yllcorner {}", transform.origin.y - rows * transform.cell_size)?;
    writeln!(out, "cellsize {}", transform.cell_size)?;
    writeln!(out, "NODATA_value {NODATA}")?;

    for (row_index, row) in layer.cells().chunks(layer.width().max(1)).enumerate() {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, &value)| {
                let centre = Point::from(transform.cell_center(col, row_index));
                if value.is_nan() || !region.intersects(&centre) {
                    NODATA.to_string()
                } else {
                    value.to_string()
                }
            })
            .collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    out.flush()
}
