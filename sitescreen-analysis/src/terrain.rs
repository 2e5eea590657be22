//! Terrain slope from a digital elevation model.
#![expect(
    clippy::float_arithmetic,
    reason = "slope is computed from floating-point elevation differences"
)]

use sitescreen_core::{Grid, RasterError};

/// Slope in degrees using Horn's 3x3 finite differences.
///
/// `spacing` is the ground distance between cell centres in the same unit
/// as the elevations. Edge cells replicate their nearest neighbour, so a
/// uniform plane has zero slope everywhere. A masked neighbour masks the
/// result.
///
/// # Errors
/// Returns [`RasterError::InvalidCellSize`] when `spacing` is not positive
/// and finite.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use sitescreen_analysis::slope_degrees;
/// use sitescreen_core::{Grid, GridTransform};
///
/// let transform = GridTransform::new(Coord { x: 0.0, y: 30.0 }, 10.0);
/// let ramp = Grid::from_vec(3, 1, transform, vec![0.0, 10.0, 20.0])?;
/// let slope = slope_degrees(&ramp, 10.0)?;
/// assert!((slope.cells()[1] - 45.0).abs() < 1e-9);
/// # Ok::<(), sitescreen_core::RasterError>(())
/// ```
pub fn slope_degrees(elevation: &Grid<f64>, spacing: f64) -> Result<Grid<f64>, RasterError> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(RasterError::InvalidCellSize { cell_size: spacing });
    }
    let (width, height) = elevation.shape();
    let at = |col: usize, row: usize, dc: isize, dr: isize| {
        let c = col.saturating_add_signed(dc).min(width - 1);
        let r = row.saturating_add_signed(dr).min(height - 1);
        elevation.get(c, r).copied().unwrap_or(f64::NAN)
    };

    let mut slope = elevation.map(|_| f64::NAN);
    for (index, cell) in slope.cells_mut().iter_mut().enumerate() {
        let (col, row) = (index.rem_euclid(width), index.div_euclid(width));
        let z1 = at(col, row, -1, -1);
        let z2 = at(col, row, 0, -1);
        let z3 = at(col, row, 1, -1);
        let z4 = at(col, row, -1, 0);
        let z6 = at(col, row, 1, 0);
        let z7 = at(col, row, -1, 1);
        let z8 = at(col, row, 0, 1);
        let z9 = at(col, row, 1, 1);
        let dz_dx = ((z3 + 2.0 * z6 + z9) - (z1 + 2.0 * z4 + z7)) / (8.0 * spacing);
        let dz_dy = ((z7 + 2.0 * z8 + z9) - (z1 + 2.0 * z2 + z3)) / (8.0 * spacing);
        *cell = dz_dx.hypot(dz_dy).atan().to_degrees();
    }
    Ok(slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::rstest;
    use sitescreen_core::GridTransform;

    fn grid(width: usize, height: usize, cells: Vec<f64>) -> Grid<f64> {
        let transform = GridTransform::new(Coord { x: 0.0, y: 100.0 }, 10.0);
        Grid::from_vec(width, height, transform, cells).expect("valid grid")
    }

    #[rstest]
    fn flat_plane_has_zero_slope() {
        let slope = slope_degrees(&grid(3, 3, vec![12.0; 9]), 10.0).expect("slope");
        assert!(slope.cells().iter().all(|&value| value == 0.0));
    }

    #[rstest]
    fn unit_ramp_is_forty_five_degrees() {
        let rows = [0.0, 10.0, 20.0, 30.0];
        let cells: Vec<f64> = (0..3).flat_map(|_| rows).collect();
        let slope = slope_degrees(&grid(4, 3, cells), 10.0).expect("slope");
        let centre = *slope.get(1, 1).expect("cell");
        assert!((centre - 45.0).abs() < 1e-9, "got {centre}");
    }

    #[rstest]
    fn edge_replication_halves_boundary_gradient() {
        let slope = slope_degrees(&grid(2, 1, vec![0.0, 10.0]), 10.0).expect("slope");
        let expected = 0.5_f64.atan().to_degrees();
        for value in slope.cells() {
            assert!((value - expected).abs() < 1e-9, "got {value}");
        }
    }

    #[rstest]
    fn masked_neighbour_masks_slope() {
        let slope = slope_degrees(&grid(3, 1, vec![0.0, f64::NAN, 0.0]), 10.0).expect("slope");
        assert!(slope.cells().iter().all(|value| value.is_nan()));
    }

    #[rstest]
    #[case(0.0)]
    #[case(f64::INFINITY)]
    fn rejects_bad_spacing(#[case] spacing: f64) {
        let err = slope_degrees(&grid(1, 1, vec![0.0]), spacing).unwrap_err();
        assert!(matches!(err, RasterError::InvalidCellSize { .. }));
    }
}
