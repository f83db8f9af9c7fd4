//! Affine grid resampling for color tiles.
//!
//! Each target pixel center is mapped to ground space through the target
//! transform, then back into the source grid through the inverted source
//! transform. Sample coordinates follow the pixel-center convention, so
//! resampling a buffer onto its own grid returns it unchanged.

use ndarray::{Array3, ArrayView2, Axis};

use crate::sharpen_pipeline::common::error::Result;
use crate::sharpen_pipeline::fusion::types::Resampling;
use crate::sharpen_pipeline::geo::GeoTransform;

/// Resamples a band-major buffer onto a target grid.
///
/// Coordinates falling outside the source extent sample the fill value.
pub fn resample(
    source: &Array3<f32>,
    source_transform: &GeoTransform,
    target_shape: (usize, usize),
    target_transform: &GeoTransform,
    method: Resampling,
    fill: f32,
) -> Result<Array3<f32>> {
    let (count, _, _) = source.dim();
    let (target_height, target_width) = target_shape;
    let inverse = source_transform.invert()?;

    let mut resampled = Array3::zeros((count, target_height, target_width));

    for band in 0..count {
        let plane = source.index_axis(Axis(0), band);
        for i in 0..target_height {
            for j in 0..target_width {
                // Ground coordinate of the target pixel center
                let (x, y) = target_transform.apply(j as f64 + 0.5, i as f64 + 0.5);
                let (source_col, source_row) = inverse.apply(x, y);

                resampled[[band, i, j]] = match method {
                    Resampling::Nearest => sample_nearest(plane, source_col, source_row, fill),
                    Resampling::Bilinear => sample_bilinear(plane, source_col, source_row, fill),
                };
            }
        }
    }

    Ok(resampled)
}

/// Value of the pixel containing the fractional grid coordinate.
fn sample_nearest(plane: ArrayView2<f32>, col: f64, row: f64, fill: f32) -> f32 {
    pixel_or_fill(plane, col.floor() as i64, row.floor() as i64, fill)
}

/// Bilinear interpolation between the four pixel centers surrounding the
/// fractional grid coordinate.
fn sample_bilinear(plane: ArrayView2<f32>, col: f64, row: f64, fill: f32) -> f32 {
    // Shift from grid coordinates to pixel-center coordinates
    let x = col - 0.5;
    let y = row - 0.5;
    let x0 = x.floor();
    let y0 = y.floor();
    let dx = (x - x0) as f32;
    let dy = (y - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let v00 = pixel_or_fill(plane, x0, y0, fill);
    let v10 = pixel_or_fill(plane, x0 + 1, y0, fill);
    let v01 = pixel_or_fill(plane, x0, y0 + 1, fill);
    let v11 = pixel_or_fill(plane, x0 + 1, y0 + 1, fill);

    v00 * (1.0 - dx) * (1.0 - dy)
        + v10 * dx * (1.0 - dy)
        + v01 * (1.0 - dx) * dy
        + v11 * dx * dy
}

fn pixel_or_fill(plane: ArrayView2<f32>, col: i64, row: i64, fill: f32) -> f32 {
    let (height, width) = plane.dim();
    if col < 0 || row < 0 || col >= width as i64 || row >= height as i64 {
        fill
    } else {
        plane[[row as usize, col as usize]]
    }
}
