//! Nodata clamping for resampled color tiles.
//!
//! Sample value 0 marks missing data in this imagery family. A pixel where
//! any band is 0 must not leak its remaining band values into the fusion
//! ratio, so every band is capped at a threshold derived from the per-pixel
//! band minimum: zero where the minimum is zero, far above the sample range
//! otherwise.

use ndarray::Array3;

/// Sentinel sample value marking missing data
pub const NODATA: f32 = 0.0;

/// Threshold multiplier; any nonzero minimum scales beyond the 16-bit range
const MASK_THRESHOLD_FACTOR: f32 = 65536.0;

/// Caps every band at the per-pixel minimum-derived threshold, zeroing all
/// bands of any pixel where at least one band is nodata.
pub fn clamp_nodata(mut bands: Array3<f32>) -> Array3<f32> {
    let (count, height, width) = bands.dim();

    for row in 0..height {
        for col in 0..width {
            let mut minimum = f32::MAX;
            for band in 0..count {
                minimum = minimum.min(bands[[band, row, col]]);
            }
            let threshold = minimum * MASK_THRESHOLD_FACTOR;
            for band in 0..count {
                if bands[[band, row, col]] > threshold {
                    bands[[band, row, col]] = threshold;
                }
            }
        }
    }

    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_with_all_bands_present_are_untouched() {
        let bands = Array3::from_shape_fn((3, 2, 2), |(b, r, c)| (b * 100 + r * 10 + c + 1) as f32);
        let clamped = clamp_nodata(bands.clone());
        assert_eq!(clamped, bands);
    }

    #[test]
    fn test_partial_nodata_pixel_is_fully_zeroed() {
        let mut bands = Array3::from_elem((3, 2, 2), 100.0);
        bands[[0, 1, 1]] = NODATA;

        let clamped = clamp_nodata(bands);
        for band in 0..3 {
            assert_eq!(clamped[[band, 1, 1]], 0.0);
        }
        // Other pixels keep their values
        assert_eq!(clamped[[1, 0, 0]], 100.0);
        assert_eq!(clamped[[2, 1, 0]], 100.0);
    }

    #[test]
    fn test_large_values_survive_when_minimum_is_nonzero() {
        let mut bands = Array3::from_elem((3, 1, 1), 65000.0);
        bands[[1, 0, 0]] = 1.0;

        let clamped = clamp_nodata(bands);
        // Threshold is 1 * 65536, above every sample
        assert_eq!(clamped[[0, 0, 0]], 65000.0);
        assert_eq!(clamped[[1, 0, 0]], 1.0);
    }

    #[test]
    fn test_fully_nodata_tile() {
        let bands = Array3::from_elem((3, 4, 4), NODATA);
        let clamped = clamp_nodata(bands);
        assert!(clamped.iter().all(|&v| v == 0.0));
    }
}
