//! Brovey band-ratio fusion.
//!
//! Per-pixel brightness is the weighted sum of the color bands, with the
//! weight applied to the last band. Each band is scaled by the ratio of pan
//! intensity to brightness, which injects the pan band's spatial detail
//! while preserving the band's share of total brightness (hue).

use ndarray::{Array2, Array3};

/// Fuses the color bands with the pan band.
///
/// Zero-brightness pixels take ratio 0 instead of dividing by zero. Results
/// clip into `[0, intermediate_max]`, the valid range of the pan sample type.
pub fn brovey(
    bands: &Array3<f32>,
    pan: &Array2<f32>,
    weight: f32,
    intermediate_max: f32,
) -> Array3<f32> {
    let (count, height, width) = bands.dim();
    let denominator = (count - 1) as f32 + weight;

    let mut fused = Array3::zeros((count, height, width));

    for row in 0..height {
        for col in 0..width {
            let mut sum = 0.0;
            for band in 0..count - 1 {
                sum += bands[[band, row, col]];
            }
            sum += bands[[count - 1, row, col]] * weight;
            let brightness = sum / denominator;

            let ratio = if brightness == 0.0 {
                0.0
            } else {
                pan[[row, col]] / brightness
            };

            for band in 0..count {
                let value = bands[[band, row, col]] * ratio;
                fused[[band, row, col]] = value.clamp(0.0, intermediate_max);
            }
        }
    }

    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_weight_ratio() {
        // Uniform color 100 with pan 200 doubles every band
        let bands = Array3::from_elem((3, 2, 2), 100.0);
        let pan = Array2::from_elem((2, 2), 200.0);

        let fused = brovey(&bands, &pan, 1.0, 65535.0);
        assert!(fused.iter().all(|&v| (v - 200.0).abs() < 1e-4));
    }

    #[test]
    fn test_skewed_weight_changes_brightness() {
        let mut bands = Array3::zeros((3, 1, 1));
        bands[[0, 0, 0]] = 90.0;
        bands[[1, 0, 0]] = 90.0;
        bands[[2, 0, 0]] = 30.0;
        let pan = Array2::from_elem((1, 1), 100.0);

        // Equal weights: brightness (90+90+30)/3 = 70, ratio 100/70
        let equal = brovey(&bands, &pan, 1.0, 65535.0);
        assert!((equal[[0, 0, 0]] - 90.0 * 100.0 / 70.0).abs() < 1e-3);

        // Downweighted last band: brightness (90+90+30*0.2)/2.2 = 84.54..
        let skewed = brovey(&bands, &pan, 0.2, 65535.0);
        let brightness = (90.0 + 90.0 + 30.0 * 0.2) / 2.2;
        assert!((skewed[[0, 0, 0]] - 90.0 * 100.0 / brightness).abs() < 1e-3);
        assert!(skewed[[0, 0, 0]] > equal[[0, 0, 0]]);
    }

    #[test]
    fn test_zero_brightness_pixel_fuses_to_zero() {
        let bands = Array3::zeros((3, 2, 2));
        let pan = Array2::from_elem((2, 2), 12345.0);

        let fused = brovey(&bands, &pan, 1.0, 65535.0);
        assert!(fused.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_clips_to_intermediate_range() {
        // Pan far brighter than color pushes the product past the range
        let bands = Array3::from_elem((3, 1, 1), 200.0);
        let pan = Array2::from_elem((1, 1), 65535.0);

        let fused = brovey(&bands, &pan, 1.0, 65535.0);
        assert_eq!(fused[[0, 0, 0]], 65535.0);

        // A u8 pan source clips at 255 instead
        let bands = Array3::from_elem((3, 1, 1), 100.0);
        let pan = Array2::from_elem((1, 1), 255.0);
        let fused = brovey(&bands, &pan, 1.0, 255.0);
        assert_eq!(fused[[1, 0, 0]], 255.0);
    }

    #[test]
    fn test_hue_shares_are_preserved() {
        let mut bands = Array3::zeros((3, 1, 1));
        bands[[0, 0, 0]] = 60.0;
        bands[[1, 0, 0]] = 30.0;
        bands[[2, 0, 0]] = 10.0;
        let pan = Array2::from_elem((1, 1), 500.0);

        let fused = brovey(&bands, &pan, 1.0, 65535.0);
        // Band ratios before and after fusion match
        let r01 = fused[[0, 0, 0]] / fused[[1, 0, 0]];
        let r12 = fused[[1, 0, 0]] / fused[[2, 0, 0]];
        assert!((r01 - 2.0).abs() < 1e-4);
        assert!((r12 - 3.0).abs() < 1e-4);
    }
}
