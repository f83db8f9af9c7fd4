//! Output encoding: rescale to 8 bits and append the validity mask band.

use ndarray::Array3;

/// Mask value for pixels carrying real data
pub const ALPHA_VALID: u8 = 255;
/// Mask value for background/nodata pixels
pub const ALPHA_INVALID: u8 = 0;

/// Divides every fused sample by the scale factor, truncating into u8, and
/// appends a validity band: a pixel is invalid when all rescaled bands are 0.
pub fn encode_output(fused: &Array3<f32>, scale: f32) -> Array3<u8> {
    let (count, height, width) = fused.dim();
    let mut output = Array3::zeros((count + 1, height, width));

    for row in 0..height {
        for col in 0..width {
            let mut all_background = true;
            for band in 0..count {
                let value = (fused[[band, row, col]] / scale) as u8;
                if value != 0 {
                    all_background = false;
                }
                output[[band, row, col]] = value;
            }
            output[[count, row, col]] = if all_background {
                ALPHA_INVALID
            } else {
                ALPHA_VALID
            };
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescales_16_bit_range_to_8_bit() {
        let mut fused = Array3::zeros((3, 1, 2));
        fused[[0, 0, 0]] = 65535.0;
        fused[[1, 0, 0]] = 51400.0;
        fused[[2, 0, 0]] = 257.0;

        // 65535 / 255 ratio of range maxima
        let output = encode_output(&fused, 257.0);
        assert_eq!(output.dim(), (4, 1, 2));
        assert_eq!(output[[0, 0, 0]], 255);
        assert_eq!(output[[1, 0, 0]], 200);
        assert_eq!(output[[2, 0, 0]], 1);
        assert_eq!(output[[3, 0, 0]], ALPHA_VALID);
    }

    #[test]
    fn test_all_background_pixel_is_masked_invalid() {
        let mut fused = Array3::zeros((3, 2, 2));
        fused[[0, 0, 0]] = 25700.0;

        let output = encode_output(&fused, 257.0);
        // Pixel (0, 0) has one nonzero band
        assert_eq!(output[[3, 0, 0]], ALPHA_VALID);
        // Every fully-zero pixel is background
        assert_eq!(output[[3, 0, 1]], ALPHA_INVALID);
        assert_eq!(output[[3, 1, 1]], ALPHA_INVALID);
        assert_eq!(output[[0, 1, 0]], 0);
    }

    #[test]
    fn test_unit_scale_truncates() {
        let mut fused = Array3::zeros((3, 1, 1));
        fused[[0, 0, 0]] = 199.9;
        fused[[1, 0, 0]] = 0.4;
        fused[[2, 0, 0]] = 255.0;

        let output = encode_output(&fused, 1.0);
        assert_eq!(output[[0, 0, 0]], 199);
        assert_eq!(output[[1, 0, 0]], 0);
        assert_eq!(output[[2, 0, 0]], 255);
    }
}
