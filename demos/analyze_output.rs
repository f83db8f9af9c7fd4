use std::collections::HashMap;

fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "pansharpened.tif".to_string());

    let mut decoder = tiff::decoder::Decoder::new(std::fs::File::open(&path)?)?;
    let (width, height) = decoder.dimensions()?;

    println!("Image: {}x{} pixels", width, height);

    // Read the image data
    let mut decoder = tiff::decoder::Decoder::new(std::fs::File::open(&path)?)?;
    let image = decoder.read_image()?;

    if let tiff::decoder::DecodingResult::U8(data) = image {
        let mut r_vals = HashMap::new();
        let mut g_vals = HashMap::new();
        let mut b_vals = HashMap::new();

        let mut r_min = u8::MAX;
        let mut r_max = u8::MIN;
        let mut g_min = u8::MAX;
        let mut g_max = u8::MIN;
        let mut b_min = u8::MAX;
        let mut b_max = u8::MIN;

        let mut valid = 0u64;
        let mut invalid = 0u64;

        // Sample every pixel
        for chunk in data.chunks(4) {
            if chunk.len() == 4 {
                let r = chunk[0];
                let g = chunk[1];
                let b = chunk[2];
                let a = chunk[3];

                *r_vals.entry(r).or_insert(0) += 1;
                *g_vals.entry(g).or_insert(0) += 1;
                *b_vals.entry(b).or_insert(0) += 1;

                r_min = r_min.min(r);
                r_max = r_max.max(r);
                g_min = g_min.min(g);
                g_max = g_max.max(g);
                b_min = b_min.min(b);
                b_max = b_max.max(b);

                if a == 255 {
                    valid += 1;
                } else {
                    invalid += 1;
                }
            }
        }

        println!("\nRed channel:");
        println!("  Range: {} - {} (span: {})", r_min, r_max, r_max - r_min);
        println!("  Unique values: {}", r_vals.len());

        println!("\nGreen channel:");
        println!("  Range: {} - {} (span: {})", g_min, g_max, g_max - g_min);
        println!("  Unique values: {}", g_vals.len());

        println!("\nBlue channel:");
        println!("  Range: {} - {} (span: {})", b_min, b_max, b_max - b_min);
        println!("  Unique values: {}", b_vals.len());

        // Check how many values are at max (clipped)
        let r_clipped = r_vals.get(&255).unwrap_or(&0);
        let g_clipped = g_vals.get(&255).unwrap_or(&0);
        let b_clipped = b_vals.get(&255).unwrap_or(&0);

        let total_pixels = width as u64 * height as u64;
        println!("\nClipping at maximum (255):");
        println!("  Red: {} pixels ({:.2}%)", r_clipped, *r_clipped as f64 / total_pixels as f64 * 100.0);
        println!("  Green: {} pixels ({:.2}%)", g_clipped, *g_clipped as f64 / total_pixels as f64 * 100.0);
        println!("  Blue: {} pixels ({:.2}%)", b_clipped, *b_clipped as f64 / total_pixels as f64 * 100.0);

        println!("\nValidity mask:");
        println!("  Valid: {} pixels ({:.2}%)", valid, valid as f64 / total_pixels as f64 * 100.0);
        println!("  Nodata: {} pixels ({:.2}%)", invalid, invalid as f64 / total_pixels as f64 * 100.0);
    } else {
        println!("Not an 8-bit image!");
    }

    Ok(())
}
