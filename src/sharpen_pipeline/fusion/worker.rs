//! Per-tile pansharpening kernel.
//!
//! Chains the stages for one pan-raster tile: resolve the matching padded
//! color window, read it boundlessly, resample onto the pan grid, clamp
//! nodata, fuse, and encode. Stateless per tile, so any number of workers
//! may run it concurrently on disjoint tiles.

use ndarray::Array3;
use tracing::debug;

use crate::sharpen_pipeline::common::error::Result;
use crate::sharpen_pipeline::fusion::brovey::brovey;
use crate::sharpen_pipeline::fusion::encode::encode_output;
use crate::sharpen_pipeline::fusion::mask::clamp_nodata;
use crate::sharpen_pipeline::fusion::resample::resample;
use crate::sharpen_pipeline::fusion::types::SharpenConfig;
use crate::sharpen_pipeline::geo::{resolve_color_window, PixelWindow};
use crate::sharpen_pipeline::raster::{RasterReader, SampleFormat};

/// Produces the fused (N+1)-band u8 tile for one pan-raster window.
pub fn sharpen_tile<R: RasterReader>(
    pan: &R,
    color: &R,
    window: &PixelWindow,
    config: &SharpenConfig,
) -> Result<Array3<u8>> {
    let pan_tile = pan.read_band(0, window)?;
    let pan_transform = pan.profile().transform.window(window);

    let (color_window, color_transform) = resolve_color_window(
        window,
        &pan.profile().transform,
        &color.profile().transform,
        config.padding,
    )?;
    let color_tile = color.read_boundless(&color_window, config.fill)?;

    if config.verbose {
        debug!(
            pan_shape = ?pan_tile.dim(),
            color_shape = ?color_tile.dim(),
            "Processing tile"
        );
    }

    let resampled = resample(
        &color_tile,
        &color_transform,
        window.shape(),
        &pan_transform,
        config.resampling,
        config.fill,
    )?;
    let clamped = clamp_nodata(resampled);

    let intermediate_max = pan.profile().dtype.max_value();
    let fused = brovey(&clamped, &pan_tile, config.weight, intermediate_max);

    let scale = intermediate_max / SampleFormat::U8.max_value();
    Ok(encode_output(&fused, scale))
}
