//! Window geometry: translating tiles between raster grids
//!
//! A tile of the panchromatic raster is located in the color raster by going
//! through ground space: window -> ground bounds via the pan transform, then
//! ground bounds -> window via the inverted color transform. The resulting
//! window snaps outward so it fully covers the bounds, and is padded before
//! reading to give the resampler context at tile edges.

use crate::sharpen_pipeline::common::error::Result;
use crate::sharpen_pipeline::geo::types::{GeoTransform, GroundBounds, PixelWindow};

/// Ground-space bounding box of a pixel window under a raster's transform.
///
/// Corner-based: the box spans from the outer corner of the first pixel to
/// the outer corner of the last, matching the window's full footprint.
pub fn window_bounds(window: &PixelWindow, transform: &GeoTransform) -> GroundBounds {
    let c0 = window.col_off as f64;
    let r0 = window.row_off as f64;
    let c1 = c0 + window.width as f64;
    let r1 = r0 + window.height as f64;

    let corners = [
        transform.apply(c0, r0),
        transform.apply(c1, r0),
        transform.apply(c0, r1),
        transform.apply(c1, r1),
    ];

    let mut bounds = GroundBounds::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for (x, y) in corners {
        bounds.minx = bounds.minx.min(x);
        bounds.miny = bounds.miny.min(y);
        bounds.maxx = bounds.maxx.max(x);
        bounds.maxy = bounds.maxy.max(y);
    }
    bounds
}

/// Smallest pixel window of a raster grid covering the given ground bounds.
///
/// The near corner floors and the far corner ceils, so a window produced by
/// [`window_bounds`] on an aligned grid round-trips exactly.
pub fn window_from_bounds(bounds: &GroundBounds, transform: &GeoTransform) -> Result<PixelWindow> {
    let inv = transform.invert()?;

    let corners = [
        inv.apply(bounds.minx, bounds.miny),
        inv.apply(bounds.maxx, bounds.miny),
        inv.apply(bounds.minx, bounds.maxy),
        inv.apply(bounds.maxx, bounds.maxy),
    ];

    let mut min_col = f64::MAX;
    let mut min_row = f64::MAX;
    let mut max_col = f64::MIN;
    let mut max_row = f64::MIN;
    for (col, row) in corners {
        min_col = min_col.min(col);
        min_row = min_row.min(row);
        max_col = max_col.max(col);
        max_row = max_row.max(row);
    }

    let col_off = min_col.floor() as i64;
    let row_off = min_row.floor() as i64;
    let width = (max_col.ceil() as i64 - col_off).max(0) as usize;
    let height = (max_row.ceil() as i64 - row_off).max(0) as usize;

    Ok(PixelWindow::new(col_off, row_off, width, height))
}

/// Locate the padded color-raster window matching a panchromatic tile.
///
/// Returns the window together with its origin-shifted transform, ready for
/// a boundless read.
pub fn resolve_color_window(
    pan_window: &PixelWindow,
    pan_transform: &GeoTransform,
    color_transform: &GeoTransform,
    padding: usize,
) -> Result<(PixelWindow, GeoTransform)> {
    let bounds = window_bounds(pan_window, pan_transform);
    let base = window_from_bounds(&bounds, color_transform)?;
    let padded = base.pad(padding);
    let transform = color_transform.window(&padded);
    Ok((padded, transform))
}

/// Disjoint tile grid covering a raster extent, row-major.
///
/// Right and bottom edge tiles shrink to the remainder instead of running
/// past the extent.
pub fn tile_windows(width: usize, height: usize, tile_size: usize) -> Vec<PixelWindow> {
    let mut windows = Vec::new();
    let mut row = 0;
    while row < height {
        let h = tile_size.min(height - row);
        let mut col = 0;
        while col < width {
            let w = tile_size.min(width - col);
            windows.push(PixelWindow::new(col as i64, row as i64, w, h));
            col += tile_size;
        }
        row += tile_size;
    }
    windows
}
