//! Geometry types shared across the pipeline

use crate::sharpen_pipeline::common::error::{PansharpenError, Result};

/// Six-coefficient affine transform mapping pixel coordinates to ground
/// coordinates: `x = a*col + b*row + c`, `y = d*col + e*row + f`
///
/// Coefficients follow the rasterio/GDAL row-major convention. For a
/// north-up raster `a` is the pixel width, `e` the negative pixel height,
/// and `(c, f)` the ground coordinate of the upper-left raster corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform from an upper-left ground corner and pixel sizes.
    pub fn from_origin(west: f64, north: f64, xres: f64, yres: f64) -> Self {
        Self::new(xres, 0.0, west, 0.0, -yres, north)
    }

    /// Identity transform, where pixel and ground coordinates coincide.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    /// Apply the transform to a coordinate pair.
    ///
    /// For a forward transform the pair is fractional (col, row) and the
    /// result is ground (x, y); for an inverted transform the roles swap.
    pub fn apply(&self, u: f64, v: f64) -> (f64, f64) {
        (
            self.a * u + self.b * v + self.c,
            self.d * u + self.e * v + self.f,
        )
    }

    /// Invert the affine, failing on a degenerate (zero-determinant) matrix.
    pub fn invert(&self) -> Result<GeoTransform> {
        let det = self.a * self.e - self.b * self.d;
        if det == 0.0 || !det.is_finite() {
            return Err(PansharpenError::NonInvertibleTransform);
        }
        Ok(GeoTransform {
            a: self.e / det,
            b: -self.b / det,
            c: (self.b * self.f - self.e * self.c) / det,
            d: -self.d / det,
            e: self.a / det,
            f: (self.d * self.c - self.a * self.f) / det,
        })
    }

    /// Transform for a window of the raster this transform belongs to:
    /// same scale and rotation, origin shifted to the window's upper-left
    /// corner. Negative offsets (padded windows) shift the origin outward.
    pub fn window(&self, window: &PixelWindow) -> GeoTransform {
        let (c, f) = self.apply(window.col_off as f64, window.row_off as f64);
        GeoTransform { c, f, ..*self }
    }
}

/// Rectangular pixel-space region of a raster.
///
/// Offsets are signed: padding a window at the raster edge produces negative
/// offsets, which boundless reads fill rather than clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col_off: i64,
    pub row_off: i64,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    pub fn new(col_off: i64, row_off: i64, width: usize, height: usize) -> Self {
        Self {
            col_off,
            row_off,
            width,
            height,
        }
    }

    /// Grow the window by `margin` pixels on every side.
    pub fn pad(&self, margin: usize) -> PixelWindow {
        PixelWindow {
            col_off: self.col_off - margin as i64,
            row_off: self.row_off - margin as i64,
            width: self.width + 2 * margin,
            height: self.height + 2 * margin,
        }
    }

    /// (rows, cols) shape of the window.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Ground-space bounding box in coordinate reference system units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundBounds {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl GroundBounds {
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }
}
