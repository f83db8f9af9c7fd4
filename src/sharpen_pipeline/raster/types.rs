//! Raster metadata types shared by readers and writers

use crate::sharpen_pipeline::geo::GeoTransform;

/// Sample format of a raster band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 8-bit unsigned samples
    U8,
    /// 16-bit unsigned samples
    U16,
}

impl SampleFormat {
    /// Largest representable sample value, as f32 working precision
    pub fn max_value(&self) -> f32 {
        match self {
            SampleFormat::U8 => u8::MAX as f32,
            SampleFormat::U16 => u16::MAX as f32,
        }
    }
}

/// Structural and georeferencing metadata of a raster
#[derive(Debug, Clone, PartialEq)]
pub struct RasterProfile {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Number of bands
    pub count: usize,
    /// Sample format of every band
    pub dtype: SampleFormat,
    /// EPSG code of the coordinate reference system, when known
    pub crs: Option<u32>,
    /// Pixel-to-ground affine transform
    pub transform: GeoTransform,
}

impl RasterProfile {
    pub fn new(
        width: usize,
        height: usize,
        count: usize,
        dtype: SampleFormat,
        crs: Option<u32>,
        transform: GeoTransform,
    ) -> Self {
        Self {
            width,
            height,
            count,
            dtype,
            crs,
            transform,
        }
    }
}
