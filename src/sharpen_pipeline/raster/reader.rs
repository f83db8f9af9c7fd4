use ndarray::{Array2, Array3};

use crate::sharpen_pipeline::common::error::Result;
use crate::sharpen_pipeline::geo::PixelWindow;
use crate::sharpen_pipeline::raster::types::RasterProfile;

pub trait RasterReader {
    fn profile(&self) -> &RasterProfile;
    fn read_band(&self, band: usize, window: &PixelWindow) -> Result<Array2<f32>>;
    fn read_boundless(&self, window: &PixelWindow, fill: f32) -> Result<Array3<f32>>;
}
