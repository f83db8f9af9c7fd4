use std::io::Write;

use ndarray::Array3;

use crate::sharpen_pipeline::common::error::Result;
use crate::sharpen_pipeline::raster::types::RasterProfile;

pub trait RasterWriter {
    fn write_raster(
        &self,
        bands: &Array3<u8>,
        profile: &RasterProfile,
        output: &mut dyn Write,
    ) -> Result<()>;
}
