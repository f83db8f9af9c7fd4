//! Raster input/output module
//!
//! This module provides GeoTIFF reading and writing behind reader/writer
//! traits, along with the shared raster profile types.

mod geotiff_reader;
mod geotiff_writer;
mod reader;
mod writer;
pub mod geotags;
pub mod types;

pub use geotiff_reader::GeoTiffReader;
pub use geotiff_writer::{GeoTiffWriter, OutputCompression};
pub use reader::RasterReader;
pub use types::{RasterProfile, SampleFormat};
pub use writer::RasterWriter;
