//! Pansharpening pipeline module
//!
//! This module fuses a high-resolution panchromatic raster with a
//! lower-resolution color raster, tile by tile, with separate modules for
//! geometry, raster I/O, the per-tile fusion kernel, and run orchestration.

pub mod common;
pub mod fusion;
pub mod geo;
pub mod jobs;
pub mod raster;

#[cfg(test)]
mod tests;

pub use common::{PansharpenError, Result};

pub use geo::{GeoTransform, GroundBounds, PixelWindow};

pub use raster::{
    GeoTiffReader, GeoTiffWriter, OutputCompression, RasterProfile, RasterReader, RasterWriter,
    SampleFormat,
};

pub use fusion::{sharpen_tile, Resampling, SharpenConfig, SharpenConfigBuilder};

pub use jobs::PansharpenRunner;
