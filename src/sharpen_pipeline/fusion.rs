//! Tile fusion module
//!
//! This module holds the per-tile compute stages: geometry-driven
//! resampling, nodata clamping, Brovey band-ratio fusion, and output
//! encoding, plus the worker that chains them for one tile.

mod brovey;
mod encode;
mod mask;
mod resample;
mod worker;
pub mod types;

pub use brovey::brovey;
pub use encode::{encode_output, ALPHA_INVALID, ALPHA_VALID};
pub use mask::{clamp_nodata, NODATA};
pub use resample::resample;
pub use types::{Resampling, SharpenConfig, SharpenConfigBuilder};
pub use worker::sharpen_tile;
