//! Georeferencing primitives: affine transforms, pixel windows, tiling

pub mod types;
pub mod windows;

pub use types::{GeoTransform, GroundBounds, PixelWindow};
pub use windows::{resolve_color_window, tile_windows, window_bounds, window_from_bounds};
