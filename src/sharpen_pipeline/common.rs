//! Common utilities module
//!
//! This module contains shared types used across the sharpening pipeline.

pub mod error;

pub use error::{PansharpenError, Result};
