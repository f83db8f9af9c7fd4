//! Run orchestration module
//!
//! This module contains the runner that validates inputs, fans tiles out
//! across a worker pool, and writes the assembled output.

mod runner;

pub use runner::PansharpenRunner;
