//! Pansharpening configuration types

/// Resampling method used to bring the color bands onto the pan grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampling {
    /// Nearest-neighbor sampling (fastest)
    Nearest,
    /// Bilinear interpolation (default, fewer tile-seam artifacts)
    Bilinear,
}

/// Configuration for a pansharpening run
#[derive(Debug, Clone)]
pub struct SharpenConfig {
    /// Weight of the last color band in the brightness denominator.
    /// 1.0 weighs all bands equally.
    pub weight: f32,
    /// Resampling method for the color bands
    pub resampling: Resampling,
    /// Margin in color-raster pixels added around each resolved color
    /// window, supplying resampling context at tile boundaries
    pub padding: usize,
    /// Fill value for boundless reads and out-of-extent resampling
    pub fill: f32,
    /// Edge length of the square tiles covering the pan raster
    pub tile_size: usize,
    /// Worker threads; 0 picks one per available core
    pub jobs: usize,
    /// Whether to log per-tile buffer shapes
    pub verbose: bool,
}

impl Default for SharpenConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            resampling: Resampling::Bilinear,
            padding: 2,
            fill: 0.0,
            tile_size: 512,
            jobs: 1,
            verbose: false,
        }
    }
}

impl SharpenConfig {
    pub fn builder() -> SharpenConfigBuilder {
        SharpenConfigBuilder::default()
    }
}

/// Builder for SharpenConfig
#[derive(Default)]
pub struct SharpenConfigBuilder {
    weight: Option<f32>,
    resampling: Option<Resampling>,
    padding: Option<usize>,
    fill: Option<f32>,
    tile_size: Option<usize>,
    jobs: Option<usize>,
    verbose: Option<bool>,
}

impl SharpenConfigBuilder {
    pub fn weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn resampling(mut self, resampling: Resampling) -> Self {
        self.resampling = Some(resampling);
        self
    }

    pub fn padding(mut self, padding: usize) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn fill(mut self, fill: f32) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = Some(tile_size);
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn build(self) -> SharpenConfig {
        let default = SharpenConfig::default();
        SharpenConfig {
            weight: self.weight.unwrap_or(default.weight),
            resampling: self.resampling.unwrap_or(default.resampling),
            padding: self.padding.unwrap_or(default.padding),
            fill: self.fill.unwrap_or(default.fill),
            tile_size: self.tile_size.unwrap_or(default.tile_size),
            jobs: self.jobs.unwrap_or(default.jobs),
            verbose: self.verbose.unwrap_or(default.verbose),
        }
    }
}
