use std::io::Write;
use std::path::Path;
use tracing::{debug, info, instrument};

use ndarray::{s, Array3};
use rayon::prelude::*;

use crate::sharpen_pipeline::{
    common::error::{PansharpenError, Result},
    fusion::{sharpen_tile, SharpenConfig},
    geo::tile_windows,
    raster::{GeoTiffReader, GeoTiffWriter, RasterProfile, RasterReader, RasterWriter, SampleFormat},
};

/// Expected band count of the color raster; the output appends a mask band
/// on top, giving RGBA.
const COLOR_BAND_COUNT: usize = 3;

pub struct PansharpenRunner<W: RasterWriter> {
    writer: W,
    config: SharpenConfig,
}

impl PansharpenRunner<GeoTiffWriter> {
    pub fn new(config: SharpenConfig) -> Self {
        Self {
            writer: GeoTiffWriter::new(),
            config,
        }
    }
}

impl<W: RasterWriter> PansharpenRunner<W> {
    pub fn with_custom(writer: W, config: SharpenConfig) -> Self {
        Self { writer, config }
    }

    /// Validates the raster pair and configuration once, before any tile
    /// work, and derives the output profile from the panchromatic raster.
    fn preflight(&self, pan: &RasterProfile, color: &RasterProfile) -> Result<RasterProfile> {
        if pan.count != 1 {
            return Err(PansharpenError::PanBandCount(pan.count));
        }
        if color.count != COLOR_BAND_COUNT {
            return Err(PansharpenError::ColorBandCount(color.count));
        }
        if pan.width <= color.width || pan.height <= color.height {
            return Err(PansharpenError::PanNotLarger {
                pan_width: pan.width,
                pan_height: pan.height,
                color_width: color.width,
                color_height: color.height,
            });
        }
        if pan.crs != color.crs {
            return Err(PansharpenError::CrsMismatch {
                pan: pan.crs,
                color: color.crs,
            });
        }
        if !self.config.weight.is_finite() || self.config.weight <= 0.0 {
            return Err(PansharpenError::InvalidWeight(self.config.weight));
        }
        let scale = f64::from(pan.dtype.max_value()) / f64::from(SampleFormat::U8.max_value());
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PansharpenError::InvalidScale(scale));
        }
        if self.config.tile_size == 0 {
            return Err(PansharpenError::InvalidTileSize);
        }

        Ok(RasterProfile::new(
            pan.width,
            pan.height,
            COLOR_BAND_COUNT + 1,
            SampleFormat::U8,
            pan.crs,
            pan.transform,
        ))
    }

    #[instrument(skip(self, pan, color, output))]
    pub fn sharpen<R: RasterReader + Sync>(
        &self,
        pan: &R,
        color: &R,
        output: &mut dyn Write,
    ) -> Result<()> {
        info!("Starting pansharpening run");

        let out_profile = {
            let _span = tracing::info_span!("preflight").entered();
            self.preflight(pan.profile(), color.profile())?
        };

        let windows = tile_windows(out_profile.width, out_profile.height, self.config.tile_size);
        debug!(
            tiles = windows.len(),
            tile_size = self.config.tile_size,
            "Tiling the pan extent"
        );

        let tiles = {
            let _span = tracing::info_span!("sharpen_tiles", jobs = self.config.jobs).entered();
            let config = self.config.clone();
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.jobs)
                .build()
                .map_err(|e| PansharpenError::WorkerPool(e.to_string()))?;
            pool.install(|| {
                windows
                    .par_iter()
                    .map(|window| {
                        sharpen_tile(pan, color, window, &config).map(|tile| (*window, tile))
                    })
                    .collect::<Result<Vec<_>>>()
            })?
        };

        // Tiles are disjoint and cover the extent, so plain slice writes
        // reassemble the mosaic
        let mut mosaic =
            Array3::<u8>::zeros((out_profile.count, out_profile.height, out_profile.width));
        for (window, tile) in tiles {
            let r0 = window.row_off as usize;
            let c0 = window.col_off as usize;
            mosaic
                .slice_mut(s![.., r0..r0 + window.height, c0..c0 + window.width])
                .assign(&tile);
        }

        {
            let _span = tracing::info_span!("write_output").entered();
            self.writer.write_raster(&mosaic, &out_profile, output)?;
        }

        info!(
            width = out_profile.width,
            height = out_profile.height,
            bands = out_profile.count,
            "Pansharpening complete"
        );
        Ok(())
    }

    #[instrument(skip(self, pan_path, color_path, output_path))]
    pub fn sharpen_files<P: AsRef<Path>, Q: AsRef<Path>, S: AsRef<Path>>(
        &self,
        pan_path: P,
        color_path: Q,
        output_path: S,
    ) -> Result<()> {
        let pan_path = pan_path.as_ref();
        let color_path = color_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            pan = %pan_path.display(),
            color = %color_path.display(),
            output = %output_path.display(),
            "Sharpening files"
        );

        let (pan, color) = {
            let _span = tracing::info_span!("open_input_files").entered();
            (
                GeoTiffReader::open(pan_path)?,
                GeoTiffReader::open(color_path)?,
            )
        };

        let mut output_file = {
            let _span = tracing::info_span!("create_output_file").entered();
            std::fs::File::create(output_path).map_err(|e| {
                PansharpenError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?
        };

        self.sharpen(&pan, &color, &mut output_file)?;

        Ok(())
    }

    pub fn config(&self) -> &SharpenConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SharpenConfig) {
        self.config = config;
    }
}
