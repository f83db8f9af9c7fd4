//! GeoTIFF reader implementation using the tiff decoder.
//!
//! The full raster is decoded into a band-major f32 array at open, so window
//! reads during tiling are plain array slicing. Georeferencing comes from the
//! ModelPixelScale/ModelTiepoint tag pair, falling back to the
//! ModelTransformation matrix, and the CRS from the GeoKeyDirectory.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use ndarray::{s, Array2, Array3};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::debug;

use crate::sharpen_pipeline::common::error::{PansharpenError, Result};
use crate::sharpen_pipeline::geo::{GeoTransform, PixelWindow};
use crate::sharpen_pipeline::raster::geotags::{
    GEOGRAPHIC_TYPE_GEO_KEY, GEO_KEY_DIRECTORY, MODEL_PIXEL_SCALE, MODEL_TIEPOINT,
    MODEL_TRANSFORMATION, PROJECTED_CS_TYPE_GEO_KEY,
};
use crate::sharpen_pipeline::raster::reader::RasterReader;
use crate::sharpen_pipeline::raster::types::{RasterProfile, SampleFormat};

/// In-memory GeoTIFF raster with band-major sample storage.
pub struct GeoTiffReader {
    profile: RasterProfile,
    /// Samples in (band, row, col) order
    data: Array3<f32>,
}

impl GeoTiffReader {
    /// Opens and fully decodes a GeoTIFF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            PansharpenError::InputReadError(format!("{}: {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Decodes a GeoTIFF from a byte buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(Cursor::new(bytes))
            .map_err(|e| PansharpenError::DecodeError(e.to_string()))?
            .with_limits(Limits::unlimited());

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| PansharpenError::DecodeError(e.to_string()))?;
        let (width, height) = (width as usize, height as usize);

        let (count, dtype) = match decoder
            .colortype()
            .map_err(|e| PansharpenError::DecodeError(e.to_string()))?
        {
            ColorType::Gray(8) => (1, SampleFormat::U8),
            ColorType::Gray(16) => (1, SampleFormat::U16),
            ColorType::RGB(8) => (3, SampleFormat::U8),
            ColorType::RGB(16) => (3, SampleFormat::U16),
            ColorType::RGBA(8) => (4, SampleFormat::U8),
            ColorType::RGBA(16) => (4, SampleFormat::U16),
            other => {
                return Err(PansharpenError::UnsupportedFormat(format!(
                    "color type {other:?}"
                )))
            }
        };

        let transform = read_geo_transform(&mut decoder)?;
        let crs = read_epsg(&mut decoder);

        debug!(
            width,
            height,
            bands = count,
            crs = ?crs,
            "Decoding GeoTIFF raster"
        );

        let samples: Vec<f32> = match decoder
            .read_image()
            .map_err(|e| PansharpenError::DecodeError(e.to_string()))?
        {
            DecodingResult::U8(buf) => buf.iter().map(|&v| v as f32).collect(),
            DecodingResult::U16(buf) => buf.iter().map(|&v| v as f32).collect(),
            _ => {
                return Err(PansharpenError::UnsupportedFormat(
                    "sample buffer is not 8 or 16 bit unsigned".to_string(),
                ))
            }
        };

        let expected = width * height * count;
        if samples.len() != expected {
            return Err(PansharpenError::DecodeError(format!(
                "sample count mismatch: got {}, expected {} for {} band(s) of {}x{}",
                samples.len(),
                expected,
                count,
                width,
                height
            )));
        }

        // Pixel-interleaved strips to band-major planes
        let mut data = Array3::<f32>::zeros((count, height, width));
        for row in 0..height {
            for col in 0..width {
                let base = (row * width + col) * count;
                for band in 0..count {
                    data[[band, row, col]] = samples[base + band];
                }
            }
        }

        let profile = RasterProfile::new(width, height, count, dtype, crs, transform);
        Ok(Self { profile, data })
    }

    /// Wraps an already-decoded band-major array, for in-memory pipelines.
    pub fn from_array(profile: RasterProfile, data: Array3<f32>) -> Result<Self> {
        let shape = data.dim();
        if shape != (profile.count, profile.height, profile.width) {
            return Err(PansharpenError::DecodeError(format!(
                "array shape {:?} does not match profile {}x{}x{}",
                shape, profile.count, profile.height, profile.width
            )));
        }
        Ok(Self { profile, data })
    }
}

impl RasterReader for GeoTiffReader {
    fn profile(&self) -> &RasterProfile {
        &self.profile
    }

    fn read_band(&self, band: usize, window: &PixelWindow) -> Result<Array2<f32>> {
        let p = &self.profile;
        if band >= p.count {
            return Err(PansharpenError::InputReadError(format!(
                "band index {} out of range for {} band(s)",
                band, p.count
            )));
        }
        if window.col_off < 0
            || window.row_off < 0
            || window.col_off as usize + window.width > p.width
            || window.row_off as usize + window.height > p.height
        {
            return Err(PansharpenError::WindowOutOfBounds {
                col_off: window.col_off,
                row_off: window.row_off,
                width: window.width,
                height: window.height,
                raster_width: p.width,
                raster_height: p.height,
            });
        }

        let r0 = window.row_off as usize;
        let c0 = window.col_off as usize;
        Ok(self
            .data
            .slice(s![band, r0..r0 + window.height, c0..c0 + window.width])
            .to_owned())
    }

    fn read_boundless(&self, window: &PixelWindow, fill: f32) -> Result<Array3<f32>> {
        let p = &self.profile;
        let mut out = Array3::from_elem((p.count, window.height, window.width), fill);

        // Pixel range where the window overlaps the raster extent
        let src_c0 = window.col_off.max(0);
        let src_r0 = window.row_off.max(0);
        let src_c1 = (window.col_off + window.width as i64).min(p.width as i64);
        let src_r1 = (window.row_off + window.height as i64).min(p.height as i64);

        if src_c1 > src_c0 && src_r1 > src_r0 {
            let w = (src_c1 - src_c0) as usize;
            let h = (src_r1 - src_r0) as usize;
            let dst_c0 = (src_c0 - window.col_off) as usize;
            let dst_r0 = (src_r0 - window.row_off) as usize;
            let (sc0, sr0) = (src_c0 as usize, src_r0 as usize);

            out.slice_mut(s![.., dst_r0..dst_r0 + h, dst_c0..dst_c0 + w])
                .assign(&self.data.slice(s![.., sr0..sr0 + h, sc0..sc0 + w]));
        }

        Ok(out)
    }
}

/// Builds the pixel-to-ground transform from GeoTIFF tags.
///
/// Rasters with no georeferencing tags get the identity transform, matching
/// common GIS reader behavior for plain TIFFs.
fn read_geo_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    let scale = find_f64_vec(decoder, MODEL_PIXEL_SCALE)?;
    let tiepoint = find_f64_vec(decoder, MODEL_TIEPOINT)?;

    if let (Some(scale), Some(tie)) = (&scale, &tiepoint) {
        if scale.len() >= 2 && tie.len() >= 6 {
            // Tiepoint anchors pixel (tie[0], tie[1]) at ground (tie[3], tie[4])
            let west = tie[3] - tie[0] * scale[0];
            let north = tie[4] + tie[1] * scale[1];
            return Ok(GeoTransform::from_origin(west, north, scale[0], scale[1]));
        }
    }

    if let Some(m) = find_f64_vec(decoder, MODEL_TRANSFORMATION)? {
        // Row-major 4x4 matrix; the affine part lives in rows 0 and 1
        if m.len() >= 8 {
            return Ok(GeoTransform::new(m[0], m[1], m[3], m[4], m[5], m[7]));
        }
    }

    debug!("No georeferencing tags found, using identity transform");
    Ok(GeoTransform::identity())
}

/// Extracts the EPSG code from the GeoKeyDirectory, preferring a projected
/// CRS key over a geographic one.
fn read_epsg<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<u32> {
    let dir = match decoder.find_tag(Tag::Unknown(GEO_KEY_DIRECTORY)) {
        Ok(Some(value)) => value.into_u32_vec().ok()?,
        _ => return None,
    };

    let mut projected = None;
    let mut geographic = None;
    // Header is [version, revision, minor, key count]; keys follow as
    // [key id, tag location, count, value] quads
    for entry in dir.get(4..)?.chunks_exact(4) {
        if entry[1] != 0 {
            continue;
        }
        match entry[0] as u16 {
            PROJECTED_CS_TYPE_GEO_KEY => projected = Some(entry[3]),
            GEOGRAPHIC_TYPE_GEO_KEY => geographic = Some(entry[3]),
            _ => {}
        }
    }
    projected.or(geographic)
}

fn find_f64_vec<R: Read + Seek>(decoder: &mut Decoder<R>, tag: u16) -> Result<Option<Vec<f64>>> {
    match decoder.find_tag(Tag::Unknown(tag)) {
        Ok(Some(value)) => {
            let values = value
                .into_f64_vec()
                .map_err(|e| PansharpenError::DecodeError(e.to_string()))?;
            Ok(Some(values))
        }
        Ok(None) => Ok(None),
        Err(e) => Err(PansharpenError::DecodeError(e.to_string())),
    }
}
