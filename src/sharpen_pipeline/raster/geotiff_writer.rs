//! GeoTIFF writer implementation using the tiff encoder.
//!
//! Output is pixel-interleaved, deflate-compressed by default, organized in
//! 512-row strips. Georeferencing is written as ModelPixelScale/ModelTiepoint
//! for north-up transforms (ModelTransformation otherwise) plus a
//! GeoKeyDirectory carrying the EPSG code.

use std::io::{Cursor, Seek, Write};

use ndarray::Array3;
use tiff::encoder::{colortype, DirectoryEncoder, TiffEncoder, TiffKind};
use tiff::tags::Tag;
use tracing::debug;

use crate::sharpen_pipeline::common::error::{PansharpenError, Result};
use crate::sharpen_pipeline::geo::GeoTransform;
use crate::sharpen_pipeline::raster::geotags::{
    GEOGRAPHIC_TYPE_GEO_KEY, GEO_KEY_DIRECTORY, GT_MODEL_TYPE_GEO_KEY, GT_RASTER_TYPE_GEO_KEY,
    MODEL_PIXEL_SCALE, MODEL_TIEPOINT, MODEL_TRANSFORMATION, MODEL_TYPE_GEOGRAPHIC,
    MODEL_TYPE_PROJECTED, PROJECTED_CS_TYPE_GEO_KEY, RASTER_PIXEL_IS_AREA,
};
use crate::sharpen_pipeline::raster::types::{RasterProfile, SampleFormat};
use crate::sharpen_pipeline::raster::writer::RasterWriter;

/// Strip height of the encoded output
const ROWS_PER_STRIP: u32 = 512;

/// Compression applied to output strips
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression (default)
    #[default]
    Deflate,
}

/// Writer producing strip-organized GeoTIFF output.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTiffWriter {
    compression: OutputCompression,
}

impl GeoTiffWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(compression: OutputCompression) -> Self {
        Self { compression }
    }
}

impl RasterWriter for GeoTiffWriter {
    fn write_raster(
        &self,
        bands: &Array3<u8>,
        profile: &RasterProfile,
        output: &mut dyn Write,
    ) -> Result<()> {
        let (count, height, width) = bands.dim();
        debug!(width, height, bands = count, "Encoding GeoTIFF output");

        if (count, height, width) != (profile.count, profile.height, profile.width) {
            return Err(PansharpenError::EncodeError(format!(
                "band array shape ({count}, {height}, {width}) does not match profile {}x{}x{}",
                profile.count, profile.height, profile.width
            )));
        }
        if profile.dtype != SampleFormat::U8 {
            return Err(PansharpenError::EncodeError(
                "only 8-bit output is supported".to_string(),
            ));
        }

        // Band-major planes to pixel-interleaved strips
        let mut interleaved = Vec::with_capacity(count * height * width);
        for row in 0..height {
            for col in 0..width {
                for band in 0..count {
                    interleaved.push(bands[[band, row, col]]);
                }
            }
        }

        let compression = match self.compression {
            OutputCompression::None => tiff::encoder::Compression::Uncompressed,
            OutputCompression::Lzw => tiff::encoder::Compression::Lzw,
            OutputCompression::Deflate => tiff::encoder::Compression::Deflate(
                tiff::encoder::compression::DeflateLevel::Balanced,
            ),
        };

        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| PansharpenError::EncodeError(e.to_string()))?
            .with_compression(compression);

        match count {
            1 => encode_strips::<colortype::Gray8, _>(&mut encoder, profile, &interleaved)?,
            3 => encode_strips::<colortype::RGB8, _>(&mut encoder, profile, &interleaved)?,
            4 => encode_strips::<colortype::RGBA8, _>(&mut encoder, profile, &interleaved)?,
            _ => {
                return Err(PansharpenError::EncodeError(format!(
                    "unsupported band count {count}"
                )))
            }
        }

        output.write_all(&buffer)?;

        debug!("GeoTIFF encoding complete");
        Ok(())
    }
}

fn encode_strips<C, W>(
    encoder: &mut TiffEncoder<W>,
    profile: &RasterProfile,
    samples: &[u8],
) -> Result<()>
where
    C: colortype::ColorType<Inner = u8>,
    W: Write + Seek,
{
    let width = profile.width as u32;
    let height = profile.height as u32;

    let mut image = encoder
        .new_image::<C>(width, height)
        .map_err(|e| PansharpenError::EncodeError(e.to_string()))?;

    write_geo_tags(image.encoder(), profile)?;

    image
        .rows_per_strip(ROWS_PER_STRIP)
        .map_err(|e| PansharpenError::EncodeError(e.to_string()))?;

    // write_data is the only path through which the encoder's configured
    // compression is applied; it strips the data at rows_per_strip and
    // finishes the directory.
    image
        .write_data(samples)
        .map_err(|e| PansharpenError::EncodeError(e.to_string()))?;
    Ok(())
}

fn write_geo_tags<W: Write + Seek, K: TiffKind>(
    dir: &mut DirectoryEncoder<W, K>,
    profile: &RasterProfile,
) -> Result<()> {
    let t = &profile.transform;

    // An identity transform means no georeferencing is known; write a plain TIFF.
    if *t != GeoTransform::identity() {
        if t.b == 0.0 && t.d == 0.0 {
            let pixel_scale = [t.a, -t.e, 0.0];
            dir.write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), pixel_scale.as_slice())
                .map_err(|e| PansharpenError::EncodeError(e.to_string()))?;

            // Ties pixel (0, 0) to the upper-left ground corner
            let tiepoint = [0.0, 0.0, 0.0, t.c, t.f, 0.0];
            dir.write_tag(Tag::Unknown(MODEL_TIEPOINT), tiepoint.as_slice())
                .map_err(|e| PansharpenError::EncodeError(e.to_string()))?;
        } else {
            // Rotated transform needs the full row-major 4x4 matrix
            let matrix = [
                t.a, t.b, 0.0, t.c, //
                t.d, t.e, 0.0, t.f, //
                0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ];
            dir.write_tag(Tag::Unknown(MODEL_TRANSFORMATION), matrix.as_slice())
                .map_err(|e| PansharpenError::EncodeError(e.to_string()))?;
        }
    }

    if let Some(epsg) = profile.crs {
        let geokeys = build_geokey_directory(epsg);
        dir.write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), geokeys.as_slice())
            .map_err(|e| PansharpenError::EncodeError(e.to_string()))?;
    }

    Ok(())
}

/// EPSG reserves the 4xxx block for geographic coordinate systems.
fn is_geographic(epsg: u32) -> bool {
    (4000..5000).contains(&epsg)
}

fn build_geokey_directory(epsg: u32) -> Vec<u16> {
    // [KeyDirectoryVersion, KeyRevision, MinorRevision, NumberOfKeys,
    //  KeyID, TIFFTagLocation, Count, Value, ...]
    let mut keys = vec![1, 1, 0, 3];

    keys.extend_from_slice(&[
        GT_MODEL_TYPE_GEO_KEY,
        0,
        1,
        if is_geographic(epsg) {
            MODEL_TYPE_GEOGRAPHIC
        } else {
            MODEL_TYPE_PROJECTED
        },
    ]);

    keys.extend_from_slice(&[GT_RASTER_TYPE_GEO_KEY, 0, 1, RASTER_PIXEL_IS_AREA]);

    if is_geographic(epsg) {
        keys.extend_from_slice(&[GEOGRAPHIC_TYPE_GEO_KEY, 0, 1, epsg as u16]);
    } else {
        keys.extend_from_slice(&[PROJECTED_CS_TYPE_GEO_KEY, 0, 1, epsg as u16]);
    }

    keys
}
