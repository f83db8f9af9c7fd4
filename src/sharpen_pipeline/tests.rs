#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use ndarray::{Array2, Array3};
    use tempfile::TempDir;
    use tiff::encoder::{colortype, TiffEncoder};
    use tiff::tags::Tag;

    use crate::sharpen_pipeline::common::error::{PansharpenError, Result};
    use crate::sharpen_pipeline::fusion::{Resampling, SharpenConfig, ALPHA_VALID};
    use crate::sharpen_pipeline::geo::{GeoTransform, PixelWindow};
    use crate::sharpen_pipeline::jobs::PansharpenRunner;
    use crate::sharpen_pipeline::raster::geotags::{
        GEO_KEY_DIRECTORY, GT_MODEL_TYPE_GEO_KEY, MODEL_PIXEL_SCALE, MODEL_TIEPOINT,
        MODEL_TYPE_PROJECTED, PROJECTED_CS_TYPE_GEO_KEY,
    };
    use crate::sharpen_pipeline::raster::{
        GeoTiffReader, RasterProfile, RasterReader, RasterWriter, SampleFormat,
    };

    struct MockReader {
        inner: GeoTiffReader,
        should_fail: bool,
    }

    impl MockReader {
        fn new(
            count: usize,
            width: usize,
            height: usize,
            dtype: SampleFormat,
            crs: Option<u32>,
            transform: GeoTransform,
            data: Array3<f32>,
        ) -> Self {
            let profile = RasterProfile::new(width, height, count, dtype, crs, transform);
            Self {
                inner: GeoTiffReader::from_array(profile, data).unwrap(),
                should_fail: false,
            }
        }

        fn failing(mut self) -> Self {
            self.should_fail = true;
            self
        }
    }

    impl RasterReader for MockReader {
        fn profile(&self) -> &RasterProfile {
            self.inner.profile()
        }

        fn read_band(&self, band: usize, window: &PixelWindow) -> Result<Array2<f32>> {
            if self.should_fail {
                return Err(PansharpenError::InputReadError("Mock read error".to_string()));
            }
            self.inner.read_band(band, window)
        }

        fn read_boundless(&self, window: &PixelWindow, fill: f32) -> Result<Array3<f32>> {
            if self.should_fail {
                return Err(PansharpenError::InputReadError("Mock read error".to_string()));
            }
            self.inner.read_boundless(window, fill)
        }
    }

    struct MockWriter {
        should_fail: bool,
        written: Arc<Mutex<Vec<(Array3<u8>, RasterProfile)>>>,
    }

    impl RasterWriter for MockWriter {
        fn write_raster(
            &self,
            bands: &Array3<u8>,
            profile: &RasterProfile,
            _output: &mut dyn Write,
        ) -> Result<()> {
            if self.should_fail {
                return Err(PansharpenError::OutputWriteError(
                    "Mock write error".to_string(),
                ));
            }
            self.written
                .lock()
                .unwrap()
                .push((bands.clone(), profile.clone()));
            Ok(())
        }
    }

    fn pan_reader() -> MockReader {
        // 8x8 pan at 1m resolution, uniform 200
        MockReader::new(
            1,
            8,
            8,
            SampleFormat::U8,
            Some(32633),
            GeoTransform::from_origin(0.0, 8.0, 1.0, 1.0),
            Array3::from_elem((1, 8, 8), 200.0),
        )
    }

    fn color_reader() -> MockReader {
        // 4x4 color at 2m resolution over the same extent, uniform 100
        MockReader::new(
            3,
            4,
            4,
            SampleFormat::U8,
            Some(32633),
            GeoTransform::from_origin(0.0, 8.0, 2.0, 2.0),
            Array3::from_elem((3, 4, 4), 100.0),
        )
    }

    fn varied_pan() -> MockReader {
        MockReader::new(
            1,
            8,
            8,
            SampleFormat::U8,
            Some(32633),
            GeoTransform::from_origin(0.0, 8.0, 1.0, 1.0),
            Array3::from_shape_fn((1, 8, 8), |(_, r, c)| (100 + r * 10 + c) as f32),
        )
    }

    fn varied_color() -> MockReader {
        MockReader::new(
            3,
            4,
            4,
            SampleFormat::U8,
            Some(32633),
            GeoTransform::from_origin(0.0, 8.0, 2.0, 2.0),
            Array3::from_shape_fn((3, 4, 4), |(b, r, c)| (40 + b * 20 + r * 5 + c * 3) as f32),
        )
    }

    fn write_geo_tags_for_test<W, K>(
        dir: &mut tiff::encoder::DirectoryEncoder<W, K>,
        origin: (f64, f64),
        res: (f64, f64),
        epsg: u16,
    ) where
        W: std::io::Write + std::io::Seek,
        K: tiff::encoder::TiffKind,
    {
        let pixel_scale = [res.0, res.1, 0.0];
        dir.write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), pixel_scale.as_slice())
            .unwrap();
        let tiepoint = [0.0, 0.0, 0.0, origin.0, origin.1, 0.0];
        dir.write_tag(Tag::Unknown(MODEL_TIEPOINT), tiepoint.as_slice())
            .unwrap();
        let geokeys = [
            1u16,
            1,
            0,
            2,
            GT_MODEL_TYPE_GEO_KEY,
            0,
            1,
            MODEL_TYPE_PROJECTED,
            PROJECTED_CS_TYPE_GEO_KEY,
            0,
            1,
            epsg,
        ];
        dir.write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), geokeys.as_slice())
            .unwrap();
    }

    fn write_pan_file(path: &Path, width: u32, height: u32, value: u16) {
        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer)).unwrap();
        let mut image = encoder
            .new_image::<colortype::Gray16>(width, height)
            .unwrap();
        write_geo_tags_for_test(image.encoder(), (0.0, height as f64), (1.0, 1.0), 32633);
        image
            .write_data(&vec![value; (width * height) as usize])
            .unwrap();
        std::fs::write(path, buffer).unwrap();
    }

    fn write_color_file(path: &Path, width: u32, height: u32, value: u8) {
        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer)).unwrap();
        let mut image = encoder.new_image::<colortype::RGB8>(width, height).unwrap();
        // Half the pan resolution over the same ground extent
        write_geo_tags_for_test(
            image.encoder(),
            (0.0, (height * 2) as f64),
            (2.0, 2.0),
            32633,
        );
        image
            .write_data(&vec![value; (width * height * 3) as usize])
            .unwrap();
        std::fs::write(path, buffer).unwrap();
    }

    #[test]
    fn test_config_builder() {
        let config = SharpenConfig::builder()
            .weight(0.2)
            .resampling(Resampling::Nearest)
            .padding(3)
            .tile_size(256)
            .jobs(4)
            .verbose(true)
            .build();

        assert_eq!(config.weight, 0.2);
        assert_eq!(config.resampling, Resampling::Nearest);
        assert_eq!(config.padding, 3);
        assert_eq!(config.fill, 0.0);
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.jobs, 4);
        assert!(config.verbose);
    }

    #[test]
    fn test_successful_run_writes_rgba_mosaic() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let writer = MockWriter {
            should_fail: false,
            written: written.clone(),
        };
        let runner = PansharpenRunner::with_custom(writer, SharpenConfig::default());

        let mut output = Cursor::new(Vec::new());
        runner
            .sharpen(&pan_reader(), &color_reader(), &mut output)
            .unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        let (mosaic, profile) = &written[0];

        assert_eq!(profile.count, 4);
        assert_eq!(profile.dtype, SampleFormat::U8);
        assert_eq!((profile.width, profile.height), (8, 8));
        assert_eq!(profile.crs, Some(32633));
        assert_eq!(mosaic.dim(), (4, 8, 8));

        // Interior pixels double to the pan level and carry a valid mask
        for r in 2..6 {
            for c in 2..6 {
                for b in 0..3 {
                    assert_eq!(mosaic[[b, r, c]], 200);
                }
                assert_eq!(mosaic[[3, r, c]], ALPHA_VALID);
            }
        }
    }

    #[test]
    fn test_preflight_rejects_multiband_pan() {
        let pan = MockReader::new(
            3,
            8,
            8,
            SampleFormat::U8,
            Some(32633),
            GeoTransform::from_origin(0.0, 8.0, 1.0, 1.0),
            Array3::from_elem((3, 8, 8), 200.0),
        );
        let runner = PansharpenRunner::with_custom(
            MockWriter {
                should_fail: false,
                written: Arc::new(Mutex::new(Vec::new())),
            },
            SharpenConfig::default(),
        );

        let mut output = Cursor::new(Vec::new());
        let result = runner.sharpen(&pan, &color_reader(), &mut output);
        assert!(matches!(result, Err(PansharpenError::PanBandCount(3))));
    }

    #[test]
    fn test_preflight_rejects_wrong_color_band_count() {
        let color = MockReader::new(
            2,
            4,
            4,
            SampleFormat::U8,
            Some(32633),
            GeoTransform::from_origin(0.0, 8.0, 2.0, 2.0),
            Array3::from_elem((2, 4, 4), 100.0),
        );
        let runner = PansharpenRunner::with_custom(
            MockWriter {
                should_fail: false,
                written: Arc::new(Mutex::new(Vec::new())),
            },
            SharpenConfig::default(),
        );

        let mut output = Cursor::new(Vec::new());
        let result = runner.sharpen(&pan_reader(), &color, &mut output);
        assert!(matches!(result, Err(PansharpenError::ColorBandCount(2))));
    }

    #[test]
    fn test_preflight_rejects_pan_not_larger() {
        let color = MockReader::new(
            3,
            8,
            8,
            SampleFormat::U8,
            Some(32633),
            GeoTransform::from_origin(0.0, 8.0, 1.0, 1.0),
            Array3::from_elem((3, 8, 8), 100.0),
        );
        let runner = PansharpenRunner::with_custom(
            MockWriter {
                should_fail: false,
                written: Arc::new(Mutex::new(Vec::new())),
            },
            SharpenConfig::default(),
        );

        let mut output = Cursor::new(Vec::new());
        let result = runner.sharpen(&pan_reader(), &color, &mut output);
        assert!(matches!(result, Err(PansharpenError::PanNotLarger { .. })));
    }

    #[test]
    fn test_preflight_rejects_crs_mismatch() {
        let color = MockReader::new(
            3,
            4,
            4,
            SampleFormat::U8,
            Some(4326),
            GeoTransform::from_origin(0.0, 8.0, 2.0, 2.0),
            Array3::from_elem((3, 4, 4), 100.0),
        );
        let runner = PansharpenRunner::with_custom(
            MockWriter {
                should_fail: false,
                written: Arc::new(Mutex::new(Vec::new())),
            },
            SharpenConfig::default(),
        );

        let mut output = Cursor::new(Vec::new());
        let result = runner.sharpen(&pan_reader(), &color, &mut output);
        assert!(matches!(
            result,
            Err(PansharpenError::CrsMismatch {
                pan: Some(32633),
                color: Some(4326)
            })
        ));
    }

    #[test]
    fn test_preflight_rejects_nonpositive_weight() {
        let runner = PansharpenRunner::with_custom(
            MockWriter {
                should_fail: false,
                written: Arc::new(Mutex::new(Vec::new())),
            },
            SharpenConfig::builder().weight(0.0).build(),
        );

        let mut output = Cursor::new(Vec::new());
        let result = runner.sharpen(&pan_reader(), &color_reader(), &mut output);
        assert!(matches!(result, Err(PansharpenError::InvalidWeight(_))));
    }

    #[test]
    fn test_preflight_rejects_zero_tile_size() {
        let runner = PansharpenRunner::with_custom(
            MockWriter {
                should_fail: false,
                written: Arc::new(Mutex::new(Vec::new())),
            },
            SharpenConfig::builder().tile_size(0).build(),
        );

        let mut output = Cursor::new(Vec::new());
        let result = runner.sharpen(&pan_reader(), &color_reader(), &mut output);
        assert!(matches!(result, Err(PansharpenError::InvalidTileSize)));
    }

    #[test]
    fn test_reader_failure_aborts_run() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let runner = PansharpenRunner::with_custom(
            MockWriter {
                should_fail: false,
                written: written.clone(),
            },
            SharpenConfig::default(),
        );

        let mut output = Cursor::new(Vec::new());
        let result = runner.sharpen(&pan_reader().failing(), &color_reader(), &mut output);

        assert!(matches!(result, Err(PansharpenError::InputReadError(_))));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_writer_failure_propagates() {
        let runner = PansharpenRunner::with_custom(
            MockWriter {
                should_fail: true,
                written: Arc::new(Mutex::new(Vec::new())),
            },
            SharpenConfig::default(),
        );

        let mut output = Cursor::new(Vec::new());
        let result = runner.sharpen(&pan_reader(), &color_reader(), &mut output);
        assert!(matches!(result, Err(PansharpenError::OutputWriteError(_))));
    }

    #[test]
    fn test_tiling_is_seamless() {
        // One 8x8 tile and four 4x4 tiles must assemble identical mosaics
        let run = |tile_size: usize| {
            let written = Arc::new(Mutex::new(Vec::new()));
            let runner = PansharpenRunner::with_custom(
                MockWriter {
                    should_fail: false,
                    written: written.clone(),
                },
                SharpenConfig::builder().tile_size(tile_size).build(),
            );
            let mut output = Cursor::new(Vec::new());
            runner
                .sharpen(&varied_pan(), &varied_color(), &mut output)
                .unwrap();
            let guard = written.lock().unwrap();
            guard[0].0.clone()
        };

        assert_eq!(run(8), run(4));
    }

    #[test]
    fn test_sharpen_files_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let pan_path = temp_dir.path().join("pan.tif");
        let color_path = temp_dir.path().join("color.tif");
        let out_path = temp_dir.path().join("sharpened.tif");

        // 16-bit pan at 51400 over 8-bit color at 100: ratio 514 fuses to
        // 51400, rescaled by 257 to 200
        write_pan_file(&pan_path, 8, 8, 51400);
        write_color_file(&color_path, 4, 4, 100);

        let runner = PansharpenRunner::new(SharpenConfig::default());
        runner
            .sharpen_files(&pan_path, &color_path, &out_path)
            .unwrap();

        let reader = GeoTiffReader::open(&out_path).unwrap();
        let p = reader.profile();
        assert_eq!((p.width, p.height, p.count), (8, 8, 4));
        assert_eq!(p.dtype, SampleFormat::U8);
        assert_eq!(p.crs, Some(32633));
        assert_eq!(p.transform, GeoTransform::from_origin(0.0, 8.0, 1.0, 1.0));

        let out = reader
            .read_boundless(&PixelWindow::new(0, 0, 8, 8), 0.0)
            .unwrap();
        for r in 2..6 {
            for c in 2..6 {
                for b in 0..3 {
                    assert_eq!(out[[b, r, c]], 200.0);
                }
                assert_eq!(out[[3, r, c]], f32::from(ALPHA_VALID));
            }
        }
    }

    #[test]
    fn test_sharpen_files_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let runner = PansharpenRunner::new(SharpenConfig::default());

        let result = runner.sharpen_files(
            temp_dir.path().join("absent.tif"),
            temp_dir.path().join("also_absent.tif"),
            temp_dir.path().join("out.tif"),
        );
        assert!(matches!(result, Err(PansharpenError::InputReadError(_))));
    }

    #[test]
    fn test_parallel_run_matches_serial() {
        let run = |jobs: usize| {
            let written = Arc::new(Mutex::new(Vec::new()));
            let runner = PansharpenRunner::with_custom(
                MockWriter {
                    should_fail: false,
                    written: written.clone(),
                },
                SharpenConfig::builder().tile_size(4).jobs(jobs).build(),
            );
            let mut output = Cursor::new(Vec::new());
            runner
                .sharpen(&varied_pan(), &varied_color(), &mut output)
                .unwrap();
            let guard = written.lock().unwrap();
            guard[0].0.clone()
        };

        assert_eq!(run(1), run(4));
    }
}
