use thiserror::Error;

#[derive(Error, Debug)]
pub enum PansharpenError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode GeoTIFF: {0}")]
    DecodeError(String),

    #[error("Failed to encode GeoTIFF: {0}")]
    EncodeError(String),

    #[error("Pan band must be 1 band - is {0}")]
    PanBandCount(usize),

    #[error("Color raster must have 3 bands - is {0}")]
    ColorBandCount(usize),

    #[error("Pan band must be larger than color bands: pan {pan_width}x{pan_height}, color {color_width}x{color_height}")]
    PanNotLarger {
        pan_width: usize,
        pan_height: usize,
        color_width: usize,
        color_height: usize,
    },

    #[error("Coordinate reference systems do not match: pan {pan:?}, color {color:?}")]
    CrsMismatch { pan: Option<u32>, color: Option<u32> },

    #[error("Fusion weight must be positive and finite - is {0}")]
    InvalidWeight(f32),

    #[error("Invalid output scale factor: {0}")]
    InvalidScale(f64),

    #[error("Tile size must be nonzero")]
    InvalidTileSize,

    #[error("Affine transform is not invertible")]
    NonInvertibleTransform,

    #[error("Window ({col_off}, {row_off}, {width}, {height}) exceeds raster extent {raster_width}x{raster_height}")]
    WindowOutOfBounds {
        col_off: i64,
        row_off: i64,
        width: usize,
        height: usize,
        raster_width: usize,
        raster_height: usize,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PansharpenError>;
