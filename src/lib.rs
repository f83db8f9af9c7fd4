pub mod logger;
pub mod sharpen_pipeline;
