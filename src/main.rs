use std::path::PathBuf;

use clap::Parser;
use pansharp_rs::logger;
use pansharp_rs::sharpen_pipeline::{PansharpenRunner, SharpenConfig};

use tracing::{error, info};

/// Sharpen a low-resolution color GeoTIFF with a high-resolution
/// panchromatic band using Brovey band-ratio fusion.
#[derive(Parser, Debug)]
#[command(name = "pansharpen", version)]
struct Cli {
    /// Panchromatic input GeoTIFF (1 band, high resolution)
    pan: PathBuf,

    /// Color input GeoTIFF (3 bands, lower resolution)
    color: PathBuf,

    /// Destination GeoTIFF (RGBA, 8-bit)
    dst: PathBuf,

    /// Weight of the last color band in the brightness sum
    #[arg(short, long, default_value_t = 0.2)]
    weight: f32,

    /// Worker threads (0 uses every available core)
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Log per-tile buffer shapes
    #[arg(short, long)]
    verbose: bool,

    /// Tile edge length in pixels, overriding the 512 default
    #[arg(short, long)]
    customwindow: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    info!("Starting pansharpen...");

    let mut builder = SharpenConfig::builder()
        .weight(cli.weight)
        .jobs(cli.jobs)
        .verbose(cli.verbose);
    if let Some(size) = cli.customwindow {
        builder = builder.tile_size(size);
    }
    let config = builder.build();
    let runner = PansharpenRunner::new(config);

    info!("Pansharpening pipeline initialized");
    info!("Weight: {}", runner.config().weight);
    info!(
        "Jobs: {}",
        if runner.config().jobs == 0 {
            "all cores".to_string()
        } else {
            runner.config().jobs.to_string()
        }
    );
    info!("Tile size: {}", runner.config().tile_size);

    match runner.sharpen_files(&cli.pan, &cli.color, &cli.dst) {
        Ok(_) => info!("Pansharpening successful!"),
        Err(e) => {
            error!("Pansharpening failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
