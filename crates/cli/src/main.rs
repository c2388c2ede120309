//! vegscan CLI - Landsat vegetation-loss detection

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use vegscan_core::io::read_geotiff;
use vegscan_core::{Raster, Scene};
use vegscan_pipeline::{DetectionConfig, Orchestrator, Outcome, PipelineTask};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "vegscan")]
#[command(author, version, about = "Landsat vegetation index and loss detection", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Calibrate a scene and compute its vegetation index
    Index {
        /// Scene identifier, e.g. LC82150672015015LGN00
        scene: String,
        /// Directory containing one subdirectory per scene
        #[arg(short, long)]
        dir: PathBuf,
        /// JSON file overriding the default detection configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Detect vegetation loss against the scene one revisit cycle earlier
    Detect {
        /// Scene identifier, e.g. LC82150672015015LGN00
        scene: String,
        /// Directory containing one subdirectory per scene
        #[arg(short, long)]
        dir: PathBuf,
        /// Vectorize the change mask into reprojected polygons
        #[arg(long)]
        polygonize: bool,
        /// JSON file overriding the default detection configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ─── Provider selection ─────────────────────────────────────────────────

#[cfg(feature = "gdal")]
use vegscan_core::io::GdalProvider as SelectedProvider;

/// Stands in when built without GDAL: the pure raster stages still run,
/// and any stage that needs the geoprocessing library reports why it
/// cannot proceed.
#[cfg(not(feature = "gdal"))]
struct SelectedProvider;

#[cfg(not(feature = "gdal"))]
impl vegscan_core::io::GeoProvider for SelectedProvider {
    fn warp_to_bounds(
        &self,
        _src: &std::path::Path,
        _bounds: &vegscan_core::BoundingBox,
        _dst: &std::path::Path,
    ) -> vegscan_core::Result<()> {
        Err(unavailable("warp"))
    }

    fn sieve(
        &self,
        _src: &std::path::Path,
        _dst: &std::path::Path,
        _min_pixels: usize,
    ) -> vegscan_core::Result<()> {
        Err(unavailable("sieve"))
    }

    fn polygonize(
        &self,
        _src: &std::path::Path,
        _dst: &std::path::Path,
        _keep: i32,
        _target: &vegscan_core::Crs,
    ) -> vegscan_core::Result<()> {
        Err(unavailable("polygonize"))
    }
}

#[cfg(not(feature = "gdal"))]
fn unavailable(operation: &str) -> vegscan_core::Error {
    vegscan_core::Error::Provider(format!(
        "{} requires vegscan to be built with the gdal feature",
        operation
    ))
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_config(path: Option<&PathBuf>) -> Result<DetectionConfig> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read config file {}", p.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config file {}", p.display()))
        }
        None => Ok(DetectionConfig::default()),
    }
}

fn report(outcome: &Outcome, scene: &Scene, elapsed: std::time::Duration) {
    match outcome {
        Outcome::Index(path) => {
            println!("Index raster for {} saved to: {}", scene.display_name(), path.display());
        }
        Outcome::ChangeMask(path) => {
            println!("Change mask for {} saved to: {}", scene.display_name(), path.display());
        }
        Outcome::ChangePolygons(path) => {
            println!("Change polygons for {} saved to: {}", scene.display_name(), path.display());
        }
        Outcome::Skipped => {
            println!(
                "Change detection for {} skipped: the comparison scene has not been processed yet",
                scene.display_name()
            );
        }
    }
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info { input } => {
            let pb = spinner("Reading raster...");
            let raster: Raster<f32> = read_geotiff(&input, None).context("Failed to read raster")?;
            pb.finish_and_clear();

            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );
        }

        Commands::Index { scene, dir, config } => {
            let scene = Scene::parse(&scene)?;
            let config = load_config(config.as_ref())?;
            let provider = SelectedProvider;

            let pb = spinner("Computing vegetation index...");
            let start = Instant::now();
            let mut orchestrator = Orchestrator::new(config, &provider, &dir);
            let outcome = orchestrator
                .run(&scene, PipelineTask::Index)
                .context("Index computation failed")?;
            pb.finish_and_clear();

            report(&outcome, &scene, start.elapsed());
        }

        Commands::Detect {
            scene,
            dir,
            polygonize,
            config,
        } => {
            let scene = Scene::parse(&scene)?;
            let config = load_config(config.as_ref())?;
            let provider = SelectedProvider;

            let pb = spinner("Running change detection...");
            let start = Instant::now();
            let mut orchestrator = Orchestrator::new(config, &provider, &dir);
            let outcome = orchestrator
                .run(
                    &scene,
                    PipelineTask::Detect {
                        vectorize: polygonize,
                    },
                )
                .context("Change detection failed")?;
            pb.finish_and_clear();

            report(&outcome, &scene, start.elapsed());
        }
    }

    Ok(())
}
