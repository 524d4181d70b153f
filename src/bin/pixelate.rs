use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pixel_mosaic::{GridGeometry, PixelateConfig, PixelateOptions, Shape, run};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Rectangular,
    Staggered,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShapeArg {
    Blocks,
    Circles,
}

/// Turn an image into pixel art made of blocks or circles.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image path
    input: PathBuf,

    /// Output image path; the extension picks the format
    #[arg(short, long, default_value = "pixelated.png")]
    output: PathBuf,

    /// Number of cells across the image width
    #[arg(short = 'n', long, default_value_t = 25)]
    pixel_in_row: u32,

    /// Blend weight of the dominant color (0-1)
    #[arg(long, default_value_t = 0.8)]
    dominant_coefficient: f64,

    /// Per-channel difference under which colors are grouped (0-255)
    #[arg(long, default_value_t = 20)]
    color_threshold: u8,

    /// Reduce the result to this many colors with k-means
    #[arg(short = 'k', long)]
    num_colors: Option<usize>,

    /// Seed for palette reduction
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Cell layout
    #[arg(long, value_enum, default_value_t = LayoutArg::Rectangular)]
    layout: LayoutArg,

    /// Shape to draw; defaults to blocks for rectangular and circles for staggered
    #[arg(long, value_enum)]
    shape: Option<ShapeArg>,

    /// Print a JSON summary instead of a status line
    #[arg(long)]
    json: bool,

    /// Log progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let geometry = match args.layout {
        LayoutArg::Rectangular => GridGeometry::rectangular(args.pixel_in_row),
        LayoutArg::Staggered => GridGeometry::staggered(args.pixel_in_row),
    };
    let mut options = PixelateOptions::new(geometry);
    options.dominant_coefficient = args.dominant_coefficient;
    options.color_threshold = args.color_threshold;
    options.num_colors = args.num_colors;
    options.seed = args.seed;
    if let Some(shape) = args.shape {
        options.shape = match shape {
            ShapeArg::Blocks => Shape::Blocks,
            ShapeArg::Circles => Shape::Circles,
        };
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let config = PixelateConfig::new(&args.input, &args.output, options);
    let report = run(&config)
        .with_context(|| format!("pixelating {} failed", args.input.display()))?;

    if args.json {
        let summary = serde_json::json!({
            "input": args.input.display().to_string(),
            "output": report.output.display().to_string(),
            "input_size": [report.input_size.0, report.input_size.1],
            "output_size": [report.output_size.0, report.output_size.1],
            "grid": { "rows": report.grid_size.0, "columns": report.grid_size.1 },
            "palette": report.palette.iter().map(|c| c.to_hex()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Saved → {} ({} x {} cells, {} colors)",
            report.output.display(),
            report.grid_size.1,
            report.grid_size.0,
            report.palette.len()
        );
    }

    Ok(())
}
