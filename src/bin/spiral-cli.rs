use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use image::imageops::FilterType;
use image::RgbaImage;
use tracing_subscriber::EnvFilter;

use spiral_portrait::config::Config;

#[derive(Parser)]
struct Opts {
    /// Image to trace.
    image: PathBuf,

    /// Where to write the SVG document [default: the image path with an `.svg` extension].
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Also rasterize the spiral into this PNG file.
    #[clap(long)]
    png: Option<PathBuf>,

    /// Width and height of the PNG, in pixels.
    #[clap(short, default_value = "2400")]
    width: i32,

    /// Dump both spirals and the joined path as JSON into this file.
    #[clap(long)]
    points: Option<PathBuf>,

    /// Read drawing options from a JSON file instead of the flags below.
    #[clap(long)]
    config: Option<PathBuf>,

    #[clap(flatten)]
    drawing: Config,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let file = File::open(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse config at {}", path.display()))
}

/// Decodes `path` and stretches it onto a square canvas of the given size.
fn load_canvas(path: &Path, size: u32) -> anyhow::Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to read image at {}", path.display()))?
        .into_rgba8();
    Ok(image::imageops::resize(&img, size, size, FilterType::Triangle))
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let opts = Opts::parse();

    let config = match &opts.config {
        Some(path) => load_config(path)?,
        None => opts.drawing,
    };
    let canvas = load_canvas(&opts.image, config.canvas_size)?;
    let portrait = spiral_portrait::art::draw(&canvas, &config)?;

    let svg_path = opts
        .output
        .clone()
        .unwrap_or_else(|| opts.image.with_extension("svg"));
    let svg = spiral_portrait::path::svg_document(
        &portrait.path,
        config.canvas_size as f64,
        config.stroke_width,
    );
    std::fs::write(&svg_path, svg)
        .with_context(|| format!("Failed to write SVG to {}", svg_path.display()))?;
    eprintln!("wrote svg: {}", svg_path.display());

    if let Some(png_path) = &opts.png {
        let dt = portrait.rasterize(opts.width, config.stroke_width);
        dt.write_png(png_path)
            .with_context(|| format!("Failed to write PNG to {}", png_path.display()))?;
        eprintln!("wrote png: {}", png_path.display());
    }

    if let Some(points_path) = &opts.points {
        let file = File::create(points_path)
            .with_context(|| format!("Failed to create {}", points_path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &portrait)
            .with_context(|| format!("Failed to write points to {}", points_path.display()))?;
        eprintln!("wrote points: {}", points_path.display());
    }

    Ok(())
}
