//! Lamina command line
//!
//! Loads an STL model, slices it with the configured process parameters,
//! and logs a per-run summary. Path output (G-code emission, visualization)
//! is handled by external collaborators; this binary stops at the layered
//! geometry.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use lamina::{LayerMode, Slicer, SlicerConfig};

/// Slice an STL model into layered toolpath geometry
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// STL model to slice
    model: PathBuf,
    /// Configuration directory holding default.toml / user.toml
    #[arg(short, long, default_value = "config")]
    config_dir: PathBuf,
    /// Override the layer mode (thickness | count)
    #[arg(long, value_parser = parse_layer_mode)]
    layer_mode: Option<LayerMode>,
    /// Override the layer pitch (thickness mode) or layer count (count mode)
    #[arg(long)]
    layer_value: Option<f64>,
    /// Override the extrusion line width (mm)
    #[arg(long)]
    line_width: Option<f64>,
    /// Override the number of perimeter shells
    #[arg(long)]
    wall_count: Option<usize>,
    /// Override the nominal infill line spacing (mm)
    #[arg(long)]
    line_spacing: Option<f64>,
}

fn parse_layer_mode(value: &str) -> Result<LayerMode, String> {
    match value {
        "thickness" => Ok(LayerMode::Thickness),
        "count" => Ok(LayerMode::Count),
        other => Err(format!("unknown layer mode {:?}", other)),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    // Load configuration, falling back to defaults when no config dir exists
    let mut config = SlicerConfig::load_from(&args.config_dir).unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        SlicerConfig::default()
    });

    // Command line overrides beat every config source
    if let Some(mode) = args.layer_mode {
        config.layers.mode = mode;
    }
    if let Some(value) = args.layer_value {
        config.layers.value = value;
    }
    if let Some(width) = args.line_width {
        config.extrusion.line_width = width;
    }
    if let Some(count) = args.wall_count {
        config.extrusion.wall_count = count;
    }
    if let Some(spacing) = args.line_spacing {
        config.infill.line_spacing = spacing;
    }

    let slicer = Slicer::from_stl(&args.model, config)
        .with_context(|| format!("failed to load model {}", args.model.display()))?;

    let report = slicer.slice().context("slicing failed")?;

    for warning in &report.warnings {
        log::warn!(
            "layer {} (z = {:.3}): {:?}: {}",
            warning.layer,
            warning.z0,
            warning.kind,
            warning.reason
        );
    }

    let infill_segments: usize = report.layers.iter().map(|l| l.infill_edges.len()).sum();
    let wall_pieces: usize = report.layers.iter().map(|l| l.polygons.len()).sum();
    println!(
        "{}: {} layers, {} wall pieces, {} infill segments, {} total path segments",
        args.model.display(),
        report.layers.len(),
        wall_pieces,
        infill_segments,
        report.total_segments()
    );

    Ok(())
}
