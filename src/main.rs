use std::path::{Path as FsPath, PathBuf};

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vectorbrush::kurbo::{Point, Vec2};
use vectorbrush::persist::SketchFile;
use vectorbrush::{BrushError, EditorConfig, Falloff, Path};

#[derive(Parser)]
#[command(name = "vectorbrush", about = "Freehand strokes to editable cubic Bezier paths")]
struct Cli {
    /// Log per-stroke detail (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simplify and fit every stroke of a recording
    Fit {
        #[command(flatten)]
        io: IoArgs,
    },
    /// Push every stroke with the warp brush, then refit
    Warp {
        #[command(flatten)]
        io: IoArgs,

        /// Brush centre, as X,Y
        #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
        target: (f64, f64),

        /// Displacement at the centre, as DX,DY
        #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
        delta: (f64, f64),

        /// Brush radius in scene units
        #[arg(long)]
        radius: Option<f64>,

        /// Displacement fraction at the centre (0-1)
        #[arg(long)]
        strength: Option<f64>,

        #[arg(long, value_enum)]
        falloff: Option<Falloff>,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Input sketch JSON ({"paths": [{"x": [...], "y": [...]}, ...]})
    #[arg(short, long)]
    input: PathBuf,

    /// Output sketch JSON
    #[arg(short, long)]
    output: PathBuf,

    /// Editor preset JSON (missing fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// RDP tolerance in scene units
    #[arg(long)]
    tolerance: Option<f64>,

    /// Spline smoothing factor (0 = interpolate)
    #[arg(long)]
    smoothing: Option<f64>,

    /// Write a PNG preview of the result with handles
    #[arg(long)]
    preview: Option<PathBuf>,
}

impl IoArgs {
    fn editor_config(&self) -> Result<EditorConfig, BrushError> {
        let mut config = match &self.config {
            Some(path) => EditorConfig::load(path)?,
            None => EditorConfig::default(),
        };
        if let Some(t) = self.tolerance {
            config.simplify_tolerance = t;
        }
        if let Some(s) = self.smoothing {
            config.smoothing = s;
        }
        Ok(config)
    }
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got {s:?}"))?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Command::Fit { io } => {
            let config = io.editor_config()?;
            let strokes = SketchFile::load(&io.input)?.strokes()?;
            let paths = trace_all(&strokes, &config)?;
            finish(&io, &paths)?;
        }
        Command::Warp {
            io,
            target,
            delta,
            radius,
            strength,
            falloff,
        } => {
            let mut config = io.editor_config()?;
            if let Some(r) = radius {
                config.warp_radius = r;
            }
            if let Some(s) = strength {
                config.warp_strength = s;
            }
            if let Some(f) = falloff {
                config.warp_falloff = f;
            }
            let target = Point::new(target.0, target.1);
            let delta = Vec2::new(delta.0, delta.1);
            info!(
                ?target,
                ?delta,
                radius = config.warp_radius,
                strength = config.warp_strength,
                "warping"
            );
            let warped: Vec<Vec<Point>> = SketchFile::load(&io.input)?
                .strokes()?
                .iter()
                .map(|stroke| {
                    vectorbrush::warp(
                        stroke,
                        target,
                        delta,
                        config.warp_strength,
                        config.warp_radius,
                        config.warp_falloff,
                    )
                })
                .collect();
            let paths = trace_all(&warped, &config)?;
            finish(&io, &paths)?;
        }
    }
    Ok(())
}

/// Trace independent strokes in parallel, keeping their order.
fn trace_all(strokes: &[Vec<Point>], config: &EditorConfig) -> Result<Vec<Path>, BrushError> {
    let paths: Vec<Path> = strokes
        .par_iter()
        .filter(|stroke| stroke.len() > 1)
        .map(|stroke| vectorbrush::trace(stroke, config))
        .collect::<Result<_, _>>()?;
    let (curves, lines) = paths.iter().fold((0, 0), |(c, l), p| {
        let (pc, pl) = p.segment_counts();
        (c + pc, l + pl)
    });
    info!(
        strokes = strokes.len(),
        paths = paths.len(),
        curves,
        lines,
        "traced"
    );
    Ok(paths)
}

fn finish(io: &IoArgs, paths: &[Path]) -> Result<(), BrushError> {
    SketchFile::from_paths(paths).save(&io.output)?;
    if let Some(preview) = &io.preview {
        write_preview(paths, preview)?;
    }
    Ok(())
}

#[cfg(feature = "render")]
fn write_preview(paths: &[Path], output: &FsPath) -> Result<(), BrushError> {
    let options = vectorbrush::render::RenderOptions {
        show_handles: true,
        ..Default::default()
    };
    vectorbrush::render::save_png(paths, &options, output)?;
    info!(path = %output.display(), "wrote preview");
    Ok(())
}

#[cfg(not(feature = "render"))]
fn write_preview(_paths: &[Path], output: &FsPath) -> Result<(), BrushError> {
    tracing::warn!(path = %output.display(), "built without the render feature, skipping preview");
    Ok(())
}
