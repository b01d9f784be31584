//! blobtrace: convert segmented image regions into JSON points and contours.
//!
//! Each subcommand reads its inputs from files, runs one converter from
//! `blobtrace-pipeline` and writes a JSON document. The output file is
//! truncated before any work starts, so it always exists afterwards.
//!
//! # Usage
//!
//! ```text
//! blobtrace [OPTIONS] mask-to-blob <INPUT> <WIDTH> <HEIGHT> <OUTPUT>
//! blobtrace [OPTIONS] blob-to-blob-threshold <IMAGE> <POINTS> <OUTPUT>
//! blobtrace [OPTIONS] blob-to-dot-max <IMAGE> <POINTS> <OUTPUT>
//! blobtrace [OPTIONS] circle-to-dot-max <IMAGE> <CIRCLE> <OUTPUT>
//! blobtrace [OPTIONS] label-stats <INTENSITY> <BINARY> <OUTPUT>
//! ```
//!
//! Logging goes to stderr; set `RUST_LOG=debug` for tracer details.

mod io;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blobtrace_pipeline::decode::{
    circle_from_text, decode_grayscale, decode_intensity, polyline_from_ne_bytes,
    scores_from_ne_bytes,
};
use blobtrace_pipeline::{ClosureRule, PipelineConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::io::{CliError, read_input, read_text, write_output};

/// Convert segmented image regions into JSON points and contours.
#[derive(Parser)]
#[command(name = "blobtrace", version)]
struct Cli {
    #[command(flatten)]
    options: PipelineOptions,

    #[command(subcommand)]
    command: Command,
}

/// Converter settings shared by every subcommand.
#[derive(Args)]
struct PipelineOptions {
    /// When the boundary tracer considers the outline closed.
    #[arg(long, global = true, value_enum, default_value_t = CLI_DEFAULT_RULE)]
    closure_rule: Rule,

    /// Maximum tracer transitions (default: 4 * pixel count + 1).
    #[arg(
        long,
        global = true,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    transition_limit: Option<usize>,

    /// Lowest score that belongs to a region (mask-to-blob).
    #[arg(
        long,
        global = true,
        default_value_t = PipelineConfig::DEFAULT_SCORE_THRESHOLD,
        allow_negative_numbers = true
    )]
    score_threshold: f32,

    /// Physical size of one pixel (circle-to-dot-max, label-stats).
    #[arg(long, global = true, default_value_t = PipelineConfig::DEFAULT_PIXEL_SIZE)]
    pixel_size: f64,

    /// Unit written next to label volumes.
    #[arg(long, global = true, default_value_t = PipelineConfig::DEFAULT_VOLUME_UNIT.to_string())]
    volume_unit: String,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other converter flags are ignored. Missing
    /// fields take their default values.
    #[arg(long, global = true)]
    config_json: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Trace the blob around the highest score of a raw f32 raster.
    MaskToBlob {
        /// Raw native-endian f32 scores, row-major.
        input: PathBuf,
        /// Raster width in pixels.
        width: u32,
        /// Raster height in pixels.
        height: u32,
        /// Contour JSON output.
        output: PathBuf,
    },
    /// Trace the Otsu-thresholded blob inside an annotation polygon.
    BlobToBlobThreshold {
        /// Grayscale source image.
        image: PathBuf,
        /// Packed native-endian f32 `x y` pairs.
        points: PathBuf,
        /// Contour JSON output.
        output: PathBuf,
    },
    /// Find the brightest pixel inside an annotation polygon.
    BlobToDotMax {
        /// Grayscale source image.
        image: PathBuf,
        /// Packed native-endian f32 `x y` pairs.
        points: PathBuf,
        /// Point JSON output.
        output: PathBuf,
    },
    /// Find the brightest pixel inside a circle.
    CircleToDotMax {
        /// Grayscale source image.
        image: PathBuf,
        /// Text file holding `cx cy r` in physical units.
        circle: PathBuf,
        /// Point JSON output.
        output: PathBuf,
    },
    /// Per-component statistics of a binary image over an intensity image.
    LabelStats {
        /// Grayscale intensity image, read at 16 bits.
        intensity: PathBuf,
        /// Binary image; non-zero pixels are foreground.
        binary: PathBuf,
        /// Volumes JSON output.
        output: PathBuf,
    },
}

impl Command {
    fn output(&self) -> &Path {
        match self {
            Self::MaskToBlob { output, .. }
            | Self::BlobToBlobThreshold { output, .. }
            | Self::BlobToDotMax { output, .. }
            | Self::CircleToDotMax { output, .. }
            | Self::LabelStats { output, .. } => output,
        }
    }
}

/// Closure rule selection.
#[derive(Clone, Copy, ValueEnum)]
enum Rule {
    /// Stop when the first tracer state recurs.
    State,
    /// Stop when the first corner point recurs.
    Position,
}

/// Maps a [`ClosureRule`] to the local CLI [`Rule`] enum.
const fn rule_from_pipeline(rule: ClosureRule) -> Rule {
    match rule {
        ClosureRule::State => Rule::State,
        ClosureRule::Position => Rule::Position,
    }
}

/// The CLI default rule, derived from [`PipelineConfig::DEFAULT_CLOSURE_RULE`]
/// so the two cannot silently diverge.
const CLI_DEFAULT_RULE: Rule = rule_from_pipeline(PipelineConfig::DEFAULT_CLOSURE_RULE);

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(options: &PipelineOptions) -> Result<PipelineConfig, CliError> {
    if let Some(ref json) = options.config_json {
        return Ok(serde_json::from_str(json)?);
    }

    Ok(PipelineConfig {
        closure_rule: match options.closure_rule {
            Rule::State => ClosureRule::State,
            Rule::Position => ClosureRule::Position,
        },
        transition_limit: options.transition_limit,
        score_threshold: options.score_threshold,
        pixel_size: options.pixel_size,
        volume_unit: options.volume_unit.clone(),
    })
}

/// Run one converter and produce its JSON document.
fn convert(command: &Command, config: &PipelineConfig) -> Result<String, CliError> {
    match command {
        Command::MaskToBlob {
            input,
            width,
            height,
            ..
        } => {
            let scores = scores_from_ne_bytes(*width, *height, &read_input(input)?)?;
            let contour = blobtrace_pipeline::mask_to_blob(&scores, config)?;
            tracing::info!(points = contour.len(), "traced blob");
            Ok(blobtrace_export::to_contour_json(&contour)?)
        }
        Command::BlobToBlobThreshold { image, points, .. } => {
            let gray = decode_grayscale(&read_input(image)?)?;
            let polygon = polyline_from_ne_bytes(&read_input(points)?)?;
            let contour = blobtrace_pipeline::blob_to_blob_threshold(&gray, &polygon, config)?;
            tracing::info!(points = contour.len(), "traced thresholded blob");
            Ok(blobtrace_export::to_contour_json(&contour)?)
        }
        Command::BlobToDotMax { image, points, .. } => {
            let gray = decode_grayscale(&read_input(image)?)?;
            let polygon = polyline_from_ne_bytes(&read_input(points)?)?;
            let cell = blobtrace_pipeline::blob_to_dot_max(&gray, &polygon)?;
            tracing::info!(?cell, "found maximum");
            Ok(blobtrace_export::to_point_json(cell)?)
        }
        Command::CircleToDotMax { image, circle, .. } => {
            let gray = decode_grayscale(&read_input(image)?)?;
            let circle = circle_from_text(&read_text(circle)?)?;
            let cell = blobtrace_pipeline::circle_to_dot_max(&gray, &circle, config)?;
            tracing::info!(?cell, "found maximum");
            Ok(blobtrace_export::to_point_json(cell)?)
        }
        Command::LabelStats {
            intensity, binary, ..
        } => {
            let intensity = decode_intensity(&read_input(intensity)?)?;
            let binary = decode_grayscale(&read_input(binary)?)?;
            let stats = blobtrace_pipeline::label_stats(&intensity, &binary, config)?;
            tracing::info!(labels = stats.len(), "computed label statistics");
            Ok(blobtrace_export::to_volumes_json(&stats, &config.volume_unit)?)
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let output = cli.command.output();
    write_output(output, "")?;
    let config = config_from_cli(&cli.options)?;
    tracing::debug!(?config, output = %output.display(), "starting conversion");

    let json = convert(&cli.command, &config)?;
    write_output(output, &json)?;
    tracing::info!("Results written to {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
