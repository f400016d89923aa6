//! Command-line parsing for the concordia geometry engine.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! geometry code. Every engine flag is optional: unset flags fall back to the
//! config file, then to built-in defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::EngineConfig;
use crate::domain::{CurveKind, DataPoint, DisplayBounds};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "concordia", version, about = "U-Pb concordia curve and error-ellipse geometry")]
pub struct Cli {
    /// TOML file with engine settings.
    #[arg(long, global = true, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the concordia for an explicit display window.
    Curve(CurveArgs),
    /// Compute the error ellipse of a single analysis.
    Ellipse(EllipseArgs),
    /// Generate synthetic analyses, frame them, and build the curve around them.
    Sample(SampleArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Engine overrides shared by the curve-producing subcommands.
#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// Coordinate system.
    #[arg(long, value_enum)]
    pub curve: Option<CurveKind>,

    /// λ²³⁵U (yr⁻¹).
    #[arg(long)]
    pub lambda235: Option<f64>,

    /// λ²³⁸U (yr⁻¹).
    #[arg(long)]
    pub lambda238: Option<f64>,

    /// ²³⁸U/²³⁵U for Tera-Wasserburg y.
    #[arg(long)]
    pub r238_235s: Option<f64>,

    /// Recursive-halving passes.
    #[arg(short = 'd', long)]
    pub depth: Option<usize>,

    /// Approximate number of age ticks (0 disables).
    #[arg(long)]
    pub ticks: Option<usize>,

    /// Also compute the decay-constant uncertainty envelope.
    #[arg(long)]
    pub envelope: bool,

    /// One-sigma uncertainty of λ²³⁵U.
    #[arg(long)]
    pub sigma_lambda235: Option<f64>,

    /// One-sigma uncertainty of λ²³⁸U.
    #[arg(long)]
    pub sigma_lambda238: Option<f64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl EngineArgs {
    /// Apply every flag that was given on top of `config`.
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(v) = self.curve {
            config.curve = v;
        }
        if let Some(v) = self.lambda235 {
            config.lambda235 = v;
        }
        if let Some(v) = self.lambda238 {
            config.lambda238 = v;
        }
        if let Some(v) = self.r238_235s {
            config.r238_235s = v;
        }
        if let Some(v) = self.depth {
            config.refinement_depth = v;
        }
        if let Some(v) = self.ticks {
            config.ticks = v;
        }
        if let Some(v) = self.sigma_lambda235 {
            config.sigma_lambda235 = v;
        }
        if let Some(v) = self.sigma_lambda238 {
            config.sigma_lambda238 = v;
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CurveArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long, allow_negative_numbers = true)]
    pub min_x: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub max_x: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub min_y: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub max_y: f64,
}

impl CurveArgs {
    pub fn bounds(&self) -> DisplayBounds {
        DisplayBounds::new(self.min_x, self.max_x, self.min_y, self.max_y)
    }
}

#[derive(Debug, Clone, Args)]
pub struct EllipseArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub x: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub y: f64,

    /// One-sigma absolute error in x.
    #[arg(long)]
    pub sigma_x: f64,

    /// One-sigma absolute error in y.
    #[arg(long)]
    pub sigma_y: f64,

    /// Error correlation.
    #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
    pub rho: f64,

    /// Uncertainty multiplier (defaults to the config value).
    #[arg(short = 'k', long)]
    pub multiplier: Option<f64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl EllipseArgs {
    pub fn point(&self) -> DataPoint {
        DataPoint::new(self.x, self.y, self.sigma_x, self.sigma_y, self.rho)
    }
}

#[derive(Debug, Clone, Args)]
pub struct SampleArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Number of synthetic analyses.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Random seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Uncertainty multiplier for the ellipses.
    #[arg(short = 'k', long)]
    pub multiplier: Option<f64>,
}

impl SampleArgs {
    pub fn apply(&self, config: &mut EngineConfig) {
        self.engine.apply(config);
        if let Some(v) = self.count {
            config.sample.count = v;
        }
        if let Some(v) = self.seed {
            config.sample.seed = v;
        }
        if let Some(v) = self.multiplier {
            config.multiplier = v;
        }
    }
}
