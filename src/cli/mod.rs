//! Command-line parsing for the calibration aggregation tool.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the engine and math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ModelKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "calib", version, about = "Multi-source calibration aggregation & scaling")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge CSV point files (one source each), fit, align, and report.
    Fit(FitArgs),
    /// Run the same pipeline on deterministic synthetic sources.
    Demo(DemoArgs),
    /// Print a previously saved calibration set file.
    Show(ShowArgs),
}

/// Common output/export options.
#[derive(Debug, Parser, Clone)]
pub struct OutputArgs {
    /// Render terminal plots (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the merged residual view to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the whole set (sources, provenance, fit) to JSON.
    #[arg(long = "export-set")]
    pub export_set: Option<PathBuf>,
}

/// Options for fitting from CSV point files.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// CSV point files, one source per file (columns x,y,x_err,y_err).
    /// The first file is the reference source and is never rescaled.
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Calibration model to fit.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelKind::Quadratic)]
    pub model: ModelKind,

    /// Number of scale+refit passes aligning the sources (0 disables scaling).
    #[arg(long, default_value_t = 5)]
    pub scale_passes: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for the synthetic demo.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Number of synthetic sources (the first is the unskewed reference).
    #[arg(short = 's', long, default_value_t = 3)]
    pub sources: usize,

    /// Points per source.
    #[arg(short = 'n', long, default_value_t = 12)]
    pub points: usize,

    /// Random seed for source generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Half-width of the per-source gain skew around 1.0.
    #[arg(long, default_value_t = 0.05)]
    pub gain_spread: f64,

    /// Absolute y noise (std dev).
    #[arg(long, default_value_t = 0.5)]
    pub noise: f64,

    /// Calibration model to fit.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelKind::Quadratic)]
    pub model: ModelKind,

    /// Number of scale+refit passes aligning the sources (0 disables scaling).
    #[arg(long, default_value_t = 5)]
    pub scale_passes: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for showing a saved set file.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// Saved set JSON file.
    pub path: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

impl OutputArgs {
    /// Resolve the plot/no-plot flag pair.
    pub fn plot_enabled(&self) -> bool {
        self.plot && !self.no_plot
    }
}
