//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads or generates calibration sources
//! - runs the aggregation pipeline (fit, scale, residuals)
//! - prints reports/plots
//! - writes optional exports

use std::path::Path;

use clap::Parser;

use crate::cli::{Cli, Command, DemoArgs, FitArgs, OutputArgs, ShowArgs};
use crate::data::{generate_sources, SampleConfig};
use crate::error::CalError;
use crate::io::points::{read_points_csv, write_residuals_csv};
use crate::io::setfile::{read_set_json, write_set_json};

pub mod pipeline;

use pipeline::{run_calibration, RunOutput, SourceInput};

/// Entry point for the `calib` binary.
pub fn run() -> Result<(), CalError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), CalError> {
    let mut inputs = Vec::with_capacity(args.sources.len());
    for path in &args.sources {
        let file = read_points_csv(path)?;
        for err in &file.row_errors {
            eprintln!("{}: line {}: {}", path.display(), err.line, err.message);
        }
        inputs.push(SourceInput {
            label: source_label(path),
            points: file.points,
        });
    }

    let run = run_calibration(inputs, args.model, args.scale_passes)?;
    print_run(&run, &args.output)
}

fn handle_demo(args: DemoArgs) -> Result<(), CalError> {
    let config = SampleConfig {
        sources: args.sources,
        points_per_source: args.points,
        seed: args.seed,
        gain_spread: args.gain_spread,
        noise: args.noise,
        ..SampleConfig::default()
    };
    let sample = generate_sources(&config)?;

    println!("Generated {} synthetic sources (seed {}):", sample.len(), args.seed);
    for s in &sample {
        println!("  {:<12} gain={:.4} n={}", s.label, s.gain, s.points.len());
    }
    println!();

    let inputs = sample
        .into_iter()
        .map(|s| SourceInput { label: s.label, points: s.points })
        .collect();
    let run = run_calibration(inputs, args.model, args.scale_passes)?;
    print_run(&run, &args.output)
}

fn handle_show(args: ShowArgs) -> Result<(), CalError> {
    let file = read_set_json(&args.path)?;
    println!("Set file: tool={} saved={}", file.tool, file.saved);
    println!("{}", crate::report::format_set_summary(&file.set));
    println!("{}", crate::plot::render_calibration(&file.set, args.width, args.height));
    if file.set.residual_set() {
        println!("{}", crate::plot::render_residual(&file.set, args.width, args.height));
    }
    Ok(())
}

fn print_run(run: &RunOutput, output: &OutputArgs) -> Result<(), CalError> {
    println!("{}", crate::report::format_set_summary(&run.set));
    for (pass, factors) in run.scale_history.iter().enumerate() {
        println!("Pass {}:", pass + 1);
        print!("{}", crate::report::format_scale_report(&run.set, factors));
    }
    if !run.scale_history.is_empty() {
        println!();
    }
    println!("{}", crate::report::format_residual_table(&run.set));

    if output.plot_enabled() {
        println!("{}", crate::plot::render_calibration(&run.set, output.width, output.height));
        println!("{}", crate::plot::render_residual(&run.set, output.width, output.height));
    }

    if let Some(path) = &output.export {
        write_residuals_csv(path, &run.set)?;
        println!("Wrote residual CSV to {}", path.display());
    }
    if let Some(path) = &output.export_set {
        write_set_json(path, &run.set)?;
        println!("Wrote set file to {}", path.display());
    }

    Ok(())
}

fn source_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
