//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initialises logging
//! - loads the config file and applies flag overrides
//! - runs the requested pipeline
//! - prints text or JSON

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, CurveArgs, EllipseArgs, OutputFormat, SampleArgs};
use crate::config::EngineConfig;
use crate::error::AppError;
use crate::report::{CurveReport, EllipseReport, SampleReport};

pub mod pipeline;

/// Entry point for the `concordia` binary.
pub fn run() -> Result<(), AppError> {
    // `concordia` and `concordia -n 40` behave like `concordia sample ...`.
    // Clap requires a subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    match cli.command {
        Command::Curve(args) => handle_curve(args, config),
        Command::Ellipse(args) => handle_ellipse(args, config),
        Command::Sample(args) => handle_sample(args, config),
    }
}

/// Log to stderr; `RUST_LOG` wins, otherwise `-v` selects debug.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<EngineConfig, AppError> {
    match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            EngineConfig::load(path)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn handle_curve(args: CurveArgs, mut config: EngineConfig) -> Result<(), AppError> {
    args.engine.apply(&mut config);
    config.validate()?;

    let run = pipeline::run_curve(&config, &args.bounds(), args.engine.envelope);
    match args.engine.format {
        OutputFormat::Text => print!("{}", crate::report::format_curve_run(&run)),
        OutputFormat::Json => println!("{}", crate::report::to_json(&CurveReport::from_run(&run))?),
    }
    Ok(())
}

fn handle_ellipse(args: EllipseArgs, config: EngineConfig) -> Result<(), AppError> {
    let multiplier = args.multiplier.unwrap_or(config.multiplier);
    let point = args.point();
    let ellipse = pipeline::run_ellipse(&point, multiplier)?;
    match args.format {
        OutputFormat::Text => print!("{}", crate::report::format_ellipse(&point, multiplier, &ellipse)),
        OutputFormat::Json => {
            let report = EllipseReport::new(point, multiplier, ellipse);
            println!("{}", crate::report::to_json(&report)?);
        }
    }
    Ok(())
}

fn handle_sample(args: SampleArgs, mut config: EngineConfig) -> Result<(), AppError> {
    args.apply(&mut config);
    config.validate()?;

    let run = pipeline::run_sample(&config, args.engine.envelope)?;
    match args.engine.format {
        OutputFormat::Text => print!("{}", crate::report::format_sample_run(&run)),
        OutputFormat::Json => println!("{}", crate::report::to_json(&SampleReport::from_run(&run))?),
    }
    Ok(())
}

/// Rewrite argv so `concordia` defaults to `concordia sample`.
///
/// Rules:
/// - `concordia`                     -> `concordia sample`
/// - `concordia -n 40 ...`           -> `concordia sample -n 40 ...`
/// - `concordia --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("sample".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    // Global flags may precede the subcommand (`concordia -v curve ...`).
    let has_subcommand = argv[1..]
        .iter()
        .any(|a| matches!(a.as_str(), "curve" | "ellipse" | "sample"));
    if has_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "sample".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_sample() {
        assert_eq!(rewrite_args(args(&["concordia"])), args(&["concordia", "sample"]));
        assert_eq!(
            rewrite_args(args(&["concordia", "-n", "40"])),
            args(&["concordia", "sample", "-n", "40"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for argv in [
            args(&["concordia", "curve", "--min-x", "0"]),
            args(&["concordia", "-v", "ellipse", "--x", "1"]),
            args(&["concordia", "--help"]),
            args(&["concordia", "-V"]),
        ] {
            assert_eq!(rewrite_args(argv.clone()), argv);
        }
    }

    #[test]
    fn rewritten_flags_parse() {
        let cli = Cli::parse_from(rewrite_args(args(&["concordia", "--seed", "3", "--envelope"])));
        let Command::Sample(sample) = cli.command else {
            panic!("expected sample subcommand");
        };
        assert_eq!(sample.seed, Some(3));
        assert!(sample.engine.envelope);
    }
}
