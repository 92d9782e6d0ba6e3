//! Command line design rule check of a board snapshot
//!
//! Usage:
//!   drc_check <board.json> [--options <options.json>] [--json] [--progress] [-v]
//!
//! Prints one line per violation, or the whole report as JSON with `--json`.
//! The exit code is 1 when at least one non-advisory violation was found.

use anyhow::{Context, Result};
use board_drc::board::{Board, SnapshotServices};
use board_drc::drc::{CheckEngine, DrcEvent};
use board_drc::rules::CheckOptions;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Run the design rule check on a board exported as JSON
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Board snapshot (JSON)
    board: PathBuf,

    /// Check options (JSON); missing fields keep their defaults
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Print status and progress while checking
    #[arg(long)]
    progress: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let json = std::fs::read_to_string(&cli.board)
        .with_context(|| format!("Failed to read board file {}", cli.board.display()))?;
    let board = Board::from_json_str(&json).with_context(|| format!("Invalid board file {}", cli.board.display()))?;
    let options = match &cli.options {
        Some(path) => CheckOptions::from_json_file(path)?,
        None => CheckOptions::default(),
    };
    info!("Loaded board '{}' with {} devices", board.name, board.devices.len());

    let mut engine = CheckEngine::new(options)?;
    let show_progress = cli.progress;
    let mut listener = |event: DrcEvent| {
        if !show_progress {
            return;
        }
        match event {
            DrcEvent::Status(status) => eprintln!("{}", status),
            DrcEvent::Progress(percent) => eprintln!("[{:>3}%]", percent),
            _ => {}
        }
    };
    let report = engine.run(&board, &mut SnapshotServices, &mut listener)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for violation in &report.violations {
            let prefix = if violation.is_advisory() { "warning" } else { "error" };
            println!("{}: {}", prefix, violation.message);
        }
        println!(
            "{} message(s), {} advisory",
            report.violations.len(),
            report.advisory_count()
        );
    }

    let failed = report.violations.iter().any(|v| !v.is_advisory());
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
