//! spot-tether CLI - interactive dual-channel spot measurement.
//!
//! Loads three channel stacks, walks the user through nucleus selection
//! and per-cell spot measurement, and appends results to the shared
//! results file configured in spot-tether.toml.

mod console;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;

use tether_core::config::ConfigManager;
use tether_core::imaging::load_stack;
use tether_core::logging::{init_tracing, LogConfig, LogLevel, SessionLoggerBuilder};
use tether_core::models::{ChannelStacks, SessionStatus};
use tether_core::pipeline::{create_standard_pipeline, Context, SessionError, SessionState};

use console::ConsoleInteraction;

#[derive(Parser)]
#[command(name = "spot-tether")]
#[command(
    about = "Measure fluorescent spots in two signal channels over user-selected nuclei"
)]
#[command(version)]
struct Cli {
    /// Reference (blue/DAPI) stack: an image file or a directory of slices.
    #[arg(long)]
    blue: PathBuf,

    /// Primary signal (green) stack: an image file or a directory of slices.
    #[arg(long)]
    green: PathBuf,

    /// Secondary signal (red) stack: an image file or a directory of slices.
    #[arg(long)]
    red: PathBuf,

    /// Session name used in the report header (defaults to the blue
    /// stack's file name).
    #[arg(long)]
    name: Option<String>,

    /// Path to the configuration file.
    #[arg(long, default_value = "spot-tether.toml")]
    config: PathBuf,

    /// Verbose logging.
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(SessionStatus::Completed) => ExitCode::SUCCESS,
        Ok(SessionStatus::Aborted) => {
            eprintln!("Session aborted by user.");
            ExitCode::from(2)
        }
        Ok(SessionStatus::Failed) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<SessionStatus> {
    init_tracing(if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    config.ensure_dirs_exist().context("creating directories")?;
    let settings = config.settings().clone();

    let session_name = cli.name.clone().unwrap_or_else(|| {
        cli.blue
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session".to_string())
    });

    println!("Loading channel stacks...");
    let stacks = ChannelStacks::new(
        load_stack(&cli.blue).context("loading reference stack")?,
        load_stack(&cli.green).context("loading primary stack")?,
        load_stack(&cli.red).context("loading secondary stack")?,
    );

    let log_config = LogConfig {
        level: if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        },
        compact: settings.logging.compact,
        progress_step: settings.logging.progress_step,
        show_timestamps: settings.logging.show_timestamps,
    };
    let logger = Arc::new(
        SessionLoggerBuilder::new(&session_name, config.logs_folder())
            .config(log_config)
            .build()
            .context("creating session logger")?,
    );

    let ctx = Context::new(
        stacks,
        settings.clone(),
        &session_name,
        PathBuf::from(&settings.paths.temp_root),
        config.report_path(),
        logger,
        Arc::new(ConsoleInteraction::new()),
    )
    .with_progress_callback(Box::new(|step, percent, message| {
        tracing::info!(step, percent, "{}", message);
    }));

    let pipeline = create_standard_pipeline();
    let mut state = SessionState::new(&session_name);

    match pipeline.run(&ctx, &mut state) {
        Ok(result) => {
            let output = state.measurement.as_ref();
            println!("\nSession finished.");
            println!("  Steps completed: {}", result.steps_completed.len());
            if let Some(output) = output {
                println!("  Cells measured:   {}", output.cells.len());
                println!("  Spot lines:       {}", output.spot_lines_written);
                println!("  Background lines: {}", output.background_lines_written);
            }
            println!("  Results file:     {}", ctx.report_path.display());
            Ok(SessionStatus::Completed)
        }
        Err(SessionError::Cancelled { .. }) => Ok(SessionStatus::Aborted),
        Err(e) => Err(e).context("measurement session failed"),
    }
}
