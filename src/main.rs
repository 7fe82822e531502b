//! traju - batch processing of MD trajectories with AmberTools cpptraj
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;
use traju::batch::Batch;
use traju::config::{CliArgs, RunConfig};
use traju::cpptraj::Cpptraj;
use traju::interrupt::{install_handler, Interrupt};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose, args.yes);

    // Validate and create config
    let config = RunConfig::from_args(args).context("Invalid configuration")?;

    // Setup signal handler for graceful shutdown
    let interrupt = Arc::new(Interrupt::new());
    install_handler(Arc::clone(&interrupt)).context("Failed to set signal handler")?;

    let tool = Cpptraj::locate(config.cpptraj.as_deref());
    let batch = Batch::new(config, tool)
        .context("Failed to resolve working directory")?
        .interrupt(interrupt);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    batch.run(&mut stdin.lock(), &mut stdout)?;

    Ok(())
}

fn setup_logging(verbose: bool, silent: bool) {
    let filter = if verbose {
        EnvFilter::new("traju=debug,warn")
    } else if silent {
        EnvFilter::new("traju=warn")
    } else {
        EnvFilter::new("traju=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
