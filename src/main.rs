//! Main entry point for the Paddle Ladder
//!
//! Parses arguments, merges configuration, initializes logging and runs either
//! a one-shot command or the interactive menu.

use anyhow::Result;
use clap::Parser;
use paddle_ladder::cli::{self, Args, Command};
use paddle_ladder::config::AppConfig;
use paddle_ladder::interactive;
use tracing::{debug, error};

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    match &args.command {
        None | Some(Command::Interactive) => interactive::run(config, args.match_type),
        Some(command) => {
            let ladder = cli::build_ladder(config, args.pool())?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            cli::execute(&ladder, command, &mut out)
        }
    }
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = cli::load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    debug!(
        "{} starting with data directory {}",
        config.service.name,
        config.storage.data_dir.display()
    );

    if let Err(e) = run(&args, &config) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
