mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use std::error::Error as _;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("🚀 Ringtail CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        Commands::Write(args) => {
            info!("Dispatching to 'write' command.");
            commands::write::run(args)
        }
        Commands::Read(args) => {
            info!("Dispatching to 'read' command.");
            commands::read::run(args)
        }
        Commands::Selectivity(args) => {
            info!("Dispatching to 'selectivity' command.");
            commands::selectivity::run(args)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => {
            error!("❌ Command failed: {}", e);
            debug!("Error chain: {}", error_chain(e));
        }
    }
    command_result
}

fn error_chain(err: &CliError) -> String {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain.join(" <- ")
}
