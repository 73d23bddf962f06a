//! splitctl - OpenSplit factory update CLI
//!
//! Command-line interface for flashing OpenSplit keyboards on the factory
//! line: resolve a release bundle, validate it for the detected variant,
//! and drive the fixed five-step update sequence.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{BundleCommands, DeviceCommands};

#[derive(Parser)]
#[command(name = "splitctl")]
#[command(about = "OpenSplit factory update CLI - Flash and provision split keyboards")]
#[command(version)]
#[command(long_about = "
splitctl drives the OpenSplit factory update flow: it resolves a release
bundle for the detected keyboard variant, validates the bundle before any
device contact, then flashes the right unit, the left module, restores the
user and hardware configuration, and switches to the factory-test keymap.

Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(long, global = true, help = "Output in JSON format for machine parsing")]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full factory update on the first detected keyboard
    FactoryUpdate {
        /// Release bundle directory
        bundle: PathBuf,

        /// Key layout to restore ("ansi" or "iso")
        layout: String,

        /// Resolve and validate the bundle, print the plan, touch no device
        #[arg(long)]
        dry_run: bool,
    },

    /// Device discovery commands
    #[command(subcommand)]
    Device(DeviceCommands),

    /// Release bundle commands
    #[command(subcommand)]
    Bundle(BundleCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("splitctl={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let result = execute_command(&cli).await;

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            std::process::exit(error::exit_code_for(&e));
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::FactoryUpdate {
            bundle,
            layout,
            dry_run,
        } => commands::factory_update::execute(bundle, layout, *dry_run, cli.json).await,
        Commands::Device(cmd) => commands::device::execute(cmd, cli.json).await,
        Commands::Bundle(cmd) => commands::bundle::execute(cmd, cli.json).await,
    }
}
