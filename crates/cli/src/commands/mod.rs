//! Command implementations for splitctl CLI

pub mod bundle;
pub mod device;
pub mod factory_update;

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum DeviceCommands {
    /// List all detected keyboards
    List {
        /// Show detailed device information
        #[arg(short, long)]
        detailed: bool,
    },
}

#[derive(Subcommand)]
pub enum BundleCommands {
    /// Show bundle manifest and per-variant support
    Inspect {
        /// Release bundle directory
        bundle: PathBuf,
    },
}
