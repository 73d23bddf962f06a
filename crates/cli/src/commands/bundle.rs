//! Release bundle commands

use std::path::Path;

use anyhow::Result;

use opensplit_bundle::manifest;

use crate::commands::BundleCommands;
use crate::output;

/// Execute bundle command
pub async fn execute(cmd: &BundleCommands, json: bool) -> Result<()> {
    match cmd {
        BundleCommands::Inspect { bundle } => inspect_bundle(bundle, json),
    }
}

/// Show the manifest and which variants the bundle can update
fn inspect_bundle(bundle: &Path, json: bool) -> Result<()> {
    let bundle_manifest = manifest::load(bundle)?;
    output::print_manifest(&bundle_manifest, json);
    Ok(())
}
