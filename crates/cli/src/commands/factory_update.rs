//! Factory update command
//!
//! Drives the full update flow against the first detected keyboard:
//! resolve the bundle, validate it, then flash right unit, left module,
//! user configuration, hardware configuration, and switch to the
//! factory-test keymap. `--dry-run` stops after printing the plan.

use std::path::Path;

use anyhow::Result;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast;

use opensplit_bundle::{manifest, resolve};
use opensplit_hid::{HidDiscovery, HidSession};
use opensplit_update::{
    KeyboardDiscovery, StepKind, UpdateEngine, UpdatePlan, UpdateProgress, UpdateState,
    factory_update, validate,
};

use crate::output;

/// Execute the factory-update command
pub async fn execute(bundle: &Path, layout: &str, dry_run: bool, json: bool) -> Result<()> {
    let discovery = HidDiscovery::new();
    let keyboard = discovery.detect().await?;

    // Loaded up front for the pre-flight display and the final report;
    // the flow itself re-reads it during resolution.
    let bundle_manifest = manifest::load(bundle)?;

    if !json {
        println!("{}", "Factory Update".bold());
        println!("{}", "═".repeat(60));
        println!();
        output::print_update_target(&keyboard);
        println!("  {} {}", "Bundle:".bold(), bundle_manifest.name);
        println!(
            "  {} {}",
            "Firmware Version:".bold(),
            bundle_manifest.version.to_string().green()
        );
        println!();
    }

    if dry_run {
        let artifacts = resolve(bundle, keyboard.variant)?;
        let parsed_layout = validate(&artifacts, layout)?;
        let plan = UpdatePlan::build(keyboard.variant, &artifacts, parsed_layout);
        output::print_plan(&plan, json);
        if !json {
            println!();
            println!("{}", "Dry run: no device was touched.".dimmed());
        }
        return Ok(());
    }

    let engine = UpdateEngine::new();
    let progress_task =
        (!json).then(|| tokio::spawn(drive_progress(engine.subscribe_progress())));

    let result = factory_update(&engine, bundle, layout, keyboard.variant, || {
        HidSession::open(&keyboard)
    })
    .await;

    match result {
        Ok(report) => {
            if let Some(task) = progress_task {
                let _ = task.await;
            }
            output::print_report(&report, &bundle_manifest, json);
            Ok(())
        }
        Err(e) => {
            // The run may have ended before any progress event was sent.
            if let Some(task) = progress_task {
                task.abort();
            }
            Err(e.into())
        }
    }
}

/// Render engine progress as a step bar until a terminal state arrives.
async fn drive_progress(mut progress: broadcast::Receiver<UpdateProgress>) {
    let bar = ProgressBar::new(StepKind::ORDERED.len() as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("█▓░"));
    }

    while let Ok(snapshot) = progress.recv().await {
        bar.set_position(snapshot.steps_done as u64);
        bar.set_message(snapshot.state.to_string());

        match &snapshot.state {
            UpdateState::Done => {
                bar.finish_with_message(format!("{} update complete", "✓".green()));
                break;
            }
            UpdateState::Failed { .. } => {
                bar.abandon_with_message(format!("{} {}", "✗".red(), snapshot.state));
                break;
            }
            _ => {}
        }
    }
}
