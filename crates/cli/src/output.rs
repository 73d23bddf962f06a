//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use serde_json::json;

use opensplit_bundle::BundleManifest;
use opensplit_device_types::DeviceVariant;
use opensplit_update::{DetectedKeyboard, PlannedStep, UpdatePlan, UpdateReport};

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format error as JSON: {}", e),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    // Print error chain if available
    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Print detected keyboard list in specified format
pub fn print_device_list(keyboards: &[DetectedKeyboard], json: bool, detailed: bool) {
    if json {
        let output = json!({
            "success": true,
            "devices": keyboards
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format device list as JSON: {}", e),
        }
    } else {
        if keyboards.is_empty() {
            println!("{}", "No keyboards found".yellow());
            return;
        }

        println!("{}", "Detected Keyboards:".bold());
        for keyboard in keyboards {
            print_keyboard_human(keyboard, detailed);
        }
    }
}

/// Print single keyboard in human format
fn print_keyboard_human(keyboard: &DetectedKeyboard, detailed: bool) {
    println!(
        "  {} {} ({})",
        "●".green(),
        keyboard.variant.to_string().bold(),
        keyboard.node.display().to_string().dimmed()
    );

    if detailed {
        println!("    USB ID: {}", keyboard.usb_id);
        println!("    Device ID: {}", keyboard.variant.device_id());
        println!("    Reported Name: {}", keyboard.name);
    }
}

/// Print the detected keyboard a factory update will target
pub fn print_update_target(keyboard: &DetectedKeyboard) {
    println!(
        "  {} {}",
        "Keyboard:".bold(),
        keyboard.variant.to_string().cyan()
    );
    println!(
        "  {} {}",
        "Node:".bold(),
        keyboard.node.display().to_string().dimmed()
    );
}

/// Print an update plan in specified format
pub fn print_plan(plan: &UpdatePlan, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "plan": plan
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format plan as JSON: {}", e),
        }
    } else {
        println!("{} ({})", "Update Plan".bold(), plan.variant);
        println!("{}", "─".repeat(60));
        for (index, step) in plan.steps.iter().enumerate() {
            println!(
                "  {}. {:<16} {}",
                index + 1,
                step.kind().to_string().cyan(),
                describe_step(step).dimmed()
            );
        }
    }
}

fn describe_step(step: &PlannedStep) -> String {
    match step {
        PlannedStep::FlashRightUnit { image } => image.display().to_string(),
        PlannedStep::FlashLeftModule { image } => image.display().to_string(),
        PlannedStep::WriteUserConfig { config } => config.display().to_string(),
        PlannedStep::WriteHardwareConfig { iso } => {
            format!("layout = {}", if *iso { "iso" } else { "ansi" })
        }
        PlannedStep::SwitchKeymap { keymap } => format!("keymap = {}", keymap),
    }
}

/// Print the result of a completed factory update
pub fn print_report(report: &UpdateReport, manifest: &BundleManifest, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "bundle": manifest.name,
            "version": manifest.version.to_string(),
            "report": report
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format report as JSON: {}", e),
        }
    } else {
        println!();
        println!("{}", "═".repeat(60));
        println!("{} {}", "✓".green(), "All done.".bold());
        println!(
            "  {} {}",
            "Firmware Version:".bold(),
            manifest.version.to_string().green()
        );
        println!(
            "  {} {:.1} s",
            "Elapsed:".bold(),
            report.duration_ms as f64 / 1000.0
        );
    }
}

/// Print a bundle manifest with per-variant support
pub fn print_manifest(manifest: &BundleManifest, json: bool) {
    if json {
        let supported: Vec<String> = DeviceVariant::ALL
            .iter()
            .filter(|variant| manifest.device_entry(variant.device_id()).is_some())
            .map(|variant| variant.to_string())
            .collect();
        let output = json!({
            "success": true,
            "manifest": manifest,
            "supported_variants": supported
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format manifest as JSON: {}", e),
        }
    } else {
        println!("{}", "Release Bundle".bold());
        println!("{}", "═".repeat(60));
        println!("  {} {}", "Name:".bold(), manifest.name);
        println!(
            "  {} {}",
            "Version:".bold(),
            manifest.version.to_string().green()
        );
        println!();
        println!("  {}:", "Variant Support".bold());
        for variant in DeviceVariant::ALL {
            match manifest.device_entry(variant.device_id()) {
                Some(entry) => println!(
                    "    {} {} ({})",
                    "●".green(),
                    variant,
                    entry.name.dimmed()
                ),
                None => println!("    {} {} {}", "○".dimmed(), variant, "not in manifest".dimmed()),
            }
        }
    }
}

/// Get error type name for JSON output
fn error_type_name(error: &Error) -> String {
    format!("{:?}", error)
        .split('(')
        .next()
        .unwrap_or("Unknown")
        .to_string()
}
