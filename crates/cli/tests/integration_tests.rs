//! Integration tests for the splitctl CLI
//!
//! Every test runs the real binary against a bundle directory and a fake
//! hidraw tree selected via `OPENSPLIT_HIDRAW_DEV_DIR` /
//! `OPENSPLIT_HIDRAW_SYS_DIR`, so the device node is a plain file and no
//! hardware is required. Exit codes are asserted per failure class.

use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use opensplit_hid::report::{REPORT_SIZE, commands};
use opensplit_hid::{DEV_DIR_ENV, SYS_DIR_ENV};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One on-the-wire frame: report id byte plus the command report.
const WIRE_SIZE: usize = REPORT_SIZE + 1;

/// Custom predicate to check if output is valid JSON
fn is_json() -> impl predicates::Predicate<[u8]> {
    predicates::function::function(|s: &[u8]| {
        if let Ok(text) = std::str::from_utf8(s) {
            serde_json::from_str::<Value>(text).is_ok()
        } else {
            false
        }
    })
}

/// Test helper to create a splitctl command
fn splitctl() -> Command {
    let mut cmd = Command::cargo_bin("splitctl").unwrap();
    // Keep captured stdout deterministic regardless of the runner's env.
    cmd.env_remove("RUST_LOG");
    cmd
}

/// splitctl with discovery redirected into the fake hidraw tree
fn splitctl_at(dir: &TempDir) -> Command {
    let mut cmd = splitctl();
    cmd.env(DEV_DIR_ENV, dir.path().join("dev"));
    cmd.env(SYS_DIR_ENV, dir.path().join("sys"));
    cmd
}

/// Test helper to lay out a complete Split60 release bundle
fn create_test_bundle(dir: &TempDir) -> PathBuf {
    let root = dir.path().join("bundle");
    let manifest = serde_json::json!({
        "name": "opensplit-firmware",
        "version": "2.5.0",
        "devices": [
            { "id": 1, "name": "split60-right" }
        ]
    });

    fs::create_dir_all(root.join("devices").join("split60-right")).unwrap();
    fs::create_dir_all(root.join("modules")).unwrap();
    fs::write(
        root.join("manifest.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();
    fs::write(
        root.join("devices").join("split60-right").join("firmware.bin"),
        b"right unit image",
    )
    .unwrap();
    fs::write(
        root.join("modules").join("split60-left.bin"),
        b"left module image",
    )
    .unwrap();
    fs::write(
        root.join("devices").join("split60-right").join("config.bin"),
        b"user config blob",
    )
    .unwrap();
    root
}

/// Test helper to fake an attached keyboard; returns the device node path
fn create_fake_keyboard(dir: &TempDir, node: &str, hid_id: &str, hid_name: &str) -> PathBuf {
    let dev = dir.path().join("dev");
    let sys = dir.path().join("sys").join(node).join("device");
    fs::create_dir_all(&dev).unwrap();
    fs::create_dir_all(&sys).unwrap();
    fs::write(dev.join(node), b"").unwrap();
    fs::write(
        sys.join("uevent"),
        format!("DRIVER=hid-generic\nHID_ID={hid_id}\nHID_NAME={hid_name}\nHID_PHYS=usb-x\n"),
    )
    .unwrap();
    dev.join(node)
}

fn create_split60(dir: &TempDir) -> PathBuf {
    create_fake_keyboard(dir, "hidraw0", "0003:00001209:00005360", "OpenSplit Split60")
}

/// Test helper for a hidraw tree with nothing attached
fn create_empty_tree(dir: &TempDir) {
    fs::create_dir_all(dir.path().join("dev")).unwrap();
    fs::create_dir_all(dir.path().join("sys")).unwrap();
}

/// Split the fake node file into wire frames
fn wire_frames(node: &Path) -> Vec<Vec<u8>> {
    let bytes = fs::read(node).unwrap();
    assert_eq!(bytes.len() % WIRE_SIZE, 0, "partial report on the wire");
    bytes.chunks(WIRE_SIZE).map(<[u8]>::to_vec).collect()
}

#[test]
fn test_cli_help() {
    splitctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("OpenSplit factory update CLI"));
}

#[test]
fn test_cli_version() {
    splitctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("splitctl"));
}

// Device Discovery Tests

#[test]
fn test_device_list_human_output() {
    let tmp = TempDir::new().unwrap();
    create_split60(&tmp);

    splitctl_at(&tmp)
        .args(&["device", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Detected Keyboards"))
        .stdout(predicate::str::contains("Split60"));
}

#[test]
fn test_device_list_detailed() {
    let tmp = TempDir::new().unwrap();
    create_split60(&tmp);

    splitctl_at(&tmp)
        .args(&["device", "list", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("USB ID: 1209:5360"))
        .stdout(predicate::str::contains("Reported Name: OpenSplit Split60"));
}

#[test]
fn test_device_list_json_output() {
    let tmp = TempDir::new().unwrap();
    create_split60(&tmp);

    splitctl_at(&tmp)
        .args(&["--json", "device", "list"])
        .assert()
        .success()
        .stdout(is_json());

    // Verify JSON structure
    let output = splitctl_at(&tmp)
        .args(&["--json", "device", "list"])
        .output()
        .unwrap();

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], true);
    let devices = json["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["variant"], "Split60");
}

#[test]
fn test_device_list_with_nothing_attached() {
    let tmp = TempDir::new().unwrap();
    create_empty_tree(&tmp);

    splitctl_at(&tmp)
        .args(&["device", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No keyboards found"));
}

// Bundle Inspection Tests

#[test]
fn test_bundle_inspect() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);

    splitctl()
        .args(&["bundle", "inspect", bundle.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Release Bundle"))
        .stdout(predicate::str::contains("opensplit-firmware"))
        .stdout(predicate::str::contains("2.5.0"));
}

#[test]
fn test_bundle_inspect_json() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);

    let output = splitctl()
        .args(&["--json", "bundle", "inspect", bundle.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["manifest"]["name"], "opensplit-firmware");
    assert_eq!(json["supported_variants"][0], "Split60");
}

#[test]
fn test_bundle_inspect_missing_manifest() {
    let tmp = TempDir::new().unwrap();
    let empty = tmp.path().join("empty-bundle");
    fs::create_dir_all(&empty).unwrap();

    splitctl()
        .args(&["bundle", "inspect", empty.to_str().unwrap()])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("no bundle manifest"));
}

// Precondition Tests (exit code 1, zero device contact)

#[test]
fn test_missing_left_image_exits_before_device_contact() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);
    let node = create_split60(&tmp);
    fs::remove_file(bundle.join("modules").join("split60-left.bin")).unwrap();

    splitctl_at(&tmp)
        .args(&["factory-update", bundle.to_str().unwrap(), "ansi"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("left module image missing"));

    assert!(wire_frames(&node).is_empty(), "device node must stay untouched");
}

#[test]
fn test_invalid_layout_exits_before_device_contact() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);
    let node = create_split60(&tmp);

    splitctl_at(&tmp)
        .args(&["factory-update", bundle.to_str().unwrap(), "dvorak"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unsupported layout"));

    assert!(wire_frames(&node).is_empty(), "device node must stay untouched");
}

#[test]
fn test_empty_user_config_is_a_precondition_failure() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);
    let node = create_split60(&tmp);
    fs::write(
        bundle.join("devices").join("split60-right").join("config.bin"),
        b"",
    )
    .unwrap();

    splitctl_at(&tmp)
        .args(&["factory-update", bundle.to_str().unwrap(), "iso"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("user configuration is empty"));

    assert!(wire_frames(&node).is_empty(), "device node must stay untouched");
}

// Failure Class Tests

#[test]
fn test_missing_manifest_is_a_bundle_error() {
    let tmp = TempDir::new().unwrap();
    let empty = tmp.path().join("empty-bundle");
    fs::create_dir_all(&empty).unwrap();
    let node = create_split60(&tmp);

    splitctl_at(&tmp)
        .args(&["factory-update", empty.to_str().unwrap(), "ansi"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("no bundle manifest found"));

    assert!(wire_frames(&node).is_empty());
}

#[test]
fn test_unsupported_variant_is_a_bundle_error() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);
    // A Split40 shows up, but the bundle only carries Split60 firmware.
    let node = create_fake_keyboard(
        &tmp,
        "hidraw0",
        "0003:00001209:00005340",
        "OpenSplit Split40",
    );

    splitctl_at(&tmp)
        .args(&["factory-update", bundle.to_str().unwrap(), "ansi"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("does not contain firmware"));

    assert!(wire_frames(&node).is_empty());
}

#[test]
fn test_no_keyboard_is_a_discovery_error() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);
    create_empty_tree(&tmp);

    splitctl_at(&tmp)
        .args(&["factory-update", bundle.to_str().unwrap(), "ansi"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("no supported keyboard found"));
}

// Dry Run Tests

#[test]
fn test_dry_run_plans_without_touching_the_device() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);
    let node = create_split60(&tmp);

    splitctl_at(&tmp)
        .args(&["factory-update", bundle.to_str().unwrap(), "iso", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Update Plan"))
        .stdout(predicate::str::contains("right-flash"))
        .stdout(predicate::str::contains("left-flash"))
        .stdout(predicate::str::contains("user-config"))
        .stdout(predicate::str::contains("hardware-config"))
        .stdout(predicate::str::contains("keymap-switch"))
        .stdout(predicate::str::contains("layout = iso"))
        .stdout(predicate::str::contains("keymap = FTY"))
        .stdout(predicate::str::contains("Dry run: no device was touched."));

    assert!(wire_frames(&node).is_empty(), "dry run may not write reports");
}

// Full Update Flow Tests

#[test]
fn test_factory_update_happy_path() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);
    let node = create_split60(&tmp);

    splitctl_at(&tmp)
        .args(&["factory-update", bundle.to_str().unwrap(), "ansi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All done."))
        .stdout(predicate::str::contains("2.5.0"));

    // Three bulk transfers of three frames each, then the two single
    // reports, in step order.
    let frames = wire_frames(&node);
    assert_eq!(frames.len(), 11);
    assert_eq!(frames[0][1], commands::TRANSFER_BEGIN);
    assert_eq!(frames[9][1], commands::SET_HARDWARE_CONFIG);
    assert_eq!(frames[9][2], 0, "ansi writes the flag as false");
    assert_eq!(frames[10][1], commands::SWITCH_KEYMAP);
    assert_eq!(&frames[10][3..6], b"FTY");
}

#[test]
fn test_iso_layout_reaches_the_wire() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);
    let node = create_split60(&tmp);

    splitctl_at(&tmp)
        .args(&["factory-update", bundle.to_str().unwrap(), "iso"])
        .assert()
        .success();

    let frames = wire_frames(&node);
    assert_eq!(frames[9][1], commands::SET_HARDWARE_CONFIG);
    assert_eq!(frames[9][2], 1, "iso writes the flag as true");
}

#[test]
fn test_gzipped_left_module_updates_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);
    let node = create_split60(&tmp);

    fs::remove_file(bundle.join("modules").join("split60-left.bin")).unwrap();
    let gz = fs::File::create(bundle.join("modules").join("split60-left.bin.gz")).unwrap();
    let mut encoder = GzEncoder::new(gz, Compression::default());
    encoder.write_all(b"left module image").unwrap();
    encoder.finish().unwrap();

    splitctl_at(&tmp)
        .args(&["factory-update", bundle.to_str().unwrap(), "ansi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All done."));

    assert_eq!(wire_frames(&node).len(), 11);
}

#[test]
fn test_factory_update_json_report() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);
    create_split60(&tmp);

    let output = splitctl_at(&tmp)
        .args(&["--json", "factory-update", bundle.to_str().unwrap(), "ansi"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["bundle"], "opensplit-firmware");
    assert_eq!(json["version"], "2.5.0");
    let states = json["report"]["states"].as_array().unwrap();
    assert_eq!(states.len(), 7);
    assert_eq!(states[0], "Idle");
    assert_eq!(states[6], "Done");
}

// Usage Error Tests

#[test]
fn test_missing_layout_is_a_usage_error() {
    let tmp = TempDir::new().unwrap();
    let bundle = create_test_bundle(&tmp);

    splitctl()
        .args(&["factory-update", bundle.to_str().unwrap()])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_unknown_subcommand_is_a_usage_error() {
    splitctl().args(&["calibrate", "now"]).assert().failure().code(2);
}

// Verbose Logging Tests

#[test]
fn test_verbose_logging() {
    let tmp = TempDir::new().unwrap();
    create_split60(&tmp);

    splitctl_at(&tmp).args(&["-v", "device", "list"]).assert().success();

    splitctl_at(&tmp)
        .args(&["-vv", "device", "list"])
        .assert()
        .success();
}
