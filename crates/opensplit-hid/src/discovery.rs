//! Keyboard discovery over /dev/hidraw* and sysfs.

use std::env;
use std::path::PathBuf;

use opensplit_device_types::{DeviceVariant, UsbId};
use opensplit_update::{DetectedKeyboard, DiscoveryError, KeyboardDiscovery};
use tracing::{debug, trace, warn};

/// Overrides the directory scanned for `hidraw*` nodes (default `/dev`).
pub const DEV_DIR_ENV: &str = "OPENSPLIT_HIDRAW_DEV_DIR";

/// Overrides the sysfs class directory (default `/sys/class/hidraw`).
pub const SYS_DIR_ENV: &str = "OPENSPLIT_HIDRAW_SYS_DIR";

const DEFAULT_DEV_DIR: &str = "/dev";
const DEFAULT_SYS_DIR: &str = "/sys/class/hidraw";

/// Sysfs-backed keyboard discovery.
///
/// Scanning reads `device/uevent` under the sysfs root for every
/// `hidraw*` node and keeps the ones whose USB id maps to a
/// [`DeviceVariant`]. The device nodes themselves are never opened.
#[derive(Debug, Clone)]
pub struct HidDiscovery {
    dev_dir: PathBuf,
    sys_dir: PathBuf,
}

impl HidDiscovery {
    /// Discovery rooted at `/dev` and `/sys/class/hidraw`, unless the
    /// [`DEV_DIR_ENV`] / [`SYS_DIR_ENV`] overrides are set.
    pub fn new() -> Self {
        Self {
            dev_dir: env::var_os(DEV_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DEV_DIR)),
            sys_dir: env::var_os(SYS_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SYS_DIR)),
        }
    }

    /// Discovery rooted at explicit directories, ignoring the environment.
    pub fn with_roots(dev_dir: impl Into<PathBuf>, sys_dir: impl Into<PathBuf>) -> Self {
        Self {
            dev_dir: dev_dir.into(),
            sys_dir: sys_dir.into(),
        }
    }

    /// Enumerate every supported keyboard, sorted by node name.
    pub fn scan(&self) -> Result<Vec<DetectedKeyboard>, DiscoveryError> {
        let mut nodes: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(&self.dev_dir)? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.starts_with("hidraw") {
                nodes.push(name);
            }
        }
        // Node order from read_dir is arbitrary; sort so that repeated
        // scans and first-match detection are deterministic.
        nodes.sort();

        let mut found = Vec::new();
        for node in &nodes {
            match self.probe(node) {
                Some(keyboard) => {
                    debug!(node, variant = %keyboard.variant, "found supported keyboard");
                    found.push(keyboard);
                }
                None => trace!(node, "skipping unrelated hidraw node"),
            }
        }
        debug!(scanned = nodes.len(), found = found.len(), "hidraw scan complete");
        Ok(found)
    }

    fn probe(&self, node: &str) -> Option<DetectedKeyboard> {
        let uevent = self.sys_dir.join(node).join("device").join("uevent");
        let text = std::fs::read_to_string(&uevent).ok()?;
        let (usb_id, name) = parse_uevent(&text)?;
        let variant = DeviceVariant::from_usb_id(usb_id.vendor_id, usb_id.product_id)?;
        Some(DetectedKeyboard {
            variant,
            node: self.dev_dir.join(node),
            usb_id,
            name,
        })
    }
}

impl Default for HidDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl KeyboardDiscovery for HidDiscovery {
    async fn detect(&self) -> Result<DetectedKeyboard, DiscoveryError> {
        let found = self.scan()?;
        if found.len() > 1 {
            warn!(count = found.len(), "multiple keyboards present; using the first");
        }
        found
            .into_iter()
            .next()
            .ok_or(DiscoveryError::NoDeviceFound)
    }
}

/// Extract the USB id and product name from a hidraw uevent file.
fn parse_uevent(text: &str) -> Option<(UsbId, String)> {
    let mut usb_id = None;
    let mut name = String::new();
    for line in text.lines() {
        if let Some(value) = line.strip_prefix("HID_ID=") {
            usb_id = parse_hid_id(value);
        } else if let Some(value) = line.strip_prefix("HID_NAME=") {
            name = value.trim().to_string();
        }
    }
    usb_id.map(|id| (id, name))
}

/// Parse the `HID_ID` value, `<bus>:<vendor>:<product>` in hex.
fn parse_hid_id(value: &str) -> Option<UsbId> {
    let mut parts = value.trim().split(':');
    let _bus = parts.next()?;
    let vendor_id = u16::try_from(u32::from_str_radix(parts.next()?, 16).ok()?).ok()?;
    let product_id = u16::try_from(u32::from_str_radix(parts.next()?, 16).ok()?).ok()?;
    Some(UsbId {
        vendor_id,
        product_id,
    })
}
