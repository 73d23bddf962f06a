//! Port traits for the update pipeline's external collaborators
//!
//! These traits are the seams between orchestration logic and the world:
//! production code plugs in the hidraw adapter, tests plug in recording
//! fakes. The engine itself never touches hardware directly.

use std::path::{Path, PathBuf};

use opensplit_device_types::{DeviceVariant, UsbId};
use serde::Serialize;

use crate::error::{DeviceError, DiscoveryError};

/// Write-side operations a connected keyboard exposes during a factory
/// update.
///
/// This trait defines the contract the update engine drives. Flash
/// operations take the resolved image path and read it themselves; the user
/// configuration arrives as opaque bytes the engine read exactly once.
/// Implementations must not retry internally: the flow is fail-fast and the
/// engine owns failure semantics.
#[async_trait::async_trait]
pub trait DeviceOps: Send + Sync {
    /// Flash the right-unit firmware image.
    async fn flash_right_unit(&self, image: &Path) -> Result<(), DeviceError>;

    /// Flash the left-module firmware image through the right unit.
    async fn flash_left_module(&self, image: &Path) -> Result<(), DeviceError>;

    /// Write the user configuration area.
    async fn write_user_config(&self, config: &[u8]) -> Result<(), DeviceError>;

    /// Write the hardware configuration flag (`true` = ISO layout).
    async fn write_hardware_config(&self, iso: bool) -> Result<(), DeviceError>;

    /// Activate the keymap with the given slot abbreviation.
    async fn switch_keymap(&self, keymap: &str) -> Result<(), DeviceError>;
}

/// Locates an attached, supported keyboard.
///
/// Discovery is read-only: implementations identify hardware without
/// opening the device node, so running it implies no device contact.
#[async_trait::async_trait]
pub trait KeyboardDiscovery: Send + Sync {
    /// Find the first supported keyboard.
    async fn detect(&self) -> Result<DetectedKeyboard, DiscoveryError>;
}

/// A supported keyboard found by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedKeyboard {
    /// Which product variant is attached.
    pub variant: DeviceVariant,
    /// Device node the session will open (e.g. `/dev/hidraw3`).
    pub node: PathBuf,
    /// USB id the unit enumerated with.
    pub usb_id: UsbId,
    /// Product name the unit advertises.
    pub name: String,
}
