//! Device sessions over an open hidraw node.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use opensplit_update::{DetectedKeyboard, DeviceError, DeviceOps};
use tracing::{debug, info};

use crate::report::{self, DATA_CHUNK_SIZE, REPORT_ID, REPORT_SIZE, TransferTarget};

/// An open hidraw session. Owns the node's file handle from
/// [`HidSession::open`] until drop; dropping the session is what hands
/// the device back to the kernel on every exit path.
pub struct HidSession {
    file: File,
    node: PathBuf,
}

impl HidSession {
    /// Open the detected keyboard's hidraw node read/write.
    pub fn open(keyboard: &DetectedKeyboard) -> Result<Self, DeviceError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&keyboard.node)?;
        info!(
            node = %keyboard.node.display(),
            variant = %keyboard.variant,
            "device session open"
        );
        Ok(Self {
            file,
            node: keyboard.node.clone(),
        })
    }

    fn write_report(&self, frame: &[u8; REPORT_SIZE]) -> Result<(), DeviceError> {
        // hidraw write(2) expects the report id as the first byte.
        let mut wire = [0u8; REPORT_SIZE + 1];
        wire[0] = REPORT_ID;
        if let Some(body) = wire.get_mut(1..) {
            body.copy_from_slice(frame);
        }
        (&self.file).write_all(&wire)?;
        Ok(())
    }

    fn send_bulk(&self, target: TransferTarget, payload: &[u8]) -> Result<(), DeviceError> {
        let total = u32::try_from(payload.len())
            .map_err(|_| DeviceError::invalid_request("transfer payload exceeds 4 GiB"))?;
        self.write_report(&report::transfer_begin(target, total))?;
        for chunk in payload.chunks(DATA_CHUNK_SIZE) {
            self.write_report(&report::transfer_data(chunk))?;
        }
        self.write_report(&report::transfer_finish(target))?;
        debug!(bytes = payload.len(), target = ?target, "bulk transfer complete");
        Ok(())
    }

    async fn flash(&self, target: TransferTarget, image: &Path) -> Result<(), DeviceError> {
        let payload = tokio::fs::read(image).await?;
        debug!(
            bytes = payload.len(),
            image = %image.display(),
            target = ?target,
            "sending firmware image"
        );
        self.send_bulk(target, &payload)
    }
}

#[async_trait::async_trait]
impl DeviceOps for HidSession {
    async fn flash_right_unit(&self, image: &Path) -> Result<(), DeviceError> {
        self.flash(TransferTarget::RightUnit, image).await
    }

    async fn flash_left_module(&self, image: &Path) -> Result<(), DeviceError> {
        self.flash(TransferTarget::LeftModule, image).await
    }

    async fn write_user_config(&self, config: &[u8]) -> Result<(), DeviceError> {
        self.send_bulk(TransferTarget::UserConfig, config)
    }

    async fn write_hardware_config(&self, iso: bool) -> Result<(), DeviceError> {
        debug!(iso, "writing hardware configuration");
        self.write_report(&report::hardware_config(iso))
    }

    async fn switch_keymap(&self, keymap: &str) -> Result<(), DeviceError> {
        if !report::is_valid_keymap_name(keymap) {
            return Err(DeviceError::invalid_request(format!(
                "keymap name {keymap:?} is not a short ASCII abbreviation"
            )));
        }
        debug!(keymap, "switching keymap");
        self.write_report(&report::switch_keymap(keymap.as_bytes()))
    }
}

impl Drop for HidSession {
    fn drop(&mut self) {
        debug!(node = %self.node.display(), "device session closed");
    }
}
