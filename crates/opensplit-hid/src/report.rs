//! Command-report encoding for OpenSplit keyboards.
//!
//! Pure builders for the 64-byte host-to-device command reports.
//! Intentionally performs no I/O; the session layer prepends the hidraw
//! report-id byte and writes the frames.

/// Wire size of a command report, excluding the hidraw report-id byte.
pub const REPORT_SIZE: usize = 64;

/// Numbered report id used on the hidraw node (0 = unnumbered).
pub const REPORT_ID: u8 = 0;

/// Payload bytes carried by one data-chunk report (command + length prefix).
pub const DATA_CHUNK_SIZE: usize = REPORT_SIZE - 2;

/// Longest accepted keymap abbreviation.
pub const MAX_KEYMAP_LEN: usize = 8;

/// Command bytes, one per report kind.
pub mod commands {
    /// Announce a bulk transfer: target byte + little-endian total length.
    pub const TRANSFER_BEGIN: u8 = 0x01;
    /// One chunk of bulk payload: length byte + data.
    pub const TRANSFER_DATA: u8 = 0x02;
    /// Close a bulk transfer for the given target.
    pub const TRANSFER_FINISH: u8 = 0x03;
    /// Persist the hardware configuration flag (ISO layout).
    pub const SET_HARDWARE_CONFIG: u8 = 0x04;
    /// Select a keymap by abbreviation.
    pub const SWITCH_KEYMAP: u8 = 0x05;
}

/// Destination of a bulk transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferTarget {
    /// Right-unit firmware image.
    RightUnit,
    /// Left-module firmware image.
    LeftModule,
    /// User configuration blob.
    UserConfig,
}

impl TransferTarget {
    /// Wire encoding of the target.
    pub fn as_byte(self) -> u8 {
        match self {
            TransferTarget::RightUnit => 0x01,
            TransferTarget::LeftModule => 0x02,
            TransferTarget::UserConfig => 0x03,
        }
    }
}

/// Encode a transfer-begin report.
///
/// Layout:
/// - Byte 0: command (`0x01`)
/// - Byte 1: target
/// - Bytes 2-5: total payload length (`u32`, little-endian)
pub fn transfer_begin(target: TransferTarget, total_len: u32) -> [u8; REPORT_SIZE] {
    let mut frame = [0u8; REPORT_SIZE];
    frame[0] = commands::TRANSFER_BEGIN;
    frame[1] = target.as_byte();
    frame[2..6].copy_from_slice(&total_len.to_le_bytes());
    frame
}

/// Encode one data-chunk report. Chunks longer than [`DATA_CHUNK_SIZE`]
/// are truncated; the session layer never produces such chunks.
///
/// Layout:
/// - Byte 0: command (`0x02`)
/// - Byte 1: chunk length
/// - Bytes 2..2+len: payload, zero-padded to the report size
pub fn transfer_data(chunk: &[u8]) -> [u8; REPORT_SIZE] {
    let mut frame = [0u8; REPORT_SIZE];
    frame[0] = commands::TRANSFER_DATA;
    let len = chunk.len().min(DATA_CHUNK_SIZE);
    frame[1] = len as u8;
    if let (Some(dst), Some(src)) = (frame.get_mut(2..2 + len), chunk.get(..len)) {
        dst.copy_from_slice(src);
    }
    frame
}

/// Encode a transfer-finish report for the given target.
pub fn transfer_finish(target: TransferTarget) -> [u8; REPORT_SIZE] {
    let mut frame = [0u8; REPORT_SIZE];
    frame[0] = commands::TRANSFER_FINISH;
    frame[1] = target.as_byte();
    frame
}

/// Encode the hardware-configuration report (`true` = ISO layout).
pub fn hardware_config(iso: bool) -> [u8; REPORT_SIZE] {
    let mut frame = [0u8; REPORT_SIZE];
    frame[0] = commands::SET_HARDWARE_CONFIG;
    frame[1] = u8::from(iso);
    frame
}

/// Encode a keymap-switch report. Callers validate the name first with
/// [`is_valid_keymap_name`]; oversized names are truncated here.
///
/// Layout:
/// - Byte 0: command (`0x05`)
/// - Byte 1: name length
/// - Bytes 2..2+len: ASCII abbreviation
pub fn switch_keymap(name: &[u8]) -> [u8; REPORT_SIZE] {
    let mut frame = [0u8; REPORT_SIZE];
    frame[0] = commands::SWITCH_KEYMAP;
    let len = name.len().min(MAX_KEYMAP_LEN);
    frame[1] = len as u8;
    if let (Some(dst), Some(src)) = (frame.get_mut(2..2 + len), name.get(..len)) {
        dst.copy_from_slice(src);
    }
    frame
}

/// Whether a keymap abbreviation can be expressed on the wire: non-empty,
/// at most [`MAX_KEYMAP_LEN`] bytes, printable ASCII.
pub fn is_valid_keymap_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_KEYMAP_LEN && name.bytes().all(|b| b.is_ascii_graphic())
}
