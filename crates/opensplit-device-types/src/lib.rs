//! Device types for OpenSplit keyboard hardware
//!
//! This crate provides the fundamental identity types shared by every other
//! OpenSplit crate: which keyboard variant is attached, which physical key
//! layout it carries, and the well-known names baked into release bundles
//! and stock firmware.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

mod layout;
mod variant;

pub use layout::{KeyboardLayout, LayoutParseError};
pub use variant::{DeviceVariant, UsbId};

/// Keymap slot present in every stock firmware image.
///
/// The factory-update flow always finishes by switching the keyboard to this
/// keymap so a unit leaves the line in a state the test jig understands.
pub const FACTORY_TEST_KEYMAP: &str = "FTY";
