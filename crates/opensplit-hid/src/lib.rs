//! Linux hidraw adapter for OpenSplit keyboards.
//!
//! Discovery ([`HidDiscovery`]) only ever reads sysfs; it never opens a
//! device node. Opening happens in [`HidSession`], which owns the hidraw
//! file handle for the duration of an update and releases it on drop.
//!
//! Report framing lives in [`report`] as pure, I/O-free builders so the
//! wire layout stays testable without hardware.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod discovery;
pub mod report;
pub mod session;

pub use discovery::{DEV_DIR_ENV, HidDiscovery, SYS_DIR_ENV};
pub use session::HidSession;
