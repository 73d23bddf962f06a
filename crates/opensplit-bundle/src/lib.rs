//! Release bundle handling for OpenSplit firmware tooling
//!
//! An OpenSplit release bundle is a directory (usually an unpacked release
//! download) holding `manifest.json` plus the per-device and per-module
//! artifacts a factory update needs. Distribution channels are free to gzip
//! individual members; this crate transparently materialises `.gz` artifacts
//! into a scratch directory whose lifetime is tied to the resolution result.
//!
//! # Modules
//!
//! - [`manifest`]: manifest schema and loading
//! - [`resolver`]: per-variant artifact resolution
//! - [`error`]: error types

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod manifest;
pub mod resolver;

pub use error::BundleError;
pub use manifest::{BundleManifest, MANIFEST_FILE, ManifestDevice};
pub use resolver::{ResolvedArtifacts, resolve};
