//! Error types for bundle loading and resolution

use std::path::PathBuf;

use opensplit_device_types::DeviceVariant;
use thiserror::Error;

/// Errors raised while loading a bundle or resolving its artifacts.
#[derive(Error, Debug)]
pub enum BundleError {
    /// Neither `manifest.json` nor `manifest.json.gz` exists in the bundle.
    #[error("no bundle manifest found in {}", .dir.display())]
    ManifestMissing { dir: PathBuf },

    /// The manifest exists but is not valid JSON for the expected schema.
    #[error("failed to parse bundle manifest {}: {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest has no `devices[]` entry for the detected variant.
    #[error("bundle {bundle:?} does not contain firmware for {variant}")]
    UnsupportedDevice { bundle: String, variant: DeviceVariant },

    /// A gzipped member could not be decompressed.
    #[error("failed to unpack {}: {source}", .path.display())]
    Unpack {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem access failed outside the cases above.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
