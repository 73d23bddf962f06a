//! Release bundle manifest

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BundleError;

/// Manifest file name at the bundle root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Top-level release manifest.
///
/// `devices` is the support table: a variant is updatable from this bundle
/// only if its device id appears here. The entry's `name` selects the
/// right-unit artifact directory, so renamed products keep working with old
/// tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub name: String,
    pub version: semver::Version,
    #[serde(default)]
    pub devices: Vec<ManifestDevice>,
}

/// One supported device in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDevice {
    pub id: u16,
    pub name: String,
}

impl BundleManifest {
    /// Look up the device entry matching a variant's device id.
    pub fn device_entry(&self, device_id: u16) -> Option<&ManifestDevice> {
        self.devices.iter().find(|device| device.id == device_id)
    }

    /// Parse a manifest from raw JSON bytes.
    pub fn from_slice(path: &Path, bytes: &[u8]) -> Result<Self, BundleError> {
        serde_json::from_slice(bytes).map_err(|source| BundleError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load the manifest from a bundle root, accepting a gzipped manifest.
///
/// The plain file wins when both forms exist.
pub fn load(bundle_root: &Path) -> Result<BundleManifest, BundleError> {
    let plain = bundle_root.join(MANIFEST_FILE);
    if plain.is_file() {
        let bytes = std::fs::read(&plain)?;
        return BundleManifest::from_slice(&plain, &bytes);
    }

    let gzipped = bundle_root.join(format!("{MANIFEST_FILE}.gz"));
    if gzipped.is_file() {
        let file = std::fs::File::open(&gzipped)?;
        let mut decoder = flate2::read::GzDecoder::new(file);
        let mut bytes = Vec::new();
        decoder
            .read_to_end(&mut bytes)
            .map_err(|source| BundleError::Unpack {
                path: gzipped.clone(),
                source,
            })?;
        return BundleManifest::from_slice(&gzipped, &bytes);
    }

    Err(BundleError::ManifestMissing {
        dir: bundle_root.to_path_buf(),
    })
}
