//! Per-variant artifact resolution
//!
//! Resolution turns `(bundle root, variant)` into the three concrete files a
//! factory update consumes. It is a pure path computation except for one
//! side effect: gzipped members are materialised into a scratch directory
//! owned by the result, so the extracted files disappear when the resolution
//! result goes out of scope.

use std::io;
use std::path::{Path, PathBuf};

use opensplit_device_types::DeviceVariant;
use tempfile::TempDir;
use tracing::debug;

use crate::error::BundleError;
use crate::manifest::{self, BundleManifest};

/// Artifact paths resolved for one variant.
///
/// Holds the scratch directory for any unpacked `.gz` members; dropping the
/// value removes the scratch and everything in it, on success and failure
/// paths alike.
#[derive(Debug)]
pub struct ResolvedArtifacts {
    pub manifest: BundleManifest,
    /// Right-unit firmware image (manifest-derived location).
    pub right_image: PathBuf,
    /// Left-module firmware image (conventional location).
    pub left_image: PathBuf,
    /// Opaque user configuration blob (conventional location).
    pub user_config: PathBuf,
    scratch: Option<TempDir>,
}

impl ResolvedArtifacts {
    /// Scratch directory backing unpacked members, if any were gzipped.
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }
}

/// Resolve the factory-update artifacts for `variant` inside `bundle_root`.
///
/// The right-unit image location comes from the manifest's `devices[]`
/// entry for the variant; the left-module image and user-config blob live
/// at conventional paths. Missing files are *not* an error here: the
/// precondition validator owns existence reporting. A manifest without an
/// entry for the variant, or a corrupt gzipped member, is an error.
///
/// # Errors
///
/// Returns [`BundleError`] when the manifest is missing or malformed, the
/// variant is unsupported by the bundle, or a `.gz` member fails to unpack.
pub fn resolve(
    bundle_root: &Path,
    variant: DeviceVariant,
) -> Result<ResolvedArtifacts, BundleError> {
    let manifest = manifest::load(bundle_root)?;

    let right_dir = manifest
        .device_entry(variant.device_id())
        .map(|entry| entry.name.clone())
        .ok_or_else(|| BundleError::UnsupportedDevice {
            bundle: manifest.name.clone(),
            variant,
        })?;

    let right_rel = Path::new("devices").join(&right_dir).join("firmware.bin");
    let left_rel = Path::new("modules").join(format!("{}.bin", variant.left_module_name()));
    let config_rel = Path::new("devices")
        .join(variant.right_unit_name())
        .join("config.bin");

    let mut scratch = None;
    let right_image = materialize(bundle_root, &right_rel, &mut scratch)?;
    let left_image = materialize(bundle_root, &left_rel, &mut scratch)?;
    let user_config = materialize(bundle_root, &config_rel, &mut scratch)?;

    debug!(
        variant = %variant,
        right = %right_image.display(),
        left = %left_image.display(),
        config = %user_config.display(),
        "resolved bundle artifacts"
    );

    Ok(ResolvedArtifacts {
        manifest,
        right_image,
        left_image,
        user_config,
        scratch,
    })
}

/// Return the path a bundle member resolves to, unpacking `<rel>.gz` into
/// the scratch directory when only the gzipped form exists.
fn materialize(
    root: &Path,
    rel: &Path,
    scratch: &mut Option<TempDir>,
) -> Result<PathBuf, BundleError> {
    let plain = root.join(rel);
    if plain.is_file() {
        return Ok(plain);
    }

    let gzipped = {
        let mut os = plain.clone().into_os_string();
        os.push(".gz");
        PathBuf::from(os)
    };
    if !gzipped.is_file() {
        // Neither form exists; hand back the plain path and let the
        // precondition validator report it.
        return Ok(plain);
    }

    let scratch_root = match scratch.as_ref() {
        Some(dir) => dir.path().to_path_buf(),
        None => {
            let created = tempfile::Builder::new()
                .prefix("opensplit-bundle-")
                .tempdir()?;
            let root = created.path().to_path_buf();
            *scratch = Some(created);
            root
        }
    };

    // Mirror the bundle-relative layout under the scratch root so resolved
    // paths stay a deterministic function of the inputs.
    let target = scratch_root.join(rel);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    unpack_gz(&gzipped, &target)?;
    debug!(member = %gzipped.display(), "unpacked gzipped bundle member");
    Ok(target)
}

fn unpack_gz(gzipped: &Path, target: &Path) -> Result<(), BundleError> {
    let source = std::fs::File::open(gzipped)?;
    let mut decoder = flate2::read::GzDecoder::new(source);
    let mut out = std::fs::File::create(target)?;
    io::copy(&mut decoder, &mut out).map_err(|source| BundleError::Unpack {
        path: gzipped.to_path_buf(),
        source,
    })?;
    Ok(())
}
