//! Precondition validation for the factory-update flow
//!
//! Four checks run in a fixed order before any device contact: the three
//! resolved artifacts must exist as non-empty files, and the layout token
//! must parse. The first failure terminates validation; later checks do
//! not run, so the reported failure is always the earliest one.

use std::path::{Path, PathBuf};

use opensplit_bundle::ResolvedArtifacts;
use opensplit_device_types::{KeyboardLayout, LayoutParseError};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Which resolved artifact a precondition failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Right-unit firmware image.
    RightImage,
    /// Left-module firmware image.
    LeftImage,
    /// User configuration blob.
    UserConfig,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactKind::RightImage => "right firmware image",
            ArtifactKind::LeftImage => "left module image",
            ArtifactKind::UserConfig => "user configuration",
        };
        f.write_str(name)
    }
}

/// A failed precondition check.
///
/// Each variant names exactly what was wrong and where, so the operator can
/// fix the bundle without reading logs.
#[derive(Error, Debug)]
pub enum PreconditionError {
    /// The artifact does not exist as a regular file.
    #[error("{kind} missing: {}", .path.display())]
    Missing {
        /// Which artifact.
        kind: ArtifactKind,
        /// Resolved path that was checked.
        path: PathBuf,
    },

    /// The artifact exists but is zero bytes.
    #[error("{kind} is empty: {}", .path.display())]
    Empty {
        /// Which artifact.
        kind: ArtifactKind,
        /// Resolved path that was checked.
        path: PathBuf,
    },

    /// The layout token is not in the accepted set.
    #[error(transparent)]
    Layout(#[from] LayoutParseError),
}

/// Validate the factory-update preconditions.
///
/// Check order is fixed and observable: right image, left image, user
/// configuration, layout token. Returns the parsed layout on success.
///
/// # Errors
///
/// Returns the first failing check as a [`PreconditionError`]. No device
/// contact happens here or before here.
pub fn validate(
    artifacts: &ResolvedArtifacts,
    layout_token: &str,
) -> Result<KeyboardLayout, PreconditionError> {
    require_non_empty(ArtifactKind::RightImage, &artifacts.right_image)?;
    require_non_empty(ArtifactKind::LeftImage, &artifacts.left_image)?;
    require_non_empty(ArtifactKind::UserConfig, &artifacts.user_config)?;

    let layout: KeyboardLayout = layout_token.parse()?;
    debug!(%layout, "preconditions satisfied");
    Ok(layout)
}

fn require_non_empty(kind: ArtifactKind, path: &Path) -> Result<(), PreconditionError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => {
            return Err(PreconditionError::Missing {
                kind,
                path: path.to_path_buf(),
            });
        }
    };
    if metadata.len() == 0 {
        return Err(PreconditionError::Empty {
            kind,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
