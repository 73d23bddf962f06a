//! Physical key layout selection

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physical key layout of a unit, restored during factory updates.
///
/// The hardware configuration area stores this as a single flag
/// (`true` = ISO), which is what [`KeyboardLayout::is_iso`] feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardLayout {
    Ansi,
    Iso,
}

/// Rejected layout token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported layout {value:?}: expected \"ansi\" or \"iso\"")]
pub struct LayoutParseError {
    /// The token as given.
    pub value: String,
}

impl KeyboardLayout {
    /// Hardware-configuration flag value for this layout.
    pub fn is_iso(self) -> bool {
        matches!(self, KeyboardLayout::Iso)
    }

    /// Canonical lowercase token.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyboardLayout::Ansi => "ansi",
            KeyboardLayout::Iso => "iso",
        }
    }
}

impl std::str::FromStr for KeyboardLayout {
    type Err = LayoutParseError;

    // Exactly two tokens, no trimming or case folding. The factory flow
    // reports anything else as a failed precondition, so the error must
    // carry the offending value verbatim.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ansi" => Ok(KeyboardLayout::Ansi),
            "iso" => Ok(KeyboardLayout::Iso),
            other => Err(LayoutParseError {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for KeyboardLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
