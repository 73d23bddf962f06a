//! The update plan: the fixed step sequence as inspectable data
//!
//! The factory flow always performs the same five steps in the same order.
//! Building the sequence as a value (rather than burying it in control
//! flow) lets callers inspect, log and dry-run exactly what a run will do
//! before any device contact happens.

use std::path::PathBuf;

use opensplit_bundle::ResolvedArtifacts;
use opensplit_device_types::{DeviceVariant, FACTORY_TEST_KEYMAP, KeyboardLayout};
use serde::{Deserialize, Serialize};

/// Identity of one update step; `Display` gives the canonical step name
/// used in logs, failure reports and exit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    /// Flash the right-unit firmware.
    RightFlash,
    /// Flash the left-module firmware through the right unit.
    LeftFlash,
    /// Restore the user configuration blob.
    UserConfig,
    /// Restore the hardware configuration (key layout flag).
    HardwareConfig,
    /// Switch to the factory-test keymap.
    KeymapSwitch,
}

impl StepKind {
    /// Every step, in execution order.
    pub const ORDERED: [StepKind; 5] = [
        StepKind::RightFlash,
        StepKind::LeftFlash,
        StepKind::UserConfig,
        StepKind::HardwareConfig,
        StepKind::KeymapSwitch,
    ];

    /// Canonical kebab-case step name.
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::RightFlash => "right-flash",
            StepKind::LeftFlash => "left-flash",
            StepKind::UserConfig => "user-config",
            StepKind::HardwareConfig => "hardware-config",
            StepKind::KeymapSwitch => "keymap-switch",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planned step together with the exact arguments it will execute with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum PlannedStep {
    /// Flash the right unit from the resolved image.
    #[serde(rename = "right-flash")]
    FlashRightUnit {
        /// Resolved right-unit firmware image.
        image: PathBuf,
    },
    /// Flash the left module from the resolved image.
    #[serde(rename = "left-flash")]
    FlashLeftModule {
        /// Resolved left-module firmware image.
        image: PathBuf,
    },
    /// Write the user configuration; bytes are read once at execution.
    #[serde(rename = "user-config")]
    WriteUserConfig {
        /// Resolved configuration blob.
        config: PathBuf,
    },
    /// Write the hardware configuration flag.
    #[serde(rename = "hardware-config")]
    WriteHardwareConfig {
        /// `true` selects the ISO layout, `false` ANSI.
        iso: bool,
    },
    /// Activate a keymap by its slot abbreviation.
    #[serde(rename = "keymap-switch")]
    SwitchKeymap {
        /// Keymap slot to activate.
        keymap: String,
    },
}

impl PlannedStep {
    /// The step identity this planned step executes.
    pub fn kind(&self) -> StepKind {
        match self {
            PlannedStep::FlashRightUnit { .. } => StepKind::RightFlash,
            PlannedStep::FlashLeftModule { .. } => StepKind::LeftFlash,
            PlannedStep::WriteUserConfig { .. } => StepKind::UserConfig,
            PlannedStep::WriteHardwareConfig { .. } => StepKind::HardwareConfig,
            PlannedStep::SwitchKeymap { .. } => StepKind::KeymapSwitch,
        }
    }
}

/// Ordered factory-update plan for one keyboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatePlan {
    /// Variant the plan was built for.
    pub variant: DeviceVariant,
    /// The steps, in execution order. Always the full five-step sequence.
    pub steps: Vec<PlannedStep>,
}

impl UpdatePlan {
    /// Build the plan for resolved artifacts and a validated layout.
    ///
    /// The sequence is fixed: right flash, left flash, user config,
    /// hardware config, keymap switch to the factory-test slot.
    pub fn build(
        variant: DeviceVariant,
        artifacts: &ResolvedArtifacts,
        layout: KeyboardLayout,
    ) -> Self {
        let steps = vec![
            PlannedStep::FlashRightUnit {
                image: artifacts.right_image.clone(),
            },
            PlannedStep::FlashLeftModule {
                image: artifacts.left_image.clone(),
            },
            PlannedStep::WriteUserConfig {
                config: artifacts.user_config.clone(),
            },
            PlannedStep::WriteHardwareConfig {
                iso: layout.is_iso(),
            },
            PlannedStep::SwitchKeymap {
                keymap: FACTORY_TEST_KEYMAP.to_string(),
            },
        ];
        UpdatePlan { variant, steps }
    }
}
