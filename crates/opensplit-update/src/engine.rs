//! The update engine: state machine and progress reporting
//!
//! The engine executes an [`UpdatePlan`] against a [`DeviceOps`]
//! implementation, transitioning through a fixed forward-only state
//! sequence and broadcasting progress after every transition. The first
//! failing step moves the machine to `Failed` and aborts the remainder.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tracing::{info, trace, warn};

use crate::error::UpdateError;
use crate::plan::{PlannedStep, StepKind, UpdatePlan};
use crate::ports::DeviceOps;
use opensplit_device_types::DeviceVariant;

/// Current state of a factory update.
///
/// Transitions are forward-only:
/// `Idle → RightFlashing → LeftFlashing → RestoringUserConfig →
/// RestoringHardwareConfig → SwitchingKeymap → Done`, with `Failed` as the
/// only other terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateState {
    /// No update in progress.
    #[default]
    Idle,
    /// Flashing the right-unit firmware.
    RightFlashing,
    /// Flashing the left-module firmware.
    LeftFlashing,
    /// Writing the user configuration area.
    RestoringUserConfig,
    /// Writing the hardware configuration flag.
    RestoringHardwareConfig,
    /// Activating the factory-test keymap.
    SwitchingKeymap,
    /// All steps completed.
    Done,
    /// A step failed; the run was aborted.
    Failed {
        /// The step that failed.
        step: StepKind,
        /// Rendered cause.
        error: String,
    },
}

impl UpdateState {
    /// Whether an update is currently executing a step.
    pub fn is_in_progress(&self) -> bool {
        !matches!(
            self,
            UpdateState::Idle | UpdateState::Done | UpdateState::Failed { .. }
        )
    }

    /// Whether this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UpdateState::Done | UpdateState::Failed { .. })
    }

    /// The in-progress state a step executes under.
    pub fn for_step(step: StepKind) -> UpdateState {
        match step {
            StepKind::RightFlash => UpdateState::RightFlashing,
            StepKind::LeftFlash => UpdateState::LeftFlashing,
            StepKind::UserConfig => UpdateState::RestoringUserConfig,
            StepKind::HardwareConfig => UpdateState::RestoringHardwareConfig,
            StepKind::KeymapSwitch => UpdateState::SwitchingKeymap,
        }
    }
}

impl std::fmt::Display for UpdateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateState::Idle => f.write_str("idle"),
            UpdateState::RightFlashing => f.write_str("flashing right unit"),
            UpdateState::LeftFlashing => f.write_str("flashing left module"),
            UpdateState::RestoringUserConfig => f.write_str("restoring user configuration"),
            UpdateState::RestoringHardwareConfig => f.write_str("restoring hardware configuration"),
            UpdateState::SwitchingKeymap => f.write_str("switching keymap"),
            UpdateState::Done => f.write_str("done"),
            UpdateState::Failed { step, .. } => write!(f, "failed at {step}"),
        }
    }
}

/// Progress snapshot broadcast after every state transition.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateProgress {
    /// State just entered.
    pub state: UpdateState,
    /// Steps completed so far.
    pub steps_done: usize,
    /// Total steps in the plan.
    pub steps_total: usize,
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    /// Variant that was updated.
    pub variant: DeviceVariant,
    /// Every state visited, in order, `Idle` first and `Done` last.
    pub states: Vec<UpdateState>,
    /// When the run started.
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
}

/// Executes update plans with observable state and progress.
pub struct UpdateEngine {
    state: Arc<RwLock<UpdateState>>,
    progress_tx: broadcast::Sender<UpdateProgress>,
}

impl UpdateEngine {
    /// Create an idle engine.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(16);
        Self {
            state: Arc::new(RwLock::new(UpdateState::Idle)),
            progress_tx,
        }
    }

    /// Subscribe to progress snapshots.
    pub fn subscribe_progress(&self) -> broadcast::Receiver<UpdateProgress> {
        self.progress_tx.subscribe()
    }

    /// The state most recently entered.
    pub async fn current_state(&self) -> UpdateState {
        self.state.read().await.clone()
    }

    /// Execute a plan against a device session.
    ///
    /// States are entered *before* their device operation runs; the first
    /// failure transitions to `Failed` and aborts the remainder of the
    /// plan. On success the report carries the complete visited-state
    /// sequence.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] naming the failed step and its cause.
    pub async fn run(
        &self,
        plan: &UpdatePlan,
        device: &dyn DeviceOps,
    ) -> Result<UpdateReport, UpdateError> {
        let started_at = chrono::Utc::now();
        let started = std::time::Instant::now();
        let steps_total = plan.steps.len();
        let mut visited = Vec::with_capacity(steps_total + 2);

        info!(variant = %plan.variant, steps = steps_total, "starting factory update");
        self.transition(&mut visited, UpdateState::Idle, 0, steps_total)
            .await;

        for (index, step) in plan.steps.iter().enumerate() {
            self.transition(
                &mut visited,
                UpdateState::for_step(step.kind()),
                index,
                steps_total,
            )
            .await;

            if let Err(error) = self.execute(device, step).await {
                warn!(step = %error.step(), %error, "update step failed");
                let failed = UpdateState::Failed {
                    step: error.step(),
                    error: error.to_string(),
                };
                self.transition(&mut visited, failed, index, steps_total)
                    .await;
                return Err(error);
            }
        }

        self.transition(&mut visited, UpdateState::Done, steps_total, steps_total)
            .await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(duration_ms, "factory update complete");

        Ok(UpdateReport {
            variant: plan.variant,
            states: visited,
            started_at,
            duration_ms,
        })
    }

    async fn execute(&self, device: &dyn DeviceOps, step: &PlannedStep) -> Result<(), UpdateError> {
        match step {
            PlannedStep::FlashRightUnit { image } => device
                .flash_right_unit(image)
                .await
                .map_err(|source| UpdateError::Step {
                    step: StepKind::RightFlash,
                    source,
                }),
            PlannedStep::FlashLeftModule { image } => device
                .flash_left_module(image)
                .await
                .map_err(|source| UpdateError::Step {
                    step: StepKind::LeftFlash,
                    source,
                }),
            PlannedStep::WriteUserConfig { config } => {
                // Opaque blob: read once here, passed through untouched.
                let bytes =
                    tokio::fs::read(config)
                        .await
                        .map_err(|source| UpdateError::UserConfigRead {
                            path: config.clone(),
                            source,
                        })?;
                device
                    .write_user_config(&bytes)
                    .await
                    .map_err(|source| UpdateError::Step {
                        step: StepKind::UserConfig,
                        source,
                    })
            }
            PlannedStep::WriteHardwareConfig { iso } => device
                .write_hardware_config(*iso)
                .await
                .map_err(|source| UpdateError::Step {
                    step: StepKind::HardwareConfig,
                    source,
                }),
            PlannedStep::SwitchKeymap { keymap } => {
                device
                    .switch_keymap(keymap)
                    .await
                    .map_err(|source| UpdateError::Step {
                        step: StepKind::KeymapSwitch,
                        source,
                    })
            }
        }
    }

    async fn transition(
        &self,
        visited: &mut Vec<UpdateState>,
        state: UpdateState,
        steps_done: usize,
        steps_total: usize,
    ) {
        info!(state = %state, "update state");
        {
            let mut current = self.state.write().await;
            *current = state.clone();
        }
        visited.push(state.clone());

        let progress = UpdateProgress {
            state,
            steps_done,
            steps_total,
        };
        if self.progress_tx.send(progress).is_err() {
            trace!("no progress subscribers");
        }
    }
}

impl Default for UpdateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_is_the_default_state() {
        assert_eq!(UpdateState::default(), UpdateState::Idle);
    }

    #[test]
    fn progress_classification() {
        assert!(!UpdateState::Idle.is_in_progress());
        assert!(UpdateState::RightFlashing.is_in_progress());
        assert!(UpdateState::SwitchingKeymap.is_in_progress());
        assert!(!UpdateState::Done.is_in_progress());
        assert!(UpdateState::Done.is_terminal());
        assert!(
            UpdateState::Failed {
                step: StepKind::LeftFlash,
                error: "boom".to_string()
            }
            .is_terminal()
        );
    }

    #[test]
    fn every_step_has_a_distinct_state() {
        let states: Vec<UpdateState> = StepKind::ORDERED
            .iter()
            .map(|step| UpdateState::for_step(*step))
            .collect();
        for (i, state) in states.iter().enumerate() {
            assert!(state.is_in_progress());
            assert_eq!(states.iter().filter(|s| *s == state).count(), 1, "state {i} repeated");
        }
    }

    #[test]
    fn failed_state_displays_the_step_name() {
        let state = UpdateState::Failed {
            step: StepKind::HardwareConfig,
            error: "nack".to_string(),
        };
        assert_eq!(state.to_string(), "failed at hardware-config");
    }
}
