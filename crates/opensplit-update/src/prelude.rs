//! Convenience re-exports for common update types

pub use crate::engine::{UpdateEngine, UpdateProgress, UpdateReport, UpdateState};
pub use crate::error::{DeviceError, DiscoveryError, FactoryUpdateError, UpdateError};
pub use crate::factory::factory_update;
pub use crate::plan::{PlannedStep, StepKind, UpdatePlan};
pub use crate::ports::{DetectedKeyboard, DeviceOps, KeyboardDiscovery};
pub use crate::preconditions::{ArtifactKind, PreconditionError, validate};
