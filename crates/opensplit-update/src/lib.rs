//! Factory update orchestration for OpenSplit keyboards
//!
//! A factory update restores a keyboard to a known-good, fully-provisioned
//! state from a release bundle: flash the right unit, flash the left module
//! through it, restore the user configuration, restore the hardware
//! configuration (key layout), and switch to the factory-test keymap.
//!
//! The flow is forward-only and fail-fast. There is no retry, no rollback
//! and no partial-update recovery: the first failing step terminates the
//! run with the step's name and cause, and a failed unit goes back through
//! the full flow from the start.
//!
//! # Architecture
//!
//! - [`plan`]: the fixed five-step sequence as inspectable data
//! - [`preconditions`]: fail-fast artifact and layout validation
//! - [`ports`]: trait seams for device operations and discovery
//! - [`engine`]: the update state machine and progress reporting
//! - [`factory`]: the composed resolve → validate → connect → run flow
//! - [`error`]: typed error kinds for every failure class
//!
//! Device contact is strictly gated: preconditions run before any handle is
//! acquired, and the handle is held for exactly one run.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod engine;
pub mod error;
pub mod factory;
pub mod plan;
pub mod ports;
pub mod preconditions;
pub mod prelude;

pub use engine::{UpdateEngine, UpdateProgress, UpdateReport, UpdateState};
pub use error::{DeviceError, DiscoveryError, FactoryUpdateError, UpdateError};
pub use factory::factory_update;
pub use plan::{PlannedStep, StepKind, UpdatePlan};
pub use ports::{DetectedKeyboard, DeviceOps, KeyboardDiscovery};
pub use preconditions::{ArtifactKind, PreconditionError, validate};
