//! Exit-code mapping for splitctl
//!
//! Every failure class maps to a distinct, stable exit code so factory
//! scripting can branch without parsing stderr.

use opensplit_bundle::BundleError;
use opensplit_update::{DiscoveryError, FactoryUpdateError, PreconditionError, UpdateError};

/// Exit code for a precondition failure.
pub const EXIT_PRECONDITION: i32 = 1;
/// Exit code for bundle resolution failures.
pub const EXIT_BUNDLE: i32 = 3;
/// Exit code when no keyboard is found or the session cannot open.
pub const EXIT_DEVICE: i32 = 4;
/// Exit code when a device operation fails mid-run.
pub const EXIT_STEP: i32 = 5;
/// Exit code for anything unclassified.
pub const EXIT_INTERNAL: i32 = 70;

/// Map an error to the exit code of its failure class.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<FactoryUpdateError>() {
        return match e {
            FactoryUpdateError::Precondition(_) => EXIT_PRECONDITION,
            FactoryUpdateError::Bundle(_) => EXIT_BUNDLE,
            FactoryUpdateError::Connect(_) => EXIT_DEVICE,
            FactoryUpdateError::Update(_) => EXIT_STEP,
        };
    }
    // Dry runs and bundle inspection surface the component errors directly.
    if error.downcast_ref::<PreconditionError>().is_some() {
        return EXIT_PRECONDITION;
    }
    if error.downcast_ref::<BundleError>().is_some() {
        return EXIT_BUNDLE;
    }
    if error.downcast_ref::<DiscoveryError>().is_some() {
        return EXIT_DEVICE;
    }
    if error.downcast_ref::<UpdateError>().is_some() {
        return EXIT_STEP;
    }
    EXIT_INTERNAL
}
