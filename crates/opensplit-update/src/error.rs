//! Error types for the update pipeline
//!
//! Every failure class gets its own kind so callers can branch (and map
//! exit codes) without string matching.

use std::path::PathBuf;

use thiserror::Error;

use crate::plan::StepKind;
use crate::preconditions::PreconditionError;

/// Errors surfaced by a device session while executing an operation.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The underlying transport failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device answered but refused or garbled the request.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The request cannot be expressed on the wire at all.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl DeviceError {
    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        DeviceError::Protocol(message.into())
    }

    /// Create an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        DeviceError::InvalidRequest(message.into())
    }
}

/// Errors surfaced while locating a supported keyboard.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The scan completed but found no supported keyboard.
    #[error("no supported keyboard found")]
    NoDeviceFound,

    /// The scan itself failed.
    #[error("hidraw scan failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the update engine while executing a plan.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// A device operation failed; later steps were not executed.
    #[error("{step} failed: {source}")]
    Step {
        /// The step that failed.
        step: StepKind,
        /// The device-side cause.
        #[source]
        source: DeviceError,
    },

    /// The user-configuration blob could not be read from disk.
    #[error("{} failed: cannot read user configuration from {}: {source}", StepKind::UserConfig, .path.display())]
    UserConfigRead {
        /// Resolved blob path.
        path: PathBuf,
        /// The read failure.
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    /// The step this error terminated the run at.
    pub fn step(&self) -> StepKind {
        match self {
            UpdateError::Step { step, .. } => *step,
            UpdateError::UserConfigRead { .. } => StepKind::UserConfig,
        }
    }
}

/// Errors from the composed factory-update flow, preserving the failure
/// class for exit-code mapping.
#[derive(Error, Debug)]
pub enum FactoryUpdateError {
    /// Bundle loading or artifact resolution failed.
    #[error(transparent)]
    Bundle(#[from] opensplit_bundle::BundleError),

    /// A precondition check rejected the run before any device contact.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The device session could not be opened.
    #[error("failed to open device session: {0}")]
    Connect(#[source] DeviceError),

    /// A device operation failed mid-run.
    #[error(transparent)]
    Update(#[from] UpdateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_errors_name_the_step() {
        let err = UpdateError::Step {
            step: StepKind::RightFlash,
            source: DeviceError::protocol("nack"),
        };
        assert_eq!(err.step(), StepKind::RightFlash);
        assert!(err.to_string().starts_with("right-flash failed"));
    }

    #[test]
    fn config_read_errors_belong_to_the_user_config_step() {
        let err = UpdateError::UserConfigRead {
            path: PathBuf::from("/tmp/config.bin"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.step(), StepKind::UserConfig);
        assert!(err.to_string().contains("user-config failed"));
    }
}
