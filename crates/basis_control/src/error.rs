//! Error types for the controller.

use crate::state::ControllerState;
use basis_functions::{CreateFunctionError, EvaluationError};
use basis_resource::ResourceError;
use std::time::Duration;

/// Errors raised by [`Controller`](crate::Controller) operations.
///
/// Errors from `connect` are terminal for the controller instance. Errors
/// from an update cycle leave the controller's state and last output intact.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControllerError {
    /// A required resource could not be reached.
    #[error("failed to connect to resource '{name}': {reason}")]
    ResourceConnectFailed {
        /// The resource name.
        name: String,
        /// Why the connection failed.
        reason: String,
    },

    /// A resource has not produced a value yet.
    #[error("resource '{0}' has not produced a value")]
    ResourceUnavailable(String),

    /// A proxied read did not complete in time.
    #[error("read of resource '{name}' timed out after {timeout:?}")]
    ResourceTimeout {
        /// The resource name.
        name: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// A vector or matrix had the wrong size.
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being checked.
        what: String,
        /// The expected size.
        expected: usize,
        /// The size actually seen.
        actual: usize,
    },

    /// A reference was supplied to a function that takes none, or vice versa.
    #[error("reference mismatch for potential function '{function}' (requires reference: {required})")]
    ReferenceMismatch {
        /// The potential function's type tag.
        function: String,
        /// Whether the function requires a reference.
        required: bool,
    },

    /// No potential function is registered under the tag.
    #[error("unknown potential function type '{0}'")]
    UnknownPotentialFunctionType(String),

    /// No Jacobian is available for the space pair.
    #[error("no jacobian from space '{input}' to space '{output}'")]
    UnsupportedSpacePair {
        /// The sensor space.
        input: String,
        /// The effector space.
        output: String,
    },

    /// The operation is not allowed in the controller's current state.
    #[error("cannot {operation} a controller that is {from}")]
    InvalidStateTransition {
        /// The state the controller was in.
        from: ControllerState,
        /// The attempted operation.
        operation: &'static str,
    },

    /// The computed command contained NaN or infinite components.
    #[error("computed command is not finite")]
    NonFiniteCommand,

    /// Configuration values are out of range or malformed.
    #[error("invalid controller configuration: {0}")]
    InvalidConfig(String),
}

impl From<ResourceError> for ControllerError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::ConnectFailed { name, reason } => {
                Self::ResourceConnectFailed { name, reason }
            }
            ResourceError::Unavailable(name) => Self::ResourceUnavailable(name),
            ResourceError::Timeout { name, timeout } => Self::ResourceTimeout { name, timeout },
            ResourceError::DimensionMismatch {
                name,
                expected,
                actual,
            } => Self::DimensionMismatch {
                what: format!("resource '{name}'"),
                expected,
                actual,
            },
            ResourceError::InvalidName(name) => Self::ResourceConnectFailed {
                name,
                reason: "invalid resource name".into(),
            },
        }
    }
}

impl From<CreateFunctionError> for ControllerError {
    fn from(err: CreateFunctionError) -> Self {
        match err {
            CreateFunctionError::UnknownPotentialFunctionType(tag) => {
                Self::UnknownPotentialFunctionType(tag)
            }
            CreateFunctionError::UnsupportedSpacePair { input, output } => {
                Self::UnsupportedSpacePair { input, output }
            }
        }
    }
}

impl From<EvaluationError> for ControllerError {
    fn from(err: EvaluationError) -> Self {
        match err {
            EvaluationError::ReferenceMismatch { function, required } => {
                Self::ReferenceMismatch { function, required }
            }
            EvaluationError::DimensionMismatch {
                what,
                expected,
                actual,
            } => Self::DimensionMismatch {
                what: what.to_string(),
                expected,
                actual,
            },
        }
    }
}
