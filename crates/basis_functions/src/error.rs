//! Error types for potential functions and Jacobians.

/// Error creating a potential function or Jacobian from a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreateFunctionError {
    /// No potential function is registered under the given type tag.
    #[error("unknown potential function type: {0}")]
    UnknownPotentialFunctionType(String),

    /// No Jacobian is registered for the given pair of spaces.
    #[error("no jacobian registered from '{input}' to '{output}'")]
    UnsupportedSpacePair {
        /// The input (sensor) space.
        input: String,
        /// The output (effector) space.
        output: String,
    },
}

/// Error evaluating a potential function or computing a Jacobian.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    /// A reference was passed to a function that takes none, or omitted from one that needs it.
    #[error("reference mismatch for potential function '{function}' (requires reference: {required})")]
    ReferenceMismatch {
        /// Type tag of the potential function.
        function: String,
        /// Whether the function requires a reference.
        required: bool,
    },

    /// An input vector did not have the expected length.
    #[error("{what} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        /// Which input was wrong (e.g. `"sensor"`, `"reference"`).
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
}
