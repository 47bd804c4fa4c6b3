//! Error types for resource access.

use core::time::Duration;

/// Errors that can occur while connecting to or reading a resource.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResourceError {
    /// The resource could not be resolved or its transport could not be opened.
    #[error("failed to connect to resource '{name}': {reason}")]
    ConnectFailed {
        /// Name of the resource.
        name: String,
        /// Why the connection failed.
        reason: String,
    },

    /// The backing source has not produced any data yet.
    #[error("resource '{0}' has not produced data")]
    Unavailable(String),

    /// A proxied read did not complete within its timeout.
    #[error("read of resource '{name}' timed out after {timeout:?}")]
    Timeout {
        /// Name of the resource.
        name: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// A value did not match the resource's fixed dimension.
    #[error("resource '{name}' has dimension {expected}, got {actual}")]
    DimensionMismatch {
        /// Name of the resource.
        name: String,
        /// The resource's declared dimension.
        expected: usize,
        /// The dimension that was supplied or received.
        actual: usize,
    },

    /// A resource name did not follow the `/cb/<space>/<device>` convention.
    #[error("invalid resource name '{0}': expected '/cb/<space>/<device>'")]
    InvalidName(String),
}
