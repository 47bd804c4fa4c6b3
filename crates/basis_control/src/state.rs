//! Controller lifecycle states.

use core::fmt;
use serde::Serialize;

/// Lifecycle state of a [`Controller`](crate::Controller).
///
/// ```text
/// Created ──connect──▶ Connected ──start──▶ Running ◀──start── Stopped
///                                              │                  ▲
///                                              └──────stop────────┘
/// ```
///
/// A failed `connect` leaves the controller in `Created` for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    /// Constructed; resources not yet resolved.
    Created,
    /// Resources, potential function, and Jacobian are in place.
    Connected,
    /// Accepting update cycles.
    Running,
    /// Stopped after running; the last computed state stays readable.
    Stopped,
}

impl ControllerState {
    /// Returns the lowercase name of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Connected => "connected",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
