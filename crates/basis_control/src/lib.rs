//! Primitive task-space control for the control basis.
//!
//! A [`Controller`] couples three resources (a sensor, an optional reference,
//! and an effector) with a potential function φ and a task Jacobian J, and
//! computes an effector command every cycle:
//!
//! ```text
//! Δτ =  κ · J⁺ · φ(σ [, σ_ref])     (pseudo-inverse mode)
//! Δτ = −κ · Jᵗ · φ(σ [, σ_ref])     (transpose mode)
//! ```
//!
//! J⁺ is a damped pseudo-inverse (see [`linalg`]), so singular Jacobians
//! produce finite, bounded commands instead of errors.
//!
//! # Lifecycle
//!
//! `Created → connect → Connected → start → Running ⇄ Stopped`. Connection
//! failures are terminal. Update failures are reported and leave the last
//! command in place. See [`ControllerState`].
//!
//! # Running controllers
//!
//! The controller never spawns threads. [`ActionRunner`] drives any
//! [`ControlBasisAction`] at a fixed period on the caller's thread, and
//! [`telemetry`] installs a `tracing` subscriber for applications that want
//! log output.

mod action;
mod clock;
mod config;
mod controller;
pub mod diagnostics;
pub mod error;
pub mod linalg;
mod runner;
mod state;
pub mod telemetry;

pub use action::ControlBasisAction;
#[cfg(any(test, feature = "test-utils"))]
pub use clock::MockClock;
pub use clock::{Clock, ClockProvider, SystemClock};
pub use config::ControllerConfig;
pub use controller::Controller;
pub use diagnostics::{ControllerReport, DiagnosticsSink, MemorySink, TracingSink};
pub use error::ControllerError;
pub use linalg::{PseudoInverse, damped_pseudo_inverse};
pub use runner::{ActionRunner, RunStats};
pub use state::ControllerState;
