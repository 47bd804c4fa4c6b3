//! Primitive task-space controllers for the control basis.
//!
//! A controller drives a potential function φ toward zero by issuing effector
//! commands through a task Jacobian J, either as Δτ = κ·J⁺·φ or, in transpose
//! mode, as Δτ = −κ·Jᵗ·φ.
//!
//! The workspace is split into three layers:
//!
//! - [`basis_resource`]: named sensor, reference, and effector resources read
//!   through local or proxied accessors.
//! - [`basis_functions`]: potential functions, task Jacobians, and their
//!   string-keyed registries.
//! - [`basis_control`]: the [`Controller`](basis_control::Controller) itself,
//!   its lifecycle, the damped pseudo-inverse, diagnostics, and a fixed-rate
//!   action runner.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use control_basis::prelude::*;
//!
//! let bus = ResourceBus::new();
//! let position = bus.advertise("/cb/configuration/arm/pos", "configuration", 2).unwrap();
//! let target = bus.advertise("/cb/configuration/arm/goal", "configuration", 2).unwrap();
//! let command = bus.advertise("/cb/configuration/arm/cmd", "configuration", 2).unwrap();
//! command.publish(DVector::zeros(2)).unwrap();
//!
//! let mut controller = Controller::distributed_with_reference(
//!     Arc::new(bus.clone()),
//!     position.name(),
//!     target.name(),
//!     command.name(),
//!     "difference",
//! )
//! .with_config(ControllerConfig::new().with_gain(0.5).with_jacobian_transpose(true));
//!
//! controller
//!     .connect(&PotentialFunctionRegistry::with_defaults(), &JacobianRegistry::new())
//!     .unwrap();
//! controller.start().unwrap();
//!
//! // Nothing sensed yet: the cycle fails and the command stays at zero.
//! assert!(controller.update().is_err());
//!
//! position.publish(DVector::from_vec(vec![1.0, 1.0])).unwrap();
//! target.publish(DVector::from_vec(vec![0.0, 0.0])).unwrap();
//! controller.update().unwrap();
//! assert_eq!(controller.control_output().as_slice(), &[-0.5, -0.5]);
//! ```

/// Layer 1: sensorimotor resources and accessors.
pub use basis_resource;

/// Layer 2: potential functions and task Jacobians.
pub use basis_functions;

/// Layer 3: the controller and its runtime.
pub use basis_control;

/// Linear algebra types used throughout the public API.
pub use nalgebra;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use basis_control::{
        ActionRunner, ControlBasisAction, Controller, ControllerConfig, ControllerError,
        ControllerReport, ControllerState, DiagnosticsSink, MemorySink, RunStats, TracingSink,
    };
    pub use basis_functions::{
        ConstantJacobian, IdentityJacobian, Jacobian, JacobianRegistry, JacobianShape, Potential,
        PotentialFunction, PotentialFunctionRegistry,
    };
    pub use basis_resource::{
        LocalAccessor, ProxiedAccessor, Resource, ResourceAccessor, ResourceBus, ResourceError,
        ResourceResolver, SharedResource,
    };
    pub use nalgebra::{DMatrix, DVector};
}
