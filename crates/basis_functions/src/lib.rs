//! Potential functions, task Jacobians, and their registries.
//!
//! A controller combines two pluggable pieces:
//!
//! - A [`PotentialFunction`] maps the sensed signal σ (and optionally a
//!   reference σ_ref) to a potential φ that the controller drives to zero.
//! - A [`Jacobian`] relates changes of the potential to changes of the
//!   effector command.
//!
//! Both are created by string key from a registry, so new kinds are added by
//! registration rather than by editing a dispatch chain:
//!
//! - [`PotentialFunctionRegistry`] - keyed by a type tag (e.g. `"difference"`).
//! - [`JacobianRegistry`] - keyed by an `(input space, output space)` pair.
//!
//! # Example
//!
//! ```
//! use basis_functions::{JacobianRegistry, JacobianShape, PotentialFunctionRegistry};
//! use nalgebra::DVector;
//!
//! let potentials = PotentialFunctionRegistry::with_defaults();
//! let difference = potentials.create("difference", 2).unwrap();
//!
//! let sigma = DVector::from_vec(vec![1.0, 1.0]);
//! let target = DVector::zeros(2);
//! let potential = difference.evaluate(&sigma, Some(&target)).unwrap();
//! assert_eq!(potential.phi, DVector::from_vec(vec![1.0, 1.0]));
//!
//! // Same-space pairs fall back to the identity Jacobian.
//! let jacobians = JacobianRegistry::new();
//! let jacobian = jacobians
//!     .create("configuration", "configuration", JacobianShape::new(2, 2))
//!     .unwrap();
//! assert!(!jacobian.needs_recompute());
//! ```

pub mod error;
pub mod jacobian;
pub mod potential;
mod registry;

pub use error::{CreateFunctionError, EvaluationError};
pub use jacobian::{ConstantJacobian, IdentityJacobian, Jacobian, JacobianShape};
pub use potential::{DifferencePotential, Potential, PotentialFunction};
pub use registry::{
    JacobianConstructor, JacobianRegistry, PotentialConstructor, PotentialFunctionRegistry,
};
