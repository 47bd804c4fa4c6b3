//! Task Jacobians.
//!
//! A [`Jacobian`] relates changes of the potential to changes of the effector
//! command, J = ∂φ/∂τ. Matrices are laid out with one row per potential
//! component and one column per effector component, so that both J⁺φ and Jᵗφ
//! have the effector's dimension.
//!
//! Constant Jacobians report `needs_recompute() == false`; the controller then
//! computes them once when it connects and caches the result.

mod constant;

pub use constant::{ConstantJacobian, IdentityJacobian};

use crate::error::EvaluationError;
use nalgebra::{DMatrix, DVector};

/// Dimensions of a task Jacobian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JacobianShape {
    /// Number of rows: the potential's dimension.
    pub potential_dim: usize,
    /// Number of columns: the effector's dimension.
    pub effector_dim: usize,
}

impl JacobianShape {
    /// Creates a shape of `potential_dim` rows by `effector_dim` columns.
    #[must_use]
    pub const fn new(potential_dim: usize, effector_dim: usize) -> Self {
        Self {
            potential_dim,
            effector_dim,
        }
    }

    /// Checks that `matrix` has this shape.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::DimensionMismatch`] naming the first
    /// mismatching axis.
    pub fn check(&self, matrix: &DMatrix<f64>) -> Result<(), EvaluationError> {
        if matrix.nrows() != self.potential_dim {
            return Err(EvaluationError::DimensionMismatch {
                what: "jacobian rows",
                expected: self.potential_dim,
                actual: matrix.nrows(),
            });
        }
        if matrix.ncols() != self.effector_dim {
            return Err(EvaluationError::DimensionMismatch {
                what: "jacobian columns",
                expected: self.effector_dim,
                actual: matrix.ncols(),
            });
        }
        Ok(())
    }
}

/// A task Jacobian between an input (sensor) space and an output (effector) space.
pub trait Jacobian: Send + Sync + 'static {
    /// The sensor space this Jacobian maps from.
    fn input_space(&self) -> &str;

    /// The effector space this Jacobian maps to.
    fn output_space(&self) -> &str;

    /// The dimensions of matrices produced by [`compute`](Self::compute).
    fn shape(&self) -> JacobianShape;

    /// Whether the matrix depends on the effector state and must be
    /// recomputed every cycle.
    fn needs_recompute(&self) -> bool;

    /// Computes the Jacobian at the given effector state.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::DimensionMismatch`] if `effector_state` does
    /// not have the effector's dimension.
    fn compute(&self, effector_state: &DVector<f64>) -> Result<DMatrix<f64>, EvaluationError>;
}

impl core::fmt::Debug for dyn Jacobian {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Jacobian")
            .field("input_space", &self.input_space())
            .field("output_space", &self.output_space())
            .field("shape", &self.shape())
            .field("needs_recompute", &self.needs_recompute())
            .finish()
    }
}
