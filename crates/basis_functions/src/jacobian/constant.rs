//! State-independent Jacobians.

use super::{Jacobian, JacobianShape};
use crate::error::EvaluationError;
use nalgebra::{DMatrix, DVector};

/// A Jacobian that is the same matrix at every effector state.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantJacobian {
    input_space: String,
    output_space: String,
    matrix: DMatrix<f64>,
}

impl ConstantJacobian {
    /// Creates a constant Jacobian; its shape is taken from `matrix`.
    #[must_use]
    pub fn new(
        input_space: impl Into<String>,
        output_space: impl Into<String>,
        matrix: DMatrix<f64>,
    ) -> Self {
        Self {
            input_space: input_space.into(),
            output_space: output_space.into(),
            matrix,
        }
    }

    /// Returns the fixed matrix.
    #[must_use]
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }
}

impl Jacobian for ConstantJacobian {
    fn input_space(&self) -> &str {
        &self.input_space
    }

    fn output_space(&self) -> &str {
        &self.output_space
    }

    fn shape(&self) -> JacobianShape {
        JacobianShape::new(self.matrix.nrows(), self.matrix.ncols())
    }

    fn needs_recompute(&self) -> bool {
        false
    }

    fn compute(&self, effector_state: &DVector<f64>) -> Result<DMatrix<f64>, EvaluationError> {
        check_effector(self.shape(), effector_state)?;
        Ok(self.matrix.clone())
    }
}

/// The identity map between two views of the same space.
///
/// Rectangular shapes use the rectangular identity (ones on the main diagonal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityJacobian {
    space: String,
    shape: JacobianShape,
}

impl IdentityJacobian {
    /// Creates an identity Jacobian within `space`.
    #[must_use]
    pub fn new(space: impl Into<String>, shape: JacobianShape) -> Self {
        Self {
            space: space.into(),
            shape,
        }
    }
}

impl Jacobian for IdentityJacobian {
    fn input_space(&self) -> &str {
        &self.space
    }

    fn output_space(&self) -> &str {
        &self.space
    }

    fn shape(&self) -> JacobianShape {
        self.shape
    }

    fn needs_recompute(&self) -> bool {
        false
    }

    fn compute(&self, effector_state: &DVector<f64>) -> Result<DMatrix<f64>, EvaluationError> {
        check_effector(self.shape, effector_state)?;
        Ok(DMatrix::identity(self.shape.potential_dim, self.shape.effector_dim))
    }
}

fn check_effector(
    shape: JacobianShape,
    effector_state: &DVector<f64>,
) -> Result<(), EvaluationError> {
    if effector_state.len() != shape.effector_dim {
        return Err(EvaluationError::DimensionMismatch {
            what: "effector state",
            expected: shape.effector_dim,
            actual: effector_state.len(),
        });
    }
    Ok(())
}
