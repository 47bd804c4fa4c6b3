//! The `difference` potential: φ = σ − σ_ref.

use super::{Potential, PotentialFunction, reference_mismatch};
use crate::error::EvaluationError;
use nalgebra::DVector;

/// Reference-relative potential φ = σ − σ_ref.
///
/// φ̇ is the gradient of the quadratic objective ½‖σ − σ_ref‖² with respect to
/// σ, which for this function coincides with φ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifferencePotential {
    dimension: usize,
}

impl DifferencePotential {
    /// Tag under which the function is registered by default.
    pub const TYPE_TAG: &'static str = "difference";

    /// Creates the function for signals of length `dimension`.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl PotentialFunction for DifferencePotential {
    fn type_tag(&self) -> &str {
        Self::TYPE_TAG
    }

    fn requires_reference(&self) -> bool {
        true
    }

    fn input_dimension(&self) -> usize {
        self.dimension
    }

    fn output_dimension(&self) -> usize {
        self.dimension
    }

    fn evaluate(
        &self,
        sigma: &DVector<f64>,
        reference: Option<&DVector<f64>>,
    ) -> Result<Potential, EvaluationError> {
        let Some(reference) = reference else {
            return Err(reference_mismatch(self));
        };
        self.check_inputs(sigma, Some(reference))?;

        let phi = sigma - reference;
        Ok(Potential::new(phi.clone(), phi))
    }
}
