//! Potential functions.
//!
//! A potential function is a stateless map from the sensed signal σ (and, for
//! reference-relative functions, a target σ_ref of the same dimension) to a
//! potential φ and its derivative φ̇. Evaluation must be deterministic:
//! identical inputs always yield identical outputs.

mod difference;

pub use difference::DifferencePotential;

use crate::error::EvaluationError;
use nalgebra::DVector;

/// Result of evaluating a [`PotentialFunction`].
#[derive(Debug, Clone, PartialEq)]
pub struct Potential {
    /// The potential φ(σ [, σ_ref]).
    pub phi: DVector<f64>,
    /// The derivative φ̇ reported by the function.
    pub phi_dot: DVector<f64>,
}

impl Potential {
    /// Creates a potential from its value and derivative.
    #[must_use]
    pub fn new(phi: DVector<f64>, phi_dot: DVector<f64>) -> Self {
        Self { phi, phi_dot }
    }

    /// Euclidean norm of φ.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.phi.norm()
    }
}

/// A potential function the controller drives toward zero.
///
/// Instances are created by a [`PotentialFunctionRegistry`](crate::PotentialFunctionRegistry)
/// for a fixed input dimension; [`output_dimension`](Self::output_dimension)
/// must stay stable across calls.
///
/// # Example
///
/// ```
/// use basis_functions::{EvaluationError, Potential, PotentialFunction};
/// use nalgebra::DVector;
///
/// /// φ(σ) = σ, driving the signal itself to zero.
/// struct Regulate {
///     dimension: usize,
/// }
///
/// impl PotentialFunction for Regulate {
///     fn type_tag(&self) -> &str {
///         "regulate"
///     }
///
///     fn requires_reference(&self) -> bool {
///         false
///     }
///
///     fn input_dimension(&self) -> usize {
///         self.dimension
///     }
///
///     fn output_dimension(&self) -> usize {
///         self.dimension
///     }
///
///     fn evaluate(
///         &self,
///         sigma: &DVector<f64>,
///         reference: Option<&DVector<f64>>,
///     ) -> Result<Potential, EvaluationError> {
///         self.check_inputs(sigma, reference)?;
///         Ok(Potential::new(sigma.clone(), sigma.clone()))
///     }
/// }
///
/// let pf = Regulate { dimension: 2 };
/// assert!(pf.evaluate(&DVector::zeros(2), Some(&DVector::zeros(2))).is_err());
/// ```
pub trait PotentialFunction: Send + Sync + 'static {
    /// The tag this function is registered under.
    fn type_tag(&self) -> &str;

    /// Whether evaluation takes a reference signal.
    fn requires_reference(&self) -> bool;

    /// Length of σ (and σ_ref) accepted by [`evaluate`](Self::evaluate).
    fn input_dimension(&self) -> usize;

    /// Length of φ produced by [`evaluate`](Self::evaluate).
    fn output_dimension(&self) -> usize;

    /// Evaluates the potential.
    ///
    /// # Errors
    ///
    /// - [`EvaluationError::ReferenceMismatch`] if `reference` is present when
    ///   not required, or absent when required.
    /// - [`EvaluationError::DimensionMismatch`] if an input has the wrong length.
    fn evaluate(
        &self,
        sigma: &DVector<f64>,
        reference: Option<&DVector<f64>>,
    ) -> Result<Potential, EvaluationError>;

    /// Validates the inputs of [`evaluate`](Self::evaluate) against this function's contract.
    ///
    /// # Errors
    ///
    /// See [`evaluate`](Self::evaluate).
    fn check_inputs(
        &self,
        sigma: &DVector<f64>,
        reference: Option<&DVector<f64>>,
    ) -> Result<(), EvaluationError> {
        if reference.is_some() != self.requires_reference() {
            return Err(reference_mismatch(self));
        }
        if sigma.len() != self.input_dimension() {
            return Err(EvaluationError::DimensionMismatch {
                what: "sensor",
                expected: self.input_dimension(),
                actual: sigma.len(),
            });
        }
        if let Some(reference) = reference
            && reference.len() != sigma.len()
        {
            return Err(EvaluationError::DimensionMismatch {
                what: "reference",
                expected: sigma.len(),
                actual: reference.len(),
            });
        }
        Ok(())
    }
}

/// The error for a reference given to, or withheld from, `function`.
pub(crate) fn reference_mismatch<P: PotentialFunction + ?Sized>(function: &P) -> EvaluationError {
    EvaluationError::ReferenceMismatch {
        function: function.type_tag().to_string(),
        required: function.requires_reference(),
    }
}

impl core::fmt::Debug for dyn PotentialFunction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PotentialFunction")
            .field("type_tag", &self.type_tag())
            .field("input_dimension", &self.input_dimension())
            .field("output_dimension", &self.output_dimension())
            .finish()
    }
}
