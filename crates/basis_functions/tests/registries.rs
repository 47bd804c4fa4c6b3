//! Integration tests for the potential function and Jacobian registries.

use basis_functions::{
    CreateFunctionError, EvaluationError, Jacobian, JacobianRegistry, JacobianShape,
    PotentialFunctionRegistry,
};
use nalgebra::{DMatrix, DVector};

/// Planar two-link arm: Jacobian of the end-effector position w.r.t. joint angles.
struct PlanarArmJacobian {
    links: (f64, f64),
}

impl Jacobian for PlanarArmJacobian {
    fn input_space(&self) -> &str {
        "cartesianposition"
    }

    fn output_space(&self) -> &str {
        "configuration"
    }

    fn shape(&self) -> JacobianShape {
        JacobianShape::new(2, 2)
    }

    fn needs_recompute(&self) -> bool {
        true
    }

    fn compute(&self, effector_state: &DVector<f64>) -> Result<DMatrix<f64>, EvaluationError> {
        if effector_state.len() != 2 {
            return Err(EvaluationError::DimensionMismatch {
                what: "effector state",
                expected: 2,
                actual: effector_state.len(),
            });
        }
        let (l1, l2) = self.links;
        let (q1, q12) = (effector_state[0], effector_state[0] + effector_state[1]);
        Ok(DMatrix::from_row_slice(
            2,
            2,
            &[
                -l1 * q1.sin() - l2 * q12.sin(),
                -l2 * q12.sin(),
                l1 * q1.cos() + l2 * q12.cos(),
                l2 * q12.cos(),
            ],
        ))
    }
}

fn arm_registry() -> JacobianRegistry {
    let mut registry = JacobianRegistry::new();
    registry.register("cartesianposition", "configuration", |_shape: JacobianShape| {
        Box::new(PlanarArmJacobian { links: (1.0, 0.5) })
    });
    registry
}

/// A registered state-dependent Jacobian is created and recomputed from the state.
#[test]
fn state_dependent_jacobian_through_registry() {
    let registry = arm_registry();
    let jacobian = registry
        .create("cartesianposition", "configuration", JacobianShape::new(2, 2))
        .unwrap();

    assert!(jacobian.needs_recompute());

    let stretched = jacobian.compute(&DVector::from_vec(vec![0.0, 0.0])).unwrap();
    assert_eq!(stretched, DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 1.5, 0.5]));

    let bent = jacobian
        .compute(&DVector::from_vec(vec![0.0, core::f64::consts::FRAC_PI_2]))
        .unwrap();
    assert!((bent[(0, 0)] + 0.5).abs() < 1e-12);
    assert!((bent[(1, 0)] - 1.0).abs() < 1e-12);
}

/// The reverse pair is not implied by registering one direction.
#[test]
fn reverse_pair_is_unsupported() {
    let registry = arm_registry();
    assert!(matches!(
        registry.create("configuration", "cartesianposition", JacobianShape::new(2, 2)),
        Err(CreateFunctionError::UnsupportedSpacePair { .. })
    ));
}

mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_vector(dimension: usize) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(-100.0..100.0f64, dimension)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// The difference potential vanishes at the target and is antisymmetric.
        #[test]
        fn prop_difference_is_zero_at_target_and_antisymmetric(
            (sigma, target) in (1..6usize).prop_flat_map(|n| (arb_vector(n), arb_vector(n)))
        ) {
            let registry = PotentialFunctionRegistry::with_defaults();
            let pf = registry.create("difference", sigma.len()).unwrap();
            let sigma = DVector::from_vec(sigma);
            let target = DVector::from_vec(target);

            let at_target = pf.evaluate(&sigma, Some(&sigma)).unwrap();
            prop_assert!(at_target.phi.iter().all(|v| *v == 0.0));

            let forward = pf.evaluate(&sigma, Some(&target)).unwrap();
            let backward = pf.evaluate(&target, Some(&sigma)).unwrap();
            prop_assert_eq!(forward.phi.len(), pf.output_dimension());
            prop_assert_eq!(forward.phi, -backward.phi);
        }
    }
}
