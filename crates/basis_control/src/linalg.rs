//! Damped least-squares pseudo-inverse.
//!
//! For J = U Σ Vᵗ the pseudo-inverse is J⁺ = V Σ⁺ Uᵗ. Singular values at or
//! above the threshold are inverted directly; those below it are replaced by
//! the Tikhonov term σ / (σ² + λ²), which is bounded by 1 / (2λ). The result
//! is always finite, so a singular Jacobian never becomes a hard failure.

use nalgebra::DMatrix;

/// Upper bound on SVD sweeps before giving up.
const MAX_SVD_ITERATIONS: usize = 1_000;

/// Result of [`damped_pseudo_inverse`].
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoInverse {
    /// The (possibly damped) pseudo-inverse, shaped as the input's transpose.
    pub matrix: DMatrix<f64>,
    /// Whether any singular value fell below the threshold and was damped.
    pub damped: bool,
    /// Number of singular values at or above the threshold.
    pub rank: usize,
}

impl PseudoInverse {
    fn zeros(rows: usize, cols: usize, damped: bool) -> Self {
        Self {
            matrix: DMatrix::zeros(cols, rows),
            damped,
            rank: 0,
        }
    }
}

/// Computes the damped pseudo-inverse of `matrix`.
///
/// Matrices with non-finite entries, or whose decomposition does not
/// converge, yield a zero matrix flagged as damped.
///
/// # Example
///
/// ```
/// use basis_control::linalg::damped_pseudo_inverse;
/// use nalgebra::DMatrix;
///
/// let singular = DMatrix::<f64>::zeros(2, 2);
/// let inverse = damped_pseudo_inverse(&singular, 1e-6, 1e-3);
///
/// assert!(inverse.damped);
/// assert_eq!(inverse.rank, 0);
/// assert!(inverse.matrix.iter().all(|v| v.is_finite()));
/// ```
#[must_use]
pub fn damped_pseudo_inverse(matrix: &DMatrix<f64>, threshold: f64, damping: f64) -> PseudoInverse {
    let (rows, cols) = matrix.shape();
    if rows == 0 || cols == 0 {
        return PseudoInverse::zeros(rows, cols, false);
    }
    if matrix.iter().any(|value| !value.is_finite()) {
        tracing::warn!(rows, cols, "jacobian has non-finite entries, using zero inverse");
        return PseudoInverse::zeros(rows, cols, true);
    }

    let Some(svd) = matrix
        .clone()
        .try_svd(true, true, f64::EPSILON, MAX_SVD_ITERATIONS)
    else {
        tracing::warn!(rows, cols, "jacobian decomposition did not converge");
        return PseudoInverse::zeros(rows, cols, true);
    };
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return PseudoInverse::zeros(rows, cols, true);
    };

    let damping_sq = damping * damping;
    let mut damped = false;
    let mut rank = 0;
    let inverted = svd.singular_values.map(|sigma| {
        if sigma >= threshold && sigma > 0.0 {
            rank += 1;
            return sigma.recip();
        }
        damped = true;
        let denominator = sigma * sigma + damping_sq;
        if denominator > 0.0 {
            sigma / denominator
        } else {
            0.0
        }
    });

    PseudoInverse {
        matrix: v_t.transpose() * DMatrix::from_diagonal(&inverted) * u.transpose(),
        damped,
        rank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &DMatrix<f64>, b: &DMatrix<f64>) {
        assert_eq!(a.shape(), b.shape());
        assert!((a - b).abs().max() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn identity_inverts_to_identity() {
        let inverse = damped_pseudo_inverse(&DMatrix::identity(3, 3), 1e-6, 1e-3);
        assert_close(&inverse.matrix, &DMatrix::identity(3, 3));
        assert!(!inverse.damped);
        assert_eq!(inverse.rank, 3);
    }

    #[test]
    fn full_rank_square_matches_inverse() {
        let matrix = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let expected = matrix.clone().try_inverse().unwrap();
        let inverse = damped_pseudo_inverse(&matrix, 1e-6, 1e-3);
        assert_close(&inverse.matrix, &expected);
    }

    #[test]
    fn wide_matrix_gives_right_inverse() {
        let matrix = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 1.0, 0.0, 2.0, 0.0]);
        let inverse = damped_pseudo_inverse(&matrix, 1e-6, 1e-3);

        assert_eq!(inverse.matrix.shape(), (3, 2));
        assert_close(&(&matrix * &inverse.matrix), &DMatrix::identity(2, 2));
    }

    #[test]
    fn zero_matrix_is_damped_to_zero() {
        let inverse = damped_pseudo_inverse(&DMatrix::zeros(2, 2), 1e-6, 1e-3);
        assert!(inverse.damped);
        assert_eq!(inverse.rank, 0);
        assert_close(&inverse.matrix, &DMatrix::zeros(2, 2));
    }

    #[test]
    fn near_singular_values_stay_bounded() {
        let damping = 1e-2;
        let matrix = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1e-9]);
        let inverse = damped_pseudo_inverse(&matrix, 1e-6, damping);

        assert!(inverse.damped);
        assert_eq!(inverse.rank, 1);
        assert!(inverse.matrix.abs().max() <= 1.0 + 1e-9);
        assert!(inverse.matrix[(1, 1)].abs() <= 1.0 / (2.0 * damping));
    }

    #[test]
    fn undamped_zero_singular_value_does_not_divide_by_zero() {
        let inverse = damped_pseudo_inverse(&DMatrix::zeros(2, 3), 1e-6, 0.0);
        assert!(inverse.matrix.iter().all(|v| v.is_finite()));
        assert_eq!(inverse.matrix.shape(), (3, 2));
    }

    #[test]
    fn non_finite_input_yields_zero() {
        let matrix = DMatrix::from_row_slice(2, 2, &[f64::NAN, 0.0, 0.0, 1.0]);
        let inverse = damped_pseudo_inverse(&matrix, 1e-6, 1e-3);
        assert!(inverse.damped);
        assert_close(&inverse.matrix, &DMatrix::zeros(2, 2));
    }

    #[test]
    fn empty_matrix_has_transposed_empty_inverse() {
        let inverse = damped_pseudo_inverse(&DMatrix::zeros(0, 3), 1e-6, 1e-3);
        assert_eq!(inverse.matrix.shape(), (3, 0));
        assert!(!inverse.damped);
    }
}
