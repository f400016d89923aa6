//! Small 2×2 linear algebra helpers on top of nalgebra.
//!
//! Two operations are needed by the engine:
//!
//! ```text
//! covariance = Rᵀ R            (upper-triangular Cholesky factor)
//! σ²_perp    = p J C Jᵀ pᵀ / p pᵀ
//! ```
//!
//! Implementation choices:
//! - The strictly positive-definite case goes through `nalgebra::Cholesky`.
//! - Covariances on the semi-definite boundary (|ρ| = 1 or a zero σ) are
//!   legitimate degenerate ellipses, but nalgebra rejects them, so we fall back
//!   to the closed-form 2×2 factor for those.

use nalgebra::{Cholesky, Matrix2, RowVector2};

/// Relative tolerance for accepting a matrix as positive semi-definite.
const PSD_TOL: f64 = 1e-12;

/// Upper-triangular `R` with `matrix = Rᵀ R`.
///
/// Returns `None` if `matrix` is not symmetric positive semi-definite or has
/// non-finite entries.
pub fn upper_cholesky(matrix: &Matrix2<f64>) -> Option<Matrix2<f64>> {
    if matrix.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let a00 = matrix[(0, 0)];
    let a01 = matrix[(0, 1)];
    let a10 = matrix[(1, 0)];
    let a11 = matrix[(1, 1)];

    let scale = a00.abs().max(a11.abs()).max(f64::MIN_POSITIVE);
    if (a01 - a10).abs() > PSD_TOL * scale {
        return None;
    }

    if let Some(chol) = Cholesky::new(*matrix) {
        let r = chol.l().transpose();
        if r.iter().all(|v| v.is_finite()) {
            return Some(r);
        }
    }

    semidefinite_factor(a00, a01, a11)
}

/// Closed-form factor for a symmetric 2×2 PSD matrix, singular or not.
fn semidefinite_factor(a00: f64, a01: f64, a11: f64) -> Option<Matrix2<f64>> {
    let scale = a00.abs().max(a11.abs()).max(f64::MIN_POSITIVE);
    let tol = PSD_TOL * scale;
    if a00 < -tol || a11 < -tol {
        return None;
    }
    let a00 = a00.max(0.0);
    let a11 = a11.max(0.0);
    if a01 * a01 > a00 * a11 + tol * scale {
        return None;
    }

    let r00 = a00.sqrt();
    let (r01, r11) = if r00 > 0.0 {
        let r01 = a01 / r00;
        (r01, (a11 - r01 * r01).max(0.0).sqrt())
    } else {
        // First variable has zero variance; its covariance must vanish too.
        if a01.abs() > tol {
            return None;
        }
        (0.0, a11.sqrt())
    };

    Some(Matrix2::new(r00, r01, 0.0, r11))
}

/// Variance of `covariance` propagated through `jacobian` and projected onto
/// the unit vector along `direction`.
///
/// Returns NaN for a zero `direction`; callers treat that as "no value".
pub fn projected_variance(
    direction: &RowVector2<f64>,
    jacobian: &Matrix2<f64>,
    covariance: &Matrix2<f64>,
) -> f64 {
    let propagated = jacobian * covariance * jacobian.transpose();
    let numer = (direction * propagated * direction.transpose())[(0, 0)];
    let denom = (direction * direction.transpose())[(0, 0)];
    numer / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_reconstructs(m: &Matrix2<f64>) {
        let r = upper_cholesky(m).unwrap();
        assert_eq!(r[(1, 0)], 0.0, "factor must be upper-triangular");
        let back = r.transpose() * r;
        for (a, b) in back.iter().zip(m.iter()) {
            assert!((a - b).abs() < 1e-12, "{back} vs {m}");
        }
    }

    #[test]
    fn factors_positive_definite_matrix() {
        assert_reconstructs(&Matrix2::new(4.0, 1.2, 1.2, 1.0));
    }

    #[test]
    fn factors_semidefinite_boundary() {
        // ρ = 1 with σx = σy = 1.
        assert_reconstructs(&Matrix2::new(1.0, 1.0, 1.0, 1.0));
        // σx = 0.
        assert_reconstructs(&Matrix2::new(0.0, 0.0, 0.0, 2.0));
        // Zero matrix.
        assert_reconstructs(&Matrix2::zeros());
    }

    #[test]
    fn rejects_indefinite_and_asymmetric() {
        assert!(upper_cholesky(&Matrix2::new(1.0, 1.5, 1.5, 1.0)).is_none());
        assert!(upper_cholesky(&Matrix2::new(1.0, 0.2, 0.3, 1.0)).is_none());
        assert!(upper_cholesky(&Matrix2::new(-1.0, 0.0, 0.0, 1.0)).is_none());
        assert!(upper_cholesky(&Matrix2::new(f64::NAN, 0.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn projected_variance_of_identity_is_one() {
        let dir = RowVector2::new(3.0, 4.0);
        let v = projected_variance(&dir, &Matrix2::identity(), &Matrix2::identity());
        assert!((v - 1.0).abs() < 1e-12);
    }
}
