//! Covariance → Cholesky factor → ellipse polygon.

use nalgebra::{Matrix2, RowVector2};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::DataPoint;
use crate::ellipse::geometry::{unit_circle_polygon, EllipseGeometry};
use crate::error::GeometryError;
use crate::math::upper_cholesky;

/// Error ellipse for one analysis.
///
/// Steps:
/// - validate `ρ ∈ [-1, 1]`, finite non-negative σ, finite centre, finite
///   non-negative `k`
/// - covariance `[[σx², ρσxσy], [ρσxσy, σy²]]`
/// - upper-triangular `R` with covariance = `Rᵀ R`
/// - each unit-polygon point `p` becomes `(x, y) + k · p R`
///
/// Invalid input returns `InvalidCovariance` and no geometry.
pub fn compute_ellipse(
    x: f64,
    y: f64,
    rho: f64,
    sigma_x: f64,
    sigma_y: f64,
    k: f64,
) -> Result<EllipseGeometry, GeometryError> {
    if !(-1.0..=1.0).contains(&rho) {
        return Err(GeometryError::InvalidCovariance(format!("rho = {rho} is outside [-1, 1]")));
    }
    for (name, sigma) in [("sigma_x", sigma_x), ("sigma_y", sigma_y)] {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(GeometryError::InvalidCovariance(format!("{name} = {sigma} must be finite and >= 0")));
        }
    }
    if !(x.is_finite() && y.is_finite()) {
        return Err(GeometryError::InvalidCovariance(format!("centre ({x}, {y}) is not finite")));
    }
    if !(k.is_finite() && k >= 0.0) {
        return Err(GeometryError::InvalidCovariance(format!("multiplier k = {k} must be finite and >= 0")));
    }

    let cov_xy = rho * sigma_x * sigma_y;
    let covariance = Matrix2::new(sigma_x * sigma_x, cov_xy, cov_xy, sigma_y * sigma_y);
    let r = upper_cholesky(&covariance)
        .ok_or_else(|| GeometryError::InvalidCovariance("covariance is not positive semi-definite".into()))?;

    let points = unit_circle_polygon().map(|(px, py)| {
        let mapped = RowVector2::new(k * px, k * py) * r;
        (x + mapped[0], y + mapped[1])
    });
    Ok(EllipseGeometry { center: (x, y), points })
}

/// Ellipse calculator with a fixed uncertainty multiplier (1σ, 2σ, ...).
#[derive(Debug, Clone, Copy)]
pub struct ErrorEllipseCalculator {
    multiplier: f64,
}

impl ErrorEllipseCalculator {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn compute(&self, point: &DataPoint) -> Result<EllipseGeometry, GeometryError> {
        compute_ellipse(point.x, point.y, point.rho, point.sigma_x, point.sigma_y, self.multiplier)
    }

    /// One result per input point, in input order.
    ///
    /// Points are independent, so the batch runs in parallel; a failure only
    /// affects its own slot.
    pub fn compute_all(&self, points: &[DataPoint]) -> Vec<Result<EllipseGeometry, GeometryError>> {
        let results: Vec<_> = points.par_iter().map(|p| self.compute(p)).collect();
        let rejected = results.iter().filter(|r| r.is_err()).count();
        if rejected > 0 {
            warn!(rejected, total = points.len(), "ellipses rejected");
        }
        debug!(total = points.len(), multiplier = self.multiplier, "ellipses computed");
        results
    }
}

impl Default for ErrorEllipseCalculator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ellipse::geometry::{enclosing_bounds, BEZIER_CIRCLE_K};

    #[test]
    fn unit_covariance_gives_canonical_circle() {
        let e = compute_ellipse(0.0, 0.0, 0.0, 1.0, 1.0, 1.0).unwrap();
        assert_eq!(e.points, unit_circle_polygon());
        assert_eq!(e.points[1], (1.0, BEZIER_CIRCLE_K));
    }

    #[test]
    fn scales_and_translates() {
        let e = compute_ellipse(10.0, -2.0, 0.0, 0.5, 3.0, 2.0).unwrap();
        let b = e.bounds();
        assert!((b.max_x - 11.0).abs() < 1e-12);
        assert!((b.min_x - 9.0).abs() < 1e-12);
        assert!((b.max_y - 4.0).abs() < 1e-12);
        assert!((b.min_y + 8.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_tilts_the_ellipse() {
        let e = compute_ellipse(0.0, 0.0, 0.9, 1.0, 1.0, 1.0).unwrap();
        // Point (1, 0) of the circle maps to the first row of R: (σx, ρσy).
        assert!((e.points[0].0 - 1.0).abs() < 1e-12);
        assert!((e.points[0].1 - 0.9).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_rho_is_rejected() {
        for rho in [1.5, -1.0001, f64::NAN] {
            let err = compute_ellipse(1.0, 1.0, rho, 0.1, 0.1, 1.0).unwrap_err();
            assert!(matches!(err, GeometryError::InvalidCovariance(_)));
        }
    }

    #[test]
    fn bad_sigmas_are_rejected() {
        assert!(compute_ellipse(0.0, 0.0, 0.0, -1.0, 1.0, 1.0).is_err());
        assert!(compute_ellipse(0.0, 0.0, 0.0, 1.0, f64::INFINITY, 1.0).is_err());
        assert!(compute_ellipse(f64::NAN, 0.0, 0.0, 1.0, 1.0, 1.0).is_err());
        assert!(compute_ellipse(0.0, 0.0, 0.0, 1.0, 1.0, -2.0).is_err());
    }

    #[test]
    fn perfect_correlation_is_a_finite_line() {
        for rho in [1.0, -1.0] {
            let e = compute_ellipse(2.0, 3.0, rho, 0.5, 0.25, 1.0).unwrap();
            for &(x, y) in &e.points {
                assert!(x.is_finite() && y.is_finite());
                // Collapsed onto the line through the centre with slope ρσy/σx.
                assert!(((y - 3.0) - rho * 0.5 * (x - 2.0)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn zero_sigma_is_degenerate_not_an_error() {
        let e = compute_ellipse(1.0, 1.0, 0.3, 0.0, 0.5, 1.0).unwrap();
        assert!(e.points.iter().all(|&(x, _)| (x - 1.0).abs() < 1e-12));
    }

    #[test]
    fn batch_keeps_order_and_isolates_failures() {
        let calc = ErrorEllipseCalculator::new(2.0);
        let points = vec![
            DataPoint::new(1.0, 1.0, 0.1, 0.1, 0.0),
            DataPoint::new(2.0, 2.0, 0.1, 0.1, 1.5),
            DataPoint::new(3.0, 3.0, 0.1, 0.1, -0.5),
        ];
        let out = calc.compute_all(&points);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].as_ref().unwrap().center, (1.0, 1.0));
        assert!(out[1].is_err());
        assert_eq!(out[2].as_ref().unwrap().center, (3.0, 3.0));

        let ok: Vec<_> = out.iter().filter_map(|r| r.as_ref().ok()).collect();
        let b = enclosing_bounds(ok).unwrap();
        assert!((b.min_x - 0.8).abs() < 1e-12);
        assert!((b.max_x - 3.2).abs() < 1e-12);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: valid inputs always give finite geometry; |ρ| > 1 never does.
        #[test]
        fn validation_is_total(
            x in -1.0e3f64..1.0e3,
            y in -1.0e3f64..1.0e3,
            rho in -2.0f64..2.0,
            sx in 0.0f64..10.0,
            sy in 0.0f64..10.0,
            k in 0.0f64..3.0,
        ) {
            match compute_ellipse(x, y, rho, sx, sy, k) {
                Ok(e) => {
                    prop_assert!(rho.abs() <= 1.0);
                    prop_assert!(e.points.iter().all(|&(px, py)| px.is_finite() && py.is_finite()));
                }
                Err(err) => {
                    prop_assert!(rho.abs() > 1.0, "unexpected failure: {err}");
                }
            }
        }
    }
}
