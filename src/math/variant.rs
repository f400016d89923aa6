//! Concordia curve equations for the two supported coordinate systems.
//!
//! With `E₁ = e^(λ₁t)` and `E₂ = e^(λ₂t)`:
//!
//! - Wetherill: `x = E₁ - 1`, `y = E₂ - 1`
//! - Tera-Wasserburg: `x = 1 / (E₂ - 1)`, `y = (E₁ - 1) / (E₂ - 1) / r`
//!
//! Numerical notes:
//! - `E - 1` is always computed with `exp_m1` to keep precision for young ages
//!   where `λt` is tiny.
//! - A decay constant of exactly 0 collapses its axis to 0 instead of
//!   producing a division by zero.

use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

use crate::domain::{CurveKind, DecayConstants};

/// Strategy object defining x(t), y(t) and their derivatives.
///
/// Segments, the builder and the envelope are generic over this value; none
/// of them knows which coordinate system it is drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurveVariant {
    Wetherill,
    TeraWasserburg { r238_235s: f64 },
}

impl CurveVariant {
    /// Build a variant from a CLI/config selection.
    pub fn from_kind(kind: CurveKind, r238_235s: f64) -> Self {
        match kind {
            CurveKind::Wetherill => CurveVariant::Wetherill,
            CurveKind::TeraWasserburg => CurveVariant::TeraWasserburg { r238_235s },
        }
    }

    pub fn kind(&self) -> CurveKind {
        match self {
            CurveVariant::Wetherill => CurveKind::Wetherill,
            CurveVariant::TeraWasserburg { .. } => CurveKind::TeraWasserburg,
        }
    }

    pub fn x(&self, t: f64, decay: &DecayConstants) -> f64 {
        match *self {
            CurveVariant::Wetherill => {
                if decay.lambda1() == 0.0 {
                    0.0
                } else {
                    (decay.lambda1() * t).exp_m1()
                }
            }
            CurveVariant::TeraWasserburg { .. } => {
                if decay.lambda2() == 0.0 {
                    0.0
                } else {
                    1.0 / (decay.lambda2() * t).exp_m1()
                }
            }
        }
    }

    pub fn y(&self, t: f64, decay: &DecayConstants) -> f64 {
        match *self {
            CurveVariant::Wetherill => {
                if decay.lambda2() == 0.0 {
                    0.0
                } else {
                    (decay.lambda2() * t).exp_m1()
                }
            }
            CurveVariant::TeraWasserburg { r238_235s } => {
                if decay.lambda2() == 0.0 || decay.lambda1() == 0.0 {
                    0.0
                } else {
                    (decay.lambda1() * t).exp_m1() / (decay.lambda2() * t).exp_m1() / r238_235s
                }
            }
        }
    }

    pub fn point(&self, t: f64, decay: &DecayConstants) -> (f64, f64) {
        (self.x(t, decay), self.y(t, decay))
    }

    /// Analytic `dx/dt`.
    pub fn dx_dt(&self, t: f64, decay: &DecayConstants) -> f64 {
        let l1 = decay.lambda1();
        let l2 = decay.lambda2();
        match *self {
            CurveVariant::Wetherill => l1 * (l1 * t).exp(),
            CurveVariant::TeraWasserburg { .. } => {
                if l2 == 0.0 {
                    return 0.0;
                }
                let d2 = (l2 * t).exp_m1();
                -l2 * (d2 + 1.0) / (d2 * d2)
            }
        }
    }

    /// Analytic `dy/dt`.
    pub fn dy_dt(&self, t: f64, decay: &DecayConstants) -> f64 {
        let l1 = decay.lambda1();
        let l2 = decay.lambda2();
        match *self {
            CurveVariant::Wetherill => l2 * (l2 * t).exp(),
            CurveVariant::TeraWasserburg { r238_235s } => {
                if l2 == 0.0 || l1 == 0.0 {
                    return 0.0;
                }
                let d1 = (l1 * t).exp_m1();
                let d2 = (l2 * t).exp_m1();
                (l1 * (d1 + 1.0) * d2 - l2 * (d2 + 1.0) * d1) / (d2 * d2) / r238_235s
            }
        }
    }

    /// Analytic slope `dy/dx` at `t`.
    ///
    /// Returns a non-finite value where the tangent is vertical or an axis is
    /// collapsed; callers guard against that.
    pub fn slope(&self, t: f64, decay: &DecayConstants) -> f64 {
        match *self {
            CurveVariant::Wetherill => {
                // dy/dx = (λ₂/λ₁) (1 + x)^(λ₂/λ₁ - 1)
                let ratio = decay.lambda2() / decay.lambda1();
                let x = self.x(t, decay);
                ratio * (1.0 + x).powf(ratio - 1.0)
            }
            CurveVariant::TeraWasserburg { .. } => self.dy_dt(t, decay) / self.dx_dt(t, decay),
        }
    }

    /// Jacobian `∂(x, y) / ∂(λ₁, λ₂)` at `t`.
    ///
    /// Row 0 is x, row 1 is y; column 0 is λ₁, column 1 is λ₂.
    pub fn lambda_jacobian(&self, t: f64, decay: &DecayConstants) -> Matrix2<f64> {
        let l1 = decay.lambda1();
        let l2 = decay.lambda2();
        match *self {
            CurveVariant::Wetherill => Matrix2::new(
                t * (l1 * t).exp(),
                0.0,
                0.0,
                t * (l2 * t).exp(),
            ),
            CurveVariant::TeraWasserburg { r238_235s } => {
                let d1 = (l1 * t).exp_m1();
                let d2 = (l2 * t).exp_m1();
                let d2_sq = d2 * d2;
                Matrix2::new(
                    0.0,
                    -t * (d2 + 1.0) / d2_sq,
                    t * (d1 + 1.0) / d2 / r238_235s,
                    -t * (d2 + 1.0) * d1 / d2_sq / r238_235s,
                )
            }
        }
    }

    /// Age at which the curve reaches `x`, when x(t) has a closed-form inverse.
    ///
    /// Returns `None` for a zero decay constant or an argument outside the
    /// logarithm's domain.
    pub fn t_from_x(&self, x: f64, decay: &DecayConstants) -> Option<f64> {
        if !x.is_finite() {
            return None;
        }
        match *self {
            CurveVariant::Wetherill => ln_1p_over(x, decay.lambda1()),
            CurveVariant::TeraWasserburg { .. } => {
                if x <= 0.0 {
                    return None;
                }
                ln_1p_over(1.0 / x, decay.lambda2())
            }
        }
    }

    /// Age at which the Wetherill curve reaches `y`.
    ///
    /// Tera-Wasserburg y(t) has no closed-form inverse; the builder brackets
    /// it numerically instead, so this returns `None` for that variant.
    pub fn t_from_y(&self, y: f64, decay: &DecayConstants) -> Option<f64> {
        if !y.is_finite() {
            return None;
        }
        match *self {
            CurveVariant::Wetherill => ln_1p_over(y, decay.lambda2()),
            CurveVariant::TeraWasserburg { .. } => None,
        }
    }
}

/// `ln(1 + v) / λ`, guarded against λ = 0 and `1 + v <= 0`.
fn ln_1p_over(v: f64, lambda: f64) -> Option<f64> {
    if lambda == 0.0 || 1.0 + v <= 0.0 {
        return None;
    }
    let t = v.ln_1p() / lambda;
    t.is_finite().then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TW: CurveVariant = CurveVariant::TeraWasserburg { r238_235s: 137.88 };

    fn close(a: f64, b: f64, rel: f64) -> bool {
        (a - b).abs() <= rel * a.abs().max(b.abs()).max(1e-300)
    }

    #[test]
    fn wetherill_zero_lambda_collapses_axis() {
        let decay = DecayConstants::new(0.0, 1.55125e-10);
        for &t in &[0.0, 1.0e6, 1.0e9, 4.5e9] {
            assert_eq!(CurveVariant::Wetherill.x(t, &decay), 0.0);
        }
        assert!(CurveVariant::Wetherill.y(1.0e9, &decay) > 0.0);
    }

    #[test]
    fn slopes_match_finite_differences() {
        let decay = DecayConstants::uranium();
        for variant in [CurveVariant::Wetherill, TW] {
            for &t in &[1.0e8, 1.0e9, 3.0e9] {
                let h = t * 1e-6;
                let (x0, y0) = variant.point(t - h, &decay);
                let (x1, y1) = variant.point(t + h, &decay);
                let numeric = (y1 - y0) / (x1 - x0);
                let analytic = variant.slope(t, &decay);
                assert!(close(numeric, analytic, 1e-5), "{variant:?} t={t}: {numeric} vs {analytic}");

                let dx = (x1 - x0) / (2.0 * h);
                assert!(close(dx, variant.dx_dt(t, &decay), 1e-5));
            }
        }
    }

    #[test]
    fn wetherill_slope_power_form_matches_derivative_ratio() {
        let decay = DecayConstants::uranium();
        let v = CurveVariant::Wetherill;
        let t = 2.0e9;
        assert!(close(v.slope(t, &decay), v.dy_dt(t, &decay) / v.dx_dt(t, &decay), 1e-10));
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let decay = DecayConstants::uranium();
        let t = 1.5e9;
        for variant in [CurveVariant::Wetherill, TW] {
            let jac = variant.lambda_jacobian(t, &decay);
            let h1 = decay.lambda1() * 1e-6;
            let h2 = decay.lambda2() * 1e-6;
            let d1p = DecayConstants::new(decay.lambda1() + h1, decay.lambda2());
            let d1m = DecayConstants::new(decay.lambda1() - h1, decay.lambda2());
            let d2p = DecayConstants::new(decay.lambda1(), decay.lambda2() + h2);
            let d2m = DecayConstants::new(decay.lambda1(), decay.lambda2() - h2);

            let dy_dl1 = (variant.y(t, &d1p) - variant.y(t, &d1m)) / (2.0 * h1);
            let dx_dl2 = (variant.x(t, &d2p) - variant.x(t, &d2m)) / (2.0 * h2);
            let dy_dl2 = (variant.y(t, &d2p) - variant.y(t, &d2m)) / (2.0 * h2);

            assert!(close(jac[(1, 0)], dy_dl1, 1e-4), "{variant:?}");
            assert!(close(jac[(0, 1)], dx_dl2, 1e-4) || (jac[(0, 1)] == 0.0 && dx_dl2.abs() < 1e-6));
            assert!(close(jac[(1, 1)], dy_dl2, 1e-4) || (jac[(1, 1)] == 0.0 && dy_dl2.abs() < 1e-6));
        }
    }

    #[test]
    fn inverses_round_trip() {
        let decay = DecayConstants::uranium();
        let t = 1.2e9;
        let w = CurveVariant::Wetherill;
        assert!(close(w.t_from_x(w.x(t, &decay), &decay).unwrap(), t, 1e-10));
        assert!(close(w.t_from_y(w.y(t, &decay), &decay).unwrap(), t, 1e-10));
        assert!(close(TW.t_from_x(TW.x(t, &decay), &decay).unwrap(), t, 1e-10));
    }

    #[test]
    fn inverses_reject_invalid_arguments() {
        let decay = DecayConstants::uranium();
        assert!(CurveVariant::Wetherill.t_from_x(-1.0, &decay).is_none());
        assert!(CurveVariant::Wetherill.t_from_x(-2.0, &decay).is_none());
        assert!(CurveVariant::Wetherill.t_from_x(1.0, &DecayConstants::new(0.0, 1.0)).is_none());
        assert!(TW.t_from_x(0.0, &decay).is_none());
    }
}
