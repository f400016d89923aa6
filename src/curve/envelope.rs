//! Decay-constant uncertainty envelope around a concordia curve.
//!
//! For an age t the envelope half-width is the propagated decay-constant
//! variance projected onto the curve normal:
//!
//! ```text
//! C = diag(σλ₁², σλ₂²)
//! J = ∂(x, y) / ∂(λ₁, λ₂)
//! p = (-dy/dt, dx/dt)
//! σ² = p J C Jᵀ pᵀ / p pᵀ
//! θ = atan2(p_y, p_x)
//! δ = (2 cos θ σ, 2 sin θ σ)
//! ```
//!
//! The upper envelope is `curve + δ`, the lower one `curve - δ`. With the
//! default zero σλ both collapse onto the curve.

use nalgebra::{Matrix2, RowVector2};
use serde::Serialize;
use tracing::{debug, trace};

use crate::curve::builder::ConcordiaCurve;
use crate::curve::segment::control_or_midpoint;
use crate::domain::{DecayConstants, DecayUncertainty, SegmentDescriptor};
use crate::error::GeometryError;
use crate::math::{projected_variance, CurveVariant};

/// Relative step for the envelope slope finite difference.
const SLOPE_REL_STEP: f64 = 1e-4;

/// Smallest finite-difference step, in years.
const SLOPE_MIN_STEP: f64 = 1.0;

/// Envelope offsets for one curve variant and one set of decay constants.
#[derive(Debug, Clone, Copy)]
pub struct UncertaintyEnvelope {
    variant: CurveVariant,
    decay: DecayConstants,
    uncertainty: DecayUncertainty,
}

impl UncertaintyEnvelope {
    pub fn new(variant: CurveVariant, decay: DecayConstants, uncertainty: DecayUncertainty) -> Self {
        Self {
            variant,
            decay,
            uncertainty,
        }
    }

    /// Envelope for an already built curve.
    pub fn for_curve(curve: &ConcordiaCurve, uncertainty: DecayUncertainty) -> Self {
        Self::new(curve.variant(), curve.decay(), uncertainty)
    }

    pub fn uncertainty(&self) -> DecayUncertainty {
        self.uncertainty
    }

    /// Covariance of (λ₁, λ₂); the constants are treated as uncorrelated.
    pub fn covariance(&self) -> Matrix2<f64> {
        let s1 = self.uncertainty.sigma_lambda1;
        let s2 = self.uncertainty.sigma_lambda2;
        Matrix2::new(s1 * s1, 0.0, 0.0, s2 * s2)
    }

    /// `(δx, δy)` at age `t`.
    pub fn try_delta(&self, t: f64) -> Result<(f64, f64), GeometryError> {
        if !t.is_finite() {
            return Err(GeometryError::NonFiniteEnvelope { t });
        }
        let dx = self.variant.dx_dt(t, &self.decay);
        let dy = self.variant.dy_dt(t, &self.decay);
        let perp = RowVector2::new(-dy, dx);
        let jac = self.variant.lambda_jacobian(t, &self.decay);

        let variance = projected_variance(&perp, &jac, &self.covariance());
        // Rounding can leave a PSD projection a hair below zero.
        let sigma = variance.max(0.0).sqrt();
        let theta = perp[1].atan2(perp[0]);
        let delta = (2.0 * theta.cos() * sigma, 2.0 * theta.sin() * sigma);

        if variance.is_finite() && delta.0.is_finite() && delta.1.is_finite() {
            Ok(delta)
        } else {
            Err(GeometryError::NonFiniteEnvelope { t })
        }
    }

    /// [`Self::try_delta`], with "no envelope at this age" as `None`.
    pub fn delta(&self, t: f64) -> Option<(f64, f64)> {
        self.try_delta(t).ok()
    }

    pub fn upper_point(&self, t: f64) -> Option<(f64, f64)> {
        self.offset_point(t, 1.0)
    }

    pub fn lower_point(&self, t: f64) -> Option<(f64, f64)> {
        self.offset_point(t, -1.0)
    }

    fn offset_point(&self, t: f64, sign: f64) -> Option<(f64, f64)> {
        let (dx, dy) = self.delta(t)?;
        let (x, y) = self.variant.point(t, &self.decay);
        let p = (x + sign * dx, y + sign * dy);
        (p.0.is_finite() && p.1.is_finite()).then_some(p)
    }

    /// Central-difference slope of the offset curve at `t`.
    fn offset_slope(&self, t: f64, sign: f64) -> Option<f64> {
        let h = (t.abs() * SLOPE_REL_STEP).max(SLOPE_MIN_STEP);
        let (x0, y0) = self.offset_point(t - h, sign)?;
        let (x1, y1) = self.offset_point(t + h, sign)?;
        let slope = (y1 - y0) / (x1 - x0);
        slope.is_finite().then_some(slope)
    }

    fn offset_segment(&self, min_t: f64, max_t: f64, sign: f64) -> Option<SegmentDescriptor> {
        let p1 = self.offset_point(min_t, sign)?;
        let p2 = self.offset_point(max_t, sign)?;
        let m1 = self.offset_slope(min_t, sign)?;
        let m2 = self.offset_slope(max_t, sign)?;
        let (control_x, control_y) = control_or_midpoint(p1, m1, p2, m2);
        Some(SegmentDescriptor {
            min_x: p1.0,
            min_y: p1.1,
            control_x,
            control_y,
            max_x: p2.0,
            max_y: p2.1,
        })
    }
}

/// Upper and lower envelope segments for a whole curve.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvelopeCurves {
    pub upper: Vec<SegmentDescriptor>,
    pub lower: Vec<SegmentDescriptor>,
    /// Envelope segments dropped because a sample was non-finite.
    pub skipped: usize,
}

/// One upper and one lower descriptor per curve segment.
///
/// Segments touching an age without a finite envelope are left out; the rest
/// of the envelope is still produced.
pub fn envelope_curves(curve: &ConcordiaCurve, envelope: &UncertaintyEnvelope) -> EnvelopeCurves {
    let mut out = EnvelopeCurves::default();
    for seg in curve.segments() {
        for (sign, side) in [(1.0, &mut out.upper), (-1.0, &mut out.lower)] {
            match envelope.offset_segment(seg.min_t(), seg.max_t(), sign) {
                Some(desc) => side.push(desc),
                None => {
                    trace!(min_t = seg.min_t(), max_t = seg.max_t(), sign, "envelope segment skipped");
                    out.skipped += 1;
                }
            }
        }
    }
    debug!(
        upper = out.upper.len(),
        lower = out.lower.len(),
        skipped = out.skipped,
        "envelope built"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::builder::build_curve;

    fn sigmas() -> DecayUncertainty {
        // Jaffey et al. one-sigma uncertainties.
        DecayUncertainty {
            sigma_lambda1: 6.7e-13,
            sigma_lambda2: 8.3e-14,
        }
    }

    #[test]
    fn zero_sigma_gives_zero_width() {
        let env = UncertaintyEnvelope::new(CurveVariant::Wetherill, DecayConstants::uranium(), DecayUncertainty::default());
        for &t in &[0.0, 1.0e8, 2.5e9] {
            let (dx, dy) = env.delta(t).unwrap();
            assert_eq!(dx.abs(), 0.0);
            assert_eq!(dy.abs(), 0.0);
        }
        let curve = build_curve(CurveVariant::Wetherill, DecayConstants::uranium(), 1.0e8, 2.0e9, 3);
        let env_curves = envelope_curves(&curve, &env);
        assert_eq!(env_curves.skipped, 0);
        for (upper, seg) in env_curves.upper.iter().zip(curve.segments()) {
            let d = seg.descriptor();
            assert!((upper.min_x - d.min_x).abs() < 1e-12);
            assert!((upper.max_y - d.max_y).abs() < 1e-12);
        }
    }

    #[test]
    fn offset_is_perpendicular_to_tangent() {
        let decay = DecayConstants::uranium();
        for variant in [CurveVariant::Wetherill, CurveVariant::TeraWasserburg { r238_235s: 137.88 }] {
            let env = UncertaintyEnvelope::new(variant, decay, sigmas());
            let t = 1.0e9;
            let (dx, dy) = env.delta(t).unwrap();
            assert!(dx != 0.0 || dy != 0.0);
            let tx = variant.dx_dt(t, &decay);
            let ty = variant.dy_dt(t, &decay);
            let cos = (dx * tx + dy * ty) / ((dx * dx + dy * dy).sqrt() * (tx * tx + ty * ty).sqrt());
            assert!(cos.abs() < 1e-9, "{variant:?}: cos = {cos}");
        }
    }

    #[test]
    fn upper_lies_above_wetherill_curve() {
        let decay = DecayConstants::uranium();
        let env = UncertaintyEnvelope::new(CurveVariant::Wetherill, decay, sigmas());
        let t = 2.0e9;
        let (_, y) = CurveVariant::Wetherill.point(t, &decay);
        let (ux, uy) = env.upper_point(t).unwrap();
        let (lx, ly) = env.lower_point(t).unwrap();
        assert!(uy > y && ly < y);
        // Symmetric about the curve.
        let (x, _) = CurveVariant::Wetherill.point(t, &decay);
        assert!(((ux + lx) / 2.0 - x).abs() < 1e-12);
    }

    #[test]
    fn non_finite_age_has_no_envelope() {
        let env = UncertaintyEnvelope::new(CurveVariant::Wetherill, DecayConstants::uranium(), sigmas());
        assert!(env.delta(f64::NAN).is_none());
        assert!(matches!(env.try_delta(f64::INFINITY), Err(GeometryError::NonFiniteEnvelope { .. })));
    }

    #[test]
    fn envelope_widens_with_age() {
        let env = UncertaintyEnvelope::new(CurveVariant::Wetherill, DecayConstants::uranium(), sigmas());
        let width = |t: f64| {
            let (dx, dy) = env.delta(t).unwrap();
            (dx * dx + dy * dy).sqrt()
        };
        assert!(width(3.0e9) > width(5.0e8));
    }

    #[test]
    fn envelope_curves_cover_every_segment() {
        let decay = DecayConstants::uranium();
        let curve = build_curve(CurveVariant::Wetherill, decay, 1.0e8, 4.0e9, 4);
        let env = UncertaintyEnvelope::for_curve(&curve, sigmas());
        let out = envelope_curves(&curve, &env);
        assert_eq!(out.upper.len(), curve.len());
        assert_eq!(out.lower.len(), curve.len());
        for d in out.upper.iter().chain(&out.lower) {
            assert!(d.control_x.is_finite() && d.control_y.is_finite());
        }
    }
}
