//! Shared domain types.
//!
//! These types are intentionally small `Copy` values so they can be:
//!
//! - passed explicitly into every curve/ellipse construction call
//! - shared freely across threads once built
//! - serialized into the JSON report

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// λ²³⁵U in yr⁻¹ (Jaffey et al. 1971).
pub const DEFAULT_LAMBDA_235: f64 = 9.8485e-10;

/// λ²³⁸U in yr⁻¹ (Jaffey et al. 1971).
pub const DEFAULT_LAMBDA_238: f64 = 1.55125e-10;

/// Present-day ²³⁸U/²³⁵U used by the Tera-Wasserburg y-axis.
pub const DEFAULT_R238_235S: f64 = 137.88;

/// Number of recursive-halving passes used when none is requested.
pub const DEFAULT_REFINEMENT_DEPTH: usize = 5;

/// Years per Ma, used for tick labels.
pub const YEARS_PER_MA: f64 = 1.0e6;

/// Immutable pair of decay constants (λ₁, λ₂).
///
/// For U-Pb concordia λ₁ is λ²³⁵U and λ₂ is λ²³⁸U. A constant of exactly
/// zero is allowed; the curve collapses to 0 on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayConstants {
    lambda1: f64,
    lambda2: f64,
}

impl DecayConstants {
    pub const fn new(lambda1: f64, lambda2: f64) -> Self {
        Self { lambda1, lambda2 }
    }

    /// The uranium pair used by Wetherill and Tera-Wasserburg plots.
    pub const fn uranium() -> Self {
        Self::new(DEFAULT_LAMBDA_235, DEFAULT_LAMBDA_238)
    }

    pub fn lambda1(&self) -> f64 {
        self.lambda1
    }

    pub fn lambda2(&self) -> f64 {
        self.lambda2
    }
}

impl Default for DecayConstants {
    fn default() -> Self {
        Self::uranium()
    }
}

/// One-sigma absolute uncertainties of the decay constants.
///
/// Defaults to zero, which yields a zero-width uncertainty envelope. Callers
/// that want a visible envelope supply real σλ values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DecayUncertainty {
    pub sigma_lambda1: f64,
    pub sigma_lambda2: f64,
}

/// Which concordia coordinate system to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CurveKind {
    /// ²⁰⁷Pb/²³⁵U vs ²⁰⁶Pb/²³⁸U.
    Wetherill,
    /// ²³⁸U/²⁰⁶Pb vs ²⁰⁷Pb/²⁰⁶Pb.
    TeraWasserburg,
}

impl CurveKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            CurveKind::Wetherill => "Wetherill",
            CurveKind::TeraWasserburg => "Tera-Wasserburg",
        }
    }
}

/// A closed interval of ages (years) covered by a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub min_t: f64,
    pub max_t: f64,
}

impl TimeSpan {
    pub fn width(&self) -> f64 {
        self.max_t - self.min_t
    }
}

/// Visible data-space window (never pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl DisplayBounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite() && self.max_x.is_finite() && self.min_y.is_finite() && self.max_y.is_finite()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Smallest window containing every point, or `None` for an empty or
    /// non-finite input.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut out: Option<Self> = None;
        for (x, y) in points {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            out = Some(match out {
                None => Self::new(x, x, y, y),
                Some(b) => Self::new(b.min_x.min(x), b.max_x.max(x), b.min_y.min(y), b.max_y.max(y)),
            });
        }
        out
    }

    /// Grow both axes by `frac` of their span on each side.
    ///
    /// A zero-width axis is widened by `frac` of its magnitude (or by `frac`
    /// itself when the value is 0) so the window never collapses.
    pub fn padded(&self, frac: f64) -> Self {
        let (min_x, max_x) = pad_range(self.min_x, self.max_x, frac);
        let (min_y, max_y) = pad_range(self.min_y, self.max_y, frac);
        Self::new(min_x, max_x, min_y, max_y)
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = max - min;
    if span.abs() < 1e-12 {
        let pad = if min.abs() > 0.0 { min.abs() * frac } else { frac };
        return (min - pad, max + pad);
    }
    let pad = span * frac;
    (min - pad, max + pad)
}

/// A measured isotope-ratio analysis.
///
/// `sigma_x` / `sigma_y` are one-sigma absolute uncertainties; `rho` is the
/// error correlation, nominally in [-1, 1]. Validation happens in the
/// ellipse calculator, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
    pub sigma_x: f64,
    pub sigma_y: f64,
    pub rho: f64,
}

impl DataPoint {
    pub fn new(x: f64, y: f64, sigma_x: f64, sigma_y: f64, rho: f64) -> Self {
        Self {
            x,
            y,
            sigma_x,
            sigma_y,
            rho,
        }
    }
}

/// Renderer-facing description of one curve segment.
///
/// The control point defines a quadratic Bezier through the endpoints that
/// matches both endpoint tangents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    pub min_x: f64,
    pub min_y: f64,
    pub control_x: f64,
    pub control_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl SegmentDescriptor {
    /// The same curve as a cubic Bezier: `[start, c1, c2, end]`.
    ///
    /// Degree elevation: `c1 = p0 + 2/3 (q - p0)`, `c2 = p2 + 2/3 (q - p2)`.
    pub fn to_cubic(&self) -> [(f64, f64); 4] {
        let two_thirds = 2.0 / 3.0;
        let c1 = (
            self.min_x + two_thirds * (self.control_x - self.min_x),
            self.min_y + two_thirds * (self.control_y - self.min_y),
        );
        let c2 = (
            self.max_x + two_thirds * (self.control_x - self.max_x),
            self.max_y + two_thirds * (self.control_y - self.max_y),
        );
        [(self.min_x, self.min_y), c1, c2, (self.max_x, self.max_y)]
    }

    /// Evaluate the quadratic Bezier at `u ∈ [0, 1]`.
    pub fn point_at(&self, u: f64) -> (f64, f64) {
        let v = 1.0 - u;
        (
            v * v * self.min_x + 2.0 * v * u * self.control_x + u * u * self.max_x,
            v * v * self.min_y + 2.0 * v * u * self.control_y + u * u * self.max_y,
        )
    }
}

/// A labelled age marker on the concordia curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeTick {
    /// Age in years.
    pub t: f64,
    pub x: f64,
    pub y: f64,
    /// Age in Ma.
    pub label_ma: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enclosing_skips_non_finite_points() {
        let b = DisplayBounds::enclosing([(1.0, 2.0), (f64::NAN, 0.0), (3.0, -1.0)]).unwrap();
        assert_eq!(b, DisplayBounds::new(1.0, 3.0, -1.0, 2.0));
        assert!(DisplayBounds::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn padded_never_collapses() {
        let b = DisplayBounds::new(2.0, 2.0, 0.0, 0.0).padded(0.05);
        assert!(b.max_x > b.min_x);
        assert!(b.max_y > b.min_y);
    }

    #[test]
    fn cubic_elevation_keeps_endpoints_and_midpoint() {
        let seg = SegmentDescriptor {
            min_x: 0.0,
            min_y: 0.0,
            control_x: 1.0,
            control_y: 2.0,
            max_x: 2.0,
            max_y: 0.0,
        };
        let cubic = seg.to_cubic();
        assert_eq!(cubic[0], (0.0, 0.0));
        assert_eq!(cubic[3], (2.0, 0.0));

        // Cubic at u = 0.5: (p0 + 3c1 + 3c2 + p3) / 8 must match the quadratic.
        let mid_x = (cubic[0].0 + 3.0 * cubic[1].0 + 3.0 * cubic[2].0 + cubic[3].0) / 8.0;
        let mid_y = (cubic[0].1 + 3.0 * cubic[1].1 + 3.0 * cubic[2].1 + cubic[3].1) / 8.0;
        let (qx, qy) = seg.point_at(0.5);
        assert!((mid_x - qx).abs() < 1e-12);
        assert!((mid_y - qy).abs() < 1e-12);
    }
}
