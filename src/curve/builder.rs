//! Visible-domain derivation and recursive-halving refinement.
//!
//! Building a curve is two steps:
//!
//! 1. map the four display-space bounds to ages and intersect them, so the
//!    curve spans exactly the visible part of the plot
//! 2. start from one segment over that span and run `depth` halving passes
//!
//! The result is an immutable [`ConcordiaCurve`]; the window changing means
//! building a new one.

use tracing::{debug, warn};

use crate::curve::segment::{CurveSegment, SegmentArena};
use crate::domain::{DecayConstants, DisplayBounds, SegmentDescriptor, TimeSpan, DEFAULT_REFINEMENT_DEPTH};
use crate::error::GeometryError;
use crate::math::{invert_monotone, CurveVariant};

/// Upper bound on refinement passes (2¹⁶ segments).
pub const MAX_REFINEMENT_DEPTH: usize = 16;

/// Youngest age considered for Tera-Wasserburg curves (x diverges at t = 0).
pub const TW_MIN_T: f64 = 1.0e6;

/// Oldest age considered for Tera-Wasserburg curves (age of the Earth).
pub const TW_MAX_T: f64 = 4.544e9;

/// An ordered, finished chain of curve segments.
///
/// Invariant: for every segment with a right neighbour,
/// `segment.max_t() == right.min_t()`. Neighbour ids index into
/// [`ConcordiaCurve::segments`].
#[derive(Debug, Clone)]
pub struct ConcordiaCurve {
    variant: CurveVariant,
    decay: DecayConstants,
    segments: Vec<CurveSegment>,
    fault: Option<GeometryError>,
}

impl ConcordiaCurve {
    /// A curve with no segments, remembering why it is empty.
    pub fn empty(variant: CurveVariant, decay: DecayConstants, fault: GeometryError) -> Self {
        Self {
            variant,
            decay,
            segments: Vec::new(),
            fault: Some(fault),
        }
    }

    pub fn variant(&self) -> CurveVariant {
        self.variant
    }

    pub fn decay(&self) -> DecayConstants {
        self.decay
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Why the curve is empty, if it is.
    pub fn fault(&self) -> Option<&GeometryError> {
        self.fault.as_ref()
    }

    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    pub fn start_seg(&self) -> Option<&CurveSegment> {
        self.segments.first()
    }

    pub fn last_seg(&self) -> Option<&CurveSegment> {
        self.segments.last()
    }

    pub fn right_of(&self, seg: &CurveSegment) -> Option<&CurveSegment> {
        seg.right_seg().and_then(|id| self.segments.get(id))
    }

    pub fn left_of(&self, seg: &CurveSegment) -> Option<&CurveSegment> {
        seg.left_seg().and_then(|id| self.segments.get(id))
    }

    /// Age span covered by the chain.
    pub fn span(&self) -> Option<TimeSpan> {
        let first = self.start_seg()?;
        let last = self.last_seg()?;
        Some(TimeSpan {
            min_t: first.min_t(),
            max_t: last.max_t(),
        })
    }

    /// Renderer-facing descriptors, left to right.
    pub fn descriptors(&self) -> Vec<SegmentDescriptor> {
        self.segments.iter().map(CurveSegment::descriptor).collect()
    }
}

/// Builds concordia curves for one variant and one set of decay constants.
#[derive(Debug, Clone, Copy)]
pub struct ConcordiaCurveBuilder {
    variant: CurveVariant,
    decay: DecayConstants,
    depth: usize,
}

impl ConcordiaCurveBuilder {
    pub fn new(variant: CurveVariant, decay: DecayConstants) -> Self {
        Self {
            variant,
            decay,
            depth: DEFAULT_REFINEMENT_DEPTH,
        }
    }

    /// Number of halving passes; clamped to [`MAX_REFINEMENT_DEPTH`].
    pub fn refinement_depth(mut self, depth: usize) -> Self {
        if depth > MAX_REFINEMENT_DEPTH {
            warn!(depth, max = MAX_REFINEMENT_DEPTH, "refinement depth clamped");
        }
        self.depth = depth.min(MAX_REFINEMENT_DEPTH);
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn compute_domain(&self, bounds: &DisplayBounds) -> Result<TimeSpan, GeometryError> {
        compute_domain(bounds, &self.decay, &self.variant)
    }

    pub fn build_curve(&self, min_t: f64, max_t: f64) -> ConcordiaCurve {
        build_curve(self.variant, self.decay, min_t, max_t, self.depth)
    }

    /// Domain derivation plus refinement; an invalid window yields an empty
    /// curve carrying the fault.
    pub fn build_for_bounds(&self, bounds: &DisplayBounds) -> ConcordiaCurve {
        match self.compute_domain(bounds) {
            Ok(span) => self.build_curve(span.min_t, span.max_t),
            Err(err) => {
                warn!(%err, ?bounds, "no visible concordia");
                ConcordiaCurve::empty(self.variant, self.decay, err)
            }
        }
    }
}

/// Map the visible window to the age span whose curve lies inside it.
///
/// Each axis contributes the ages at which the curve crosses its two bounds;
/// the span is the intersection of the per-axis spans:
///
/// ```text
/// min_t = max(t_x_low, t_y_low)
/// max_t = min(t_x_high, t_y_high)
/// ```
///
/// Wetherill inverts `t = ln(1 + v) / λ` and clamps negative ages to 0.
/// Tera-Wasserburg inverts x in closed form, brackets y by bisection, and
/// constrains ages to `[TW_MIN_T, TW_MAX_T]`.
pub fn compute_domain(
    bounds: &DisplayBounds,
    decay: &DecayConstants,
    variant: &CurveVariant,
) -> Result<TimeSpan, GeometryError> {
    if !bounds.is_finite() {
        return Err(GeometryError::InvalidDomain("display bounds must be finite".into()));
    }
    if bounds.min_x > bounds.max_x || bounds.min_y > bounds.max_y {
        return Err(GeometryError::InvalidDomain(format!(
            "display bounds are inverted: {bounds:?}"
        )));
    }
    if decay.lambda1() == 0.0 || decay.lambda2() == 0.0 {
        return Err(GeometryError::InvalidDomain(
            "a zero decay constant makes the age axis degenerate".into(),
        ));
    }

    let span = match variant {
        CurveVariant::Wetherill => wetherill_domain(bounds, decay, variant)?,
        CurveVariant::TeraWasserburg { .. } => tera_wasserburg_domain(bounds, decay, variant)?,
    };

    if !(span.min_t.is_finite() && span.max_t.is_finite()) || span.min_t >= span.max_t {
        return Err(GeometryError::InvalidDomain(format!(
            "curve does not cross the visible window (t = {:.6e}..{:.6e})",
            span.min_t, span.max_t
        )));
    }
    debug!(min_t = span.min_t, max_t = span.max_t, kind = variant.kind().display_name(), "curve domain");
    Ok(span)
}

fn wetherill_domain(
    bounds: &DisplayBounds,
    decay: &DecayConstants,
    variant: &CurveVariant,
) -> Result<TimeSpan, GeometryError> {
    let invert_x = |v: f64| {
        variant
            .t_from_x(v, decay)
            .ok_or_else(|| log_argument_error("x", v))
    };
    let invert_y = |v: f64| {
        variant
            .t_from_y(v, decay)
            .ok_or_else(|| log_argument_error("y", v))
    };

    let min_x_t = invert_x(bounds.min_x)?;
    let min_y_t = invert_y(bounds.min_y)?;
    let max_x_t = invert_x(bounds.max_x)?;
    let max_y_t = invert_y(bounds.max_y)?;

    Ok(TimeSpan {
        min_t: min_x_t.max(min_y_t).max(0.0),
        max_t: max_x_t.min(max_y_t),
    })
}

fn tera_wasserburg_domain(
    bounds: &DisplayBounds,
    decay: &DecayConstants,
    variant: &CurveVariant,
) -> Result<TimeSpan, GeometryError> {
    if bounds.max_x <= 0.0 {
        return Err(GeometryError::InvalidDomain(format!(
            "Tera-Wasserburg x is positive for every age, window max_x = {}",
            bounds.max_x
        )));
    }

    // x decreases with age: the right edge gives the youngest visible age and
    // the left edge the oldest. A left edge at or below 0 never binds.
    let x_low = variant
        .t_from_x(bounds.max_x, decay)
        .ok_or_else(|| log_argument_error("x", bounds.max_x))?;
    let x_high = variant.t_from_x(bounds.min_x, decay).unwrap_or(TW_MAX_T);

    let y_of = |t: f64| variant.y(t, decay);
    let y_a = invert_monotone(y_of, bounds.min_y, TW_MIN_T, TW_MAX_T)
        .ok_or_else(|| GeometryError::InvalidDomain("y(t) is not finite over the age range".into()))?;
    let y_b = invert_monotone(y_of, bounds.max_y, TW_MIN_T, TW_MAX_T)
        .ok_or_else(|| GeometryError::InvalidDomain("y(t) is not finite over the age range".into()))?;

    let constrain = |t: f64| t.clamp(TW_MIN_T, TW_MAX_T);
    Ok(TimeSpan {
        min_t: constrain(x_low).max(constrain(y_a.min(y_b))),
        max_t: constrain(x_high).min(constrain(y_a.max(y_b))),
    })
}

fn log_argument_error(axis: &str, value: f64) -> GeometryError {
    GeometryError::InvalidDomain(format!("{axis} bound {value} is outside the logarithm's domain"))
}

/// Build a refined chain over `[min_t, max_t]`.
///
/// Starts from one root segment and runs `depth` passes; every pass splits
/// each segment present at its start exactly once, so the segment count after
/// `n` passes follows `c(0) = 1, c(n) = 2·c(n-1)`.
pub fn build_curve(
    variant: CurveVariant,
    decay: DecayConstants,
    min_t: f64,
    max_t: f64,
    depth: usize,
) -> ConcordiaCurve {
    if !(min_t.is_finite() && max_t.is_finite()) || min_t > max_t {
        let err = GeometryError::InvalidDomain(format!("invalid age span {min_t}..{max_t}"));
        warn!(%err, "curve not built");
        return ConcordiaCurve::empty(variant, decay, err);
    }
    let depth = depth.min(MAX_REFINEMENT_DEPTH);

    let mut arena = SegmentArena::new(CurveSegment::new(min_t, max_t, variant, decay));
    for _ in 0..depth {
        arena.refine_pass();
    }
    debug!(depth, segments = arena.len(), head = arena.head(), "concordia refined");

    ConcordiaCurve {
        variant,
        decay,
        segments: arena.into_ordered(),
        fault: None,
    }
}
