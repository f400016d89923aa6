//! Curve segments and the construction-time segment arena.
//!
//! A segment covers `[min_t, max_t]` of the age parameter. Its geometry
//! (endpoints, slopes, Bezier control point) is derived on demand from the
//! variant and decay constants it carries, so a segment never goes stale.
//!
//! Neighbour links are indices rather than references:
//! - while refining, indices point into the builder's [`SegmentArena`]
//! - once finished, indices point into the owning curve's ordered `Vec`

use tracing::trace;

use crate::domain::{DecayConstants, SegmentDescriptor};
use crate::error::GeometryError;
use crate::math::CurveVariant;

/// Stable index of a segment within its arena or finished curve.
pub type SegmentId = usize;

/// Relative tolerance below which two slopes count as parallel.
const PARALLEL_SLOPE_EPS: f64 = 1e-12;

/// One sub-interval of the concordia curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSegment {
    min_t: f64,
    max_t: f64,
    left_seg: Option<SegmentId>,
    right_seg: Option<SegmentId>,
    variant: CurveVariant,
    decay: DecayConstants,
}

impl CurveSegment {
    pub fn new(min_t: f64, max_t: f64, variant: CurveVariant, decay: DecayConstants) -> Self {
        debug_assert!(min_t <= max_t, "segment requires min_t <= max_t");
        Self {
            min_t,
            max_t,
            left_seg: None,
            right_seg: None,
            variant,
            decay,
        }
    }

    pub fn min_t(&self) -> f64 {
        self.min_t
    }

    pub fn max_t(&self) -> f64 {
        self.max_t
    }

    pub fn left_seg(&self) -> Option<SegmentId> {
        self.left_seg
    }

    pub fn right_seg(&self) -> Option<SegmentId> {
        self.right_seg
    }

    pub fn variant(&self) -> CurveVariant {
        self.variant
    }

    pub fn decay(&self) -> DecayConstants {
        self.decay
    }

    pub fn min_x(&self) -> f64 {
        self.variant.x(self.min_t, &self.decay)
    }

    pub fn min_y(&self) -> f64 {
        self.variant.y(self.min_t, &self.decay)
    }

    pub fn max_x(&self) -> f64 {
        self.variant.x(self.max_t, &self.decay)
    }

    pub fn max_y(&self) -> f64 {
        self.variant.y(self.max_t, &self.decay)
    }

    /// `((x(min_t), y(min_t)), (x(max_t), y(max_t)))`.
    pub fn endpoints(&self) -> ((f64, f64), (f64, f64)) {
        (
            self.variant.point(self.min_t, &self.decay),
            self.variant.point(self.max_t, &self.decay),
        )
    }

    /// Curve slopes `dy/dx` at `min_t` and `max_t`.
    pub fn slopes(&self) -> (f64, f64) {
        (
            self.variant.slope(self.min_t, &self.decay),
            self.variant.slope(self.max_t, &self.decay),
        )
    }

    /// Intersection of the endpoint tangents, or `SingularTangent` when the
    /// tangents are parallel (or any input is non-finite).
    pub fn try_control_point(&self) -> Result<(f64, f64), GeometryError> {
        let (p1, p2) = self.endpoints();
        let (m1, m2) = self.slopes();
        tangent_intersection(p1, m1, p2, m2)
    }

    /// Control point of the quadratic Bezier matching both endpoint tangents.
    ///
    /// Falls back to the chord midpoint when the tangents are parallel, which
    /// turns the Bezier into the straight chord.
    pub fn control_point(&self) -> (f64, f64) {
        let (p1, p2) = self.endpoints();
        let (m1, m2) = self.slopes();
        control_or_midpoint(p1, m1, p2, m2)
    }

    pub fn descriptor(&self) -> SegmentDescriptor {
        let ((min_x, min_y), (max_x, max_y)) = self.endpoints();
        let (control_x, control_y) = self.control_point();
        SegmentDescriptor {
            min_x,
            min_y,
            control_x,
            control_y,
            max_x,
            max_y,
        }
    }

    pub(crate) fn relink(&mut self, left_seg: Option<SegmentId>, right_seg: Option<SegmentId>) {
        self.left_seg = left_seg;
        self.right_seg = right_seg;
    }
}

/// Intersection of the lines through `p1` with slope `m1` and `p2` with slope `m2`.
///
/// ```text
/// cx = (m1·x1 - m2·x2 - y1 + y2) / (m1 - m2)
/// cy = (m1·m2·(x1 - x2) - m2·y1 + m1·y2) / (m1 - m2)
/// ```
pub fn tangent_intersection(
    p1: (f64, f64),
    m1: f64,
    p2: (f64, f64),
    m2: f64,
) -> Result<(f64, f64), GeometryError> {
    let (x1, y1) = p1;
    let (x2, y2) = p2;
    let denom = m1 - m2;
    let scale = m1.abs().max(m2.abs()).max(1.0);
    if !denom.is_finite() || denom.abs() <= PARALLEL_SLOPE_EPS * scale {
        return Err(GeometryError::SingularTangent { m1, m2 });
    }

    let cx = (m1 * x1 - m2 * x2 - y1 + y2) / denom;
    let cy = (m1 * m2 * (x1 - x2) - m2 * y1 + m1 * y2) / denom;
    if cx.is_finite() && cy.is_finite() {
        Ok((cx, cy))
    } else {
        Err(GeometryError::SingularTangent { m1, m2 })
    }
}

/// [`tangent_intersection`] with the chord-midpoint fallback.
pub fn control_or_midpoint(p1: (f64, f64), m1: f64, p2: (f64, f64), m2: f64) -> (f64, f64) {
    match tangent_intersection(p1, m1, p2, m2) {
        Ok(c) => c,
        Err(err) => {
            trace!(%err, "using chord midpoint as control point");
            ((p1.0 + p2.0) / 2.0, (p1.1 + p2.1) / 2.0)
        }
    }
}

/// Doubly linked segment chain used only while refining a curve.
///
/// This is the one place where segments are mutated. The arena is private to
/// the builder and is consumed by [`SegmentArena::into_ordered`], so a
/// finished curve can never be split again.
#[derive(Debug)]
pub(crate) struct SegmentArena {
    nodes: Vec<CurveSegment>,
    head: SegmentId,
}

impl SegmentArena {
    pub(crate) fn new(root: CurveSegment) -> Self {
        let mut root = root;
        root.relink(None, None);
        Self {
            nodes: vec![root],
            head: 0,
        }
    }

    pub(crate) fn head(&self) -> SegmentId {
        self.head
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: SegmentId) -> &CurveSegment {
        &self.nodes[id]
    }

    /// Split segment `id` at its midpoint.
    ///
    /// A new segment `[min_t, mid]` is spliced in as the left neighbour (the
    /// old left neighbour's right link is redirected to it) and segment `id`
    /// shrinks in place to `[mid, max_t]`. Returns the new segment's id.
    pub(crate) fn split_left(&mut self, id: SegmentId) -> SegmentId {
        let seg = self.nodes[id];
        let mid = seg.min_t + (seg.max_t - seg.min_t) / 2.0;
        let new_id = self.nodes.len();

        let mut left = CurveSegment::new(seg.min_t, mid, seg.variant, seg.decay);
        left.relink(seg.left_seg, Some(id));
        self.nodes.push(left);

        if let Some(old_left) = seg.left_seg {
            self.nodes[old_left].right_seg = Some(new_id);
        }
        let node = &mut self.nodes[id];
        node.left_seg = Some(new_id);
        node.min_t = mid;

        new_id
    }

    /// One refinement pass.
    ///
    /// Walks right from the current head, splitting every visited segment.
    /// Following each visited segment's right link skips the halves inserted
    /// on its left, so every segment present at the start of the pass is split
    /// exactly once. The head then moves to the new leftmost segment.
    pub(crate) fn refine_pass(&mut self) {
        let mut cursor = Some(self.head);
        while let Some(id) = cursor {
            self.split_left(id);
            cursor = self.nodes[id].right_seg;
        }
        if let Some(new_head) = self.nodes[self.head].left_seg {
            self.head = new_head;
        }
    }

    /// Consume the arena into a left-to-right ordered `Vec`, rewriting links
    /// to positions in that `Vec`.
    pub(crate) fn into_ordered(self) -> Vec<CurveSegment> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut cursor = Some(self.head);
        while let Some(id) = cursor {
            order.push(id);
            cursor = self.nodes[id].right_seg;
        }

        let last = order.len().saturating_sub(1);
        order
            .iter()
            .enumerate()
            .map(|(pos, &id)| {
                let mut seg = self.nodes[id];
                let left = (pos > 0).then(|| pos - 1);
                let right = (pos < last).then(|| pos + 1);
                seg.relink(left, right);
                seg
            })
            .collect()
    }
}
