//! Ellipse control polygons.
//!
//! An ellipse is drawn as four cubic Bezier quarter-arcs. The 13 control
//! points start and end at `(1, 0)` on the unit circle and run
//! counter-clockwise; the linear map from the Cholesky factor turns that
//! circle into the covariance ellipse.

use serde::Serialize;

use crate::domain::DisplayBounds;

/// Bezier tangent length for a quarter circle: `4/3 · (√2 - 1)`.
pub const BEZIER_CIRCLE_K: f64 = 0.552_284_749_830_793_6;

/// Number of control points in a closed 4-arc cubic polygon.
pub const ELLIPSE_POINTS: usize = 13;

/// Canonical unit-circle control polygon, counter-clockwise from `(1, 0)`.
pub fn unit_circle_polygon() -> [(f64, f64); ELLIPSE_POINTS] {
    let k = BEZIER_CIRCLE_K;
    [
        (1.0, 0.0),
        (1.0, k),
        (k, 1.0),
        (0.0, 1.0),
        (-k, 1.0),
        (-1.0, k),
        (-1.0, 0.0),
        (-1.0, -k),
        (-k, -1.0),
        (0.0, -1.0),
        (k, -1.0),
        (1.0, -k),
        (1.0, 0.0),
    ]
}

/// Closed cubic-Bezier polygon of one error ellipse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EllipseGeometry {
    pub center: (f64, f64),
    pub points: [(f64, f64); ELLIPSE_POINTS],
}

impl EllipseGeometry {
    /// The four cubic arcs as `[start, c1, c2, end]`.
    pub fn arcs(&self) -> [[(f64, f64); 4]; 4] {
        let p = &self.points;
        std::array::from_fn(|i| [p[3 * i], p[3 * i + 1], p[3 * i + 2], p[3 * i + 3]])
    }

    /// Extremes over all control points.
    ///
    /// The control polygon contains the curve, so these bound the drawn
    /// ellipse. Every point is scanned; order does not matter.
    pub fn bounds(&self) -> DisplayBounds {
        let (cx, cy) = self.center;
        self.points.iter().fold(DisplayBounds::new(cx, cx, cy, cy), |b, &(x, y)| {
            DisplayBounds::new(b.min_x.min(x), b.max_x.max(x), b.min_y.min(y), b.max_y.max(y))
        })
    }
}

/// Smallest window containing every ellipse, or `None` for an empty batch.
pub fn enclosing_bounds<'a, I>(ellipses: I) -> Option<DisplayBounds>
where
    I: IntoIterator<Item = &'a EllipseGeometry>,
{
    DisplayBounds::enclosing(ellipses.into_iter().flat_map(|e| e.points))
}
