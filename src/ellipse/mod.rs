//! Error ellipses for measured analyses.

pub mod calculator;
pub mod geometry;

pub use calculator::{compute_ellipse, ErrorEllipseCalculator};
pub use geometry::{enclosing_bounds, unit_circle_polygon, EllipseGeometry, BEZIER_CIRCLE_K, ELLIPSE_POINTS};
