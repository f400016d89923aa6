//! Concordia curve construction.
//!
//! - `segment`: one age sub-interval and its quadratic Bezier geometry
//! - `builder`: visible-window domain and recursive-halving refinement
//! - `envelope`: decay-constant uncertainty offsets
//! - `ticks`: labelled age markers

pub mod builder;
pub mod envelope;
pub mod segment;
pub mod ticks;

pub use builder::{build_curve, compute_domain, ConcordiaCurve, ConcordiaCurveBuilder, MAX_REFINEMENT_DEPTH};
pub use envelope::{envelope_curves, EnvelopeCurves, UncertaintyEnvelope};
pub use segment::{control_or_midpoint, tangent_intersection, CurveSegment, SegmentId};
pub use ticks::{age_ticks, nice_step};
