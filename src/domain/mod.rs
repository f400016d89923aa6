//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - decay constants and their uncertainties (`DecayConstants`, `DecayUncertainty`)
//! - coordinate system selection (`CurveKind`)
//! - visible windows and age spans (`DisplayBounds`, `TimeSpan`)
//! - measured analyses (`DataPoint`)
//! - renderer-facing outputs (`SegmentDescriptor`, `AgeTick`)

pub mod types;

pub use types::*;
