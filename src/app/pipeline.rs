//! Shared computation pipeline used by every subcommand.
//!
//! Keeping the workflow here leaves `app.rs` with argument handling and
//! printing only:
//! sample generation -> ellipses -> enclosing window -> curve -> envelope/ticks

use tracing::info;

use crate::config::EngineConfig;
use crate::curve::{age_ticks, envelope_curves, ConcordiaCurve, ConcordiaCurveBuilder, EnvelopeCurves, UncertaintyEnvelope};
use crate::data::{generate_sample, SampleData};
use crate::domain::{AgeTick, DataPoint, DisplayBounds};
use crate::ellipse::{enclosing_bounds, ErrorEllipseCalculator, EllipseGeometry};
use crate::error::{AppError, GeometryError};

/// Margin added around the ellipses when the window is derived from data.
pub const WINDOW_PADDING: f64 = 0.05;

/// All outputs for one visible window.
#[derive(Debug, Clone)]
pub struct CurveRun {
    pub bounds: DisplayBounds,
    pub depth: usize,
    pub curve: ConcordiaCurve,
    pub envelope: Option<EnvelopeCurves>,
    pub ticks: Vec<AgeTick>,
}

/// Outputs of `concordia sample`.
#[derive(Debug, Clone)]
pub struct SampleRun {
    pub sample: SampleData,
    pub ellipses: Vec<Result<EllipseGeometry, GeometryError>>,
    pub curve: CurveRun,
}

/// Build the curve (plus optional envelope and ticks) for `bounds`.
///
/// An invalid window is not an error here: the returned curve is empty and
/// carries its fault, matching what a renderer would draw.
pub fn run_curve(config: &EngineConfig, bounds: &DisplayBounds, with_envelope: bool) -> CurveRun {
    let variant = config.variant();
    let decay = config.decay_constants();
    let builder = ConcordiaCurveBuilder::new(variant, decay).refinement_depth(config.refinement_depth);
    let curve = builder.build_for_bounds(bounds);

    let envelope = (with_envelope && !curve.is_empty()).then(|| {
        let env = UncertaintyEnvelope::for_curve(&curve, config.decay_uncertainty());
        envelope_curves(&curve, &env)
    });
    let ticks = curve
        .span()
        .map(|span| age_ticks(&span, &variant, &decay, config.ticks))
        .unwrap_or_default();

    info!(
        kind = variant.kind().display_name(),
        segments = curve.len(),
        ticks = ticks.len(),
        "curve run complete"
    );
    CurveRun {
        bounds: *bounds,
        depth: builder.depth(),
        curve,
        envelope,
        ticks,
    }
}

/// Ellipse for a single analysis.
pub fn run_ellipse(point: &DataPoint, multiplier: f64) -> Result<EllipseGeometry, AppError> {
    Ok(ErrorEllipseCalculator::new(multiplier).compute(point)?)
}

/// Full synthetic run: the window is fitted around the sample's ellipses.
pub fn run_sample(config: &EngineConfig, with_envelope: bool) -> Result<SampleRun, AppError> {
    let variant = config.variant();
    let decay = config.decay_constants();
    let sample = generate_sample(&config.sample, &variant, &decay)?;

    let ellipses = ErrorEllipseCalculator::new(config.multiplier).compute_all(&sample.points);
    let bounds = enclosing_bounds(ellipses.iter().filter_map(|e| e.as_ref().ok()))
        .ok_or_else(|| AppError::new(4, "No valid ellipses in sample; cannot derive a window."))?
        .padded(WINDOW_PADDING);

    let curve = run_curve(config, &bounds, with_envelope);
    Ok(SampleRun { sample, ellipses, curve })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CurveKind;

    #[test]
    fn wetherill_window_end_to_end() {
        let config = EngineConfig::default();
        let bounds = DisplayBounds::new(0.0, 30.0, 0.0, 0.8);
        let run = run_curve(&config, &bounds, false);

        assert_eq!(run.depth, 5);
        assert!(!run.curve.is_empty());
        let first = run.curve.start_seg().unwrap();
        let last = run.curve.last_seg().unwrap();
        assert!(first.min_x().abs() < 1e-9);
        assert!((last.max_x() - 30.0).abs() < 1e-6);
        assert!(run.envelope.is_none());
        assert!(!run.ticks.is_empty());
    }

    #[test]
    fn invalid_window_gives_empty_curve_not_error() {
        let config = EngineConfig {
            lambda235: 0.0,
            ..EngineConfig::default()
        };
        let run = run_curve(&config, &DisplayBounds::new(0.0, 30.0, 0.0, 0.8), true);
        assert!(run.curve.is_empty());
        assert!(run.curve.fault().is_some());
        assert!(run.envelope.is_none());
        assert!(run.ticks.is_empty());
    }

    #[test]
    fn sample_run_frames_every_ellipse() {
        for curve in [CurveKind::Wetherill, CurveKind::TeraWasserburg] {
            let config = EngineConfig {
                curve,
                sigma_lambda235: 6.7e-13,
                sigma_lambda238: 8.3e-14,
                ..EngineConfig::default()
            };
            let run = run_sample(&config, true).unwrap();
            assert_eq!(run.ellipses.len(), config.sample.count);

            for e in run.ellipses.iter().filter_map(|e| e.as_ref().ok()) {
                let b = e.bounds();
                assert!(run.curve.bounds.contains(b.min_x, b.min_y));
                assert!(run.curve.bounds.contains(b.max_x, b.max_y));
            }
            assert!(!run.curve.curve.is_empty(), "{curve:?}: {:?}", run.curve.curve.fault());
            let envelope = run.curve.envelope.as_ref().unwrap();
            assert_eq!(
                envelope.upper.len() + envelope.lower.len() + envelope.skipped,
                2 * run.curve.curve.len()
            );
        }
    }

    #[test]
    fn invalid_point_maps_to_exit_code_4() {
        let err = run_ellipse(&DataPoint::new(1.0, 1.0, 0.1, 0.1, 1.5), 1.0).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
