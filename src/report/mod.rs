//! Reporting: JSON documents and formatted terminal output.

pub mod format;

pub use format::{format_curve_run, format_ellipse, format_sample_run};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::pipeline::{CurveRun, SampleRun};
use crate::curve::EnvelopeCurves;
use crate::domain::{AgeTick, CurveKind, DataPoint, DecayConstants, DisplayBounds, SegmentDescriptor, TimeSpan, YEARS_PER_MA};
use crate::ellipse::EllipseGeometry;
use crate::error::AppError;

/// JSON document for one curve run.
#[derive(Debug, Clone, Serialize)]
pub struct CurveReport {
    pub generated_at: DateTime<Utc>,
    pub kind: CurveKind,
    pub decay: DecayConstants,
    pub bounds: DisplayBounds,
    pub refinement_depth: usize,
    pub span: Option<TimeSpan>,
    /// Why the curve is empty, if it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
    pub segments: Vec<SegmentDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope: Option<EnvelopeCurves>,
    pub ticks: Vec<AgeTick>,
}

impl CurveReport {
    pub fn from_run(run: &CurveRun) -> Self {
        Self {
            generated_at: Utc::now(),
            kind: run.curve.variant().kind(),
            decay: run.curve.decay(),
            bounds: run.bounds,
            refinement_depth: run.depth,
            span: run.curve.span(),
            fault: run.curve.fault().map(ToString::to_string),
            segments: run.curve.descriptors(),
            envelope: run.envelope.clone(),
            ticks: run.ticks.clone(),
        }
    }
}

/// One analysis with its ellipse or the reason it has none.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub point: DataPoint,
    pub age_ma: f64,
    pub ellipse: Option<EllipseGeometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// JSON document for `concordia sample`.
#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub generated_at: DateTime<Utc>,
    pub analyses: Vec<AnalysisReport>,
    pub curve: CurveReport,
}

impl SampleReport {
    pub fn from_run(run: &SampleRun) -> Self {
        let analyses = run
            .sample
            .points
            .iter()
            .zip(&run.sample.ages)
            .zip(&run.ellipses)
            .map(|((point, &t), ellipse)| AnalysisReport {
                point: *point,
                age_ma: t / YEARS_PER_MA,
                ellipse: ellipse.as_ref().ok().copied(),
                error: ellipse.as_ref().err().map(ToString::to_string),
            })
            .collect();
        Self {
            generated_at: Utc::now(),
            analyses,
            curve: CurveReport::from_run(&run.curve),
        }
    }
}

/// JSON document for `concordia ellipse`.
#[derive(Debug, Clone, Serialize)]
pub struct EllipseReport {
    pub generated_at: DateTime<Utc>,
    pub point: DataPoint,
    pub multiplier: f64,
    pub ellipse: EllipseGeometry,
}

impl EllipseReport {
    pub fn new(point: DataPoint, multiplier: f64, ellipse: EllipseGeometry) -> Self {
        Self {
            generated_at: Utc::now(),
            point,
            multiplier,
            ellipse,
        }
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::new(4, format!("Failed to serialize report: {e}")))
}
