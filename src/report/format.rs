//! Formatted terminal output.
//!
//! Formatting lives here so the geometry code never prints and output
//! changes stay in one file.

use crate::app::pipeline::{CurveRun, SampleRun};
use crate::domain::{DataPoint, DisplayBounds, SegmentDescriptor, YEARS_PER_MA};
use crate::ellipse::EllipseGeometry;

/// Curve header, segment table, envelope summary and ticks.
pub fn format_curve_run(run: &CurveRun) -> String {
    let mut out = String::new();
    let curve = &run.curve;
    let decay = curve.decay();

    out.push_str(&format!("=== concordia - {} ===\n", curve.variant().kind().display_name()));
    out.push_str(&format!(
        "Decay constants: l235={:.5e} l238={:.5e} /yr\n",
        decay.lambda1(),
        decay.lambda2()
    ));
    out.push_str(&format!("Window: {}\n", fmt_bounds(&run.bounds)));

    let Some(span) = curve.span() else {
        let reason = curve.fault().map(ToString::to_string).unwrap_or_else(|| "no segments".to_string());
        out.push_str(&format!("No visible concordia: {reason}\n"));
        return out;
    };
    out.push_str(&format!(
        "Ages: [{:.2}, {:.2}] Ma | depth={} | segments={}\n",
        span.min_t / YEARS_PER_MA,
        span.max_t / YEARS_PER_MA,
        run.depth,
        curve.len()
    ));

    out.push('\n');
    out.push_str(&format_segment_table(&curve.descriptors()));

    if let Some(envelope) = &run.envelope {
        out.push_str(&format!(
            "\nEnvelope: upper={} lower={} skipped={}\n",
            envelope.upper.len(),
            envelope.lower.len(),
            envelope.skipped
        ));
    }

    if !run.ticks.is_empty() {
        out.push_str("\nAge ticks:\n");
        for tick in &run.ticks {
            out.push_str(&format!("  {:>8.0} Ma  x={:<12.6} y={:.6}\n", tick.label_ma, tick.x, tick.y));
        }
    }

    out
}

pub fn format_ellipse(point: &DataPoint, multiplier: f64, ellipse: &EllipseGeometry) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Ellipse at ({}, {}) sx={} sy={} rho={} k={multiplier}\n",
        point.x, point.y, point.sigma_x, point.sigma_y, point.rho
    ));
    for (i, (x, y)) in ellipse.points.iter().enumerate() {
        out.push_str(&format!("  {i:>2}  {x:>14.8} {y:>14.8}\n"));
    }
    out.push_str(&format!("Extent: {}\n", fmt_bounds(&ellipse.bounds())));
    out
}

pub fn format_sample_run(run: &SampleRun) -> String {
    let mut out = String::new();
    let rejected = run.ellipses.iter().filter(|e| e.is_err()).count();
    out.push_str(&format!(
        "Sample: n={} | ellipses={} | rejected={}\n",
        run.sample.points.len(),
        run.ellipses.len() - rejected,
        rejected
    ));
    for (i, (point, result)) in run.sample.points.iter().zip(&run.ellipses).enumerate() {
        if let Err(err) = result {
            out.push_str(&format!("  #{:<3} ({:.6}, {:.6}) skipped: {err}\n", i + 1, point.x, point.y));
        }
    }
    out.push('\n');
    out.push_str(&format_curve_run(&run.curve));
    out
}

fn format_segment_table(rows: &[SegmentDescriptor]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>4} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
        "#", "min_x", "min_y", "ctrl_x", "ctrl_y", "max_x", "max_y"
    ));
    out.push_str(&format!(
        "{:->4} {:->12} {:->12} {:->12} {:->12} {:->12} {:->12}\n",
        "", "", "", "", "", "", ""
    ));
    for (i, d) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>4} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>12.6}\n",
            i, d.min_x, d.min_y, d.control_x, d.control_y, d.max_x, d.max_y
        ));
    }
    out
}

fn fmt_bounds(b: &DisplayBounds) -> String {
    format!("x=[{:.6}, {:.6}] y=[{:.6}, {:.6}]", b.min_x, b.max_x, b.min_y, b.max_y)
}
