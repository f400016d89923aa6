//! Age tick marks along the concordia.
//!
//! Ticks sit at round ages (a 1, 2 or 5 × 10ᵏ Ma step) strictly inside the
//! curve's age span, so a renderer can label the curve without recomputing
//! any geometry.

use crate::domain::{AgeTick, DecayConstants, TimeSpan, YEARS_PER_MA};
use crate::math::CurveVariant;

/// Smallest "nice" step (1, 2 or 5 × 10ᵏ) that is at least `raw`.
pub fn nice_step(raw: f64) -> Option<f64> {
    if !(raw.is_finite() && raw > 0.0) {
        return None;
    }
    let exp = raw.log10().floor() as i32;
    let base = 10f64.powi(exp);
    let frac = raw / base;
    let mult = if frac <= 1.0 {
        1.0
    } else if frac <= 2.0 {
        2.0
    } else if frac <= 5.0 {
        5.0
    } else {
        10.0
    };
    Some(mult * base)
}

/// Up to roughly `count` labelled ticks over `span`.
///
/// Age 0 is never labelled, and ticks whose curve position is non-finite are
/// dropped.
pub fn age_ticks(span: &TimeSpan, variant: &CurveVariant, decay: &DecayConstants, count: usize) -> Vec<AgeTick> {
    if count == 0 || !(span.min_t.is_finite() && span.max_t.is_finite()) || span.width() <= 0.0 {
        return Vec::new();
    }
    let min_ma = span.min_t / YEARS_PER_MA;
    let max_ma = span.max_t / YEARS_PER_MA;
    let Some(step) = nice_step((max_ma - min_ma) / count as f64) else {
        return Vec::new();
    };

    let first = (min_ma / step).ceil() as i64;
    let last = (max_ma / step).floor() as i64;
    (first..=last)
        .filter_map(|i| {
            let label_ma = i as f64 * step;
            if label_ma <= 0.0 {
                return None;
            }
            let t = label_ma * YEARS_PER_MA;
            let (x, y) = variant.point(t, decay);
            (x.is_finite() && y.is_finite()).then_some(AgeTick { t, x, y, label_ma })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn nice_steps_round_up() {
        assert!(close(nice_step(0.37).unwrap(), 0.5));
        assert!(close(nice_step(1.0).unwrap(), 1.0));
        assert!(close(nice_step(7.0).unwrap(), 10.0));
        assert!(close(nice_step(150.0).unwrap(), 200.0));
        assert!(nice_step(0.0).is_none());
        assert!(nice_step(f64::NAN).is_none());
    }

    #[test]
    fn wetherill_ticks_sit_on_the_curve() {
        let decay = DecayConstants::uranium();
        let span = TimeSpan { min_t: 0.0, max_t: 3.487e9 };
        let ticks = age_ticks(&span, &CurveVariant::Wetherill, &decay, 8);

        let labels: Vec<f64> = ticks.iter().map(|t| t.label_ma).collect();
        assert_eq!(labels, vec![500.0, 1000.0, 1500.0, 2000.0, 2500.0, 3000.0]);
        for tick in &ticks {
            assert!(close(tick.x, (decay.lambda1() * tick.t).exp_m1()));
            assert!(close(tick.y, (decay.lambda2() * tick.t).exp_m1()));
        }
    }

    #[test]
    fn empty_span_has_no_ticks() {
        let decay = DecayConstants::uranium();
        let span = TimeSpan { min_t: 1.0e9, max_t: 1.0e9 };
        assert!(age_ticks(&span, &CurveVariant::Wetherill, &decay, 5).is_empty());
        let span = TimeSpan { min_t: 0.0, max_t: 1.0e9 };
        assert!(age_ticks(&span, &CurveVariant::Wetherill, &decay, 0).is_empty());
    }
}
