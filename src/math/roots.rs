//! Bracketed inversion of monotone functions.
//!
//! Used where a curve coordinate has no closed-form inverse in t (the
//! Tera-Wasserburg ²⁰⁷Pb/²⁰⁶Pb axis). Bisection is slow but cannot diverge, and
//! a fixed iteration count keeps the cost deterministic.

/// Bisection iterations; 200 halvings exhaust f64 precision on any bracket.
const BISECT_ITERS: usize = 200;

/// Find `t ∈ [lo, hi]` with `f(t) = target` for monotone `f`.
///
/// Targets outside `[f(lo), f(hi)]` saturate to the nearer bracket end, so the
/// result is always a usable age inside the bracket. Returns `None` if the
/// bracket is invalid or `f` is non-finite at its ends.
pub fn invert_monotone<F>(f: F, target: f64, lo: f64, hi: f64) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    if !(lo.is_finite() && hi.is_finite() && lo < hi && target.is_finite()) {
        return None;
    }
    let f_lo = f(lo);
    let f_hi = f(hi);
    if !(f_lo.is_finite() && f_hi.is_finite()) {
        return None;
    }

    let increasing = f_hi >= f_lo;
    let (below, above) = if increasing { (lo, hi) } else { (hi, lo) };
    let (f_min, f_max) = if increasing { (f_lo, f_hi) } else { (f_hi, f_lo) };
    if target <= f_min {
        return Some(below);
    }
    if target >= f_max {
        return Some(above);
    }

    let mut a = lo;
    let mut b = hi;
    for _ in 0..BISECT_ITERS {
        let mid = a + (b - a) / 2.0;
        let below_target = f(mid) < target;
        if below_target == increasing {
            a = mid;
        } else {
            b = mid;
        }
        if b - a <= f64::EPSILON * b.abs() {
            break;
        }
    }
    Some(a + (b - a) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_increasing_and_decreasing() {
        let t = invert_monotone(|t| t * t, 2.0, 0.0, 10.0).unwrap();
        assert!((t - 2f64.sqrt()).abs() < 1e-12);

        let t = invert_monotone(|t| -t, -3.0, 0.0, 10.0).unwrap();
        assert!((t - 3.0).abs() < 1e-12);
    }

    #[test]
    fn saturates_outside_range() {
        assert_eq!(invert_monotone(|t| t, -5.0, 1.0, 2.0), Some(1.0));
        assert_eq!(invert_monotone(|t| t, 5.0, 1.0, 2.0), Some(2.0));
        assert_eq!(invert_monotone(|t| -t, 5.0, 1.0, 2.0), Some(1.0));
    }

    #[test]
    fn rejects_bad_bracket() {
        assert!(invert_monotone(|t| t, 0.5, 2.0, 1.0).is_none());
        assert!(invert_monotone(|t| t, f64::NAN, 0.0, 1.0).is_none());
    }
}
