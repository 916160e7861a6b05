//! Bounded search utilities for the calendar layer
//!
//! The lunisolar calendars locate day boundaries by probing monotonic
//! astronomical functions that have no closed-form inverse. The probes
//! always land within a few days of the target, so the linear scans are
//! capped at a small fixed step count and the bisection at a fixed
//! iteration count; exhausting either bound means the caller chose an
//! invalid bracket, which is a bug, not bad input.

use crate::field::Field;

/// Step cap for the linear day scans.
pub const SEARCH_MAX: usize = 30;

/// Iteration cap for bisection refinement.
pub const BISECTION_MAX: usize = 1000;

/// Convergence tolerance for bisection, in the units of the error
/// function (degrees for solar longitude inversion).
pub const BISECTION_TOLERANCE: f64 = 1e-5;

/// Scan forward from `start` for the first field satisfying `pred`.
/// Returns `None` only if the cap is exhausted.
pub fn min_search(start: Field, pred: impl Fn(Field) -> bool) -> Option<Field> {
    let mut f = start;
    for _ in 0..SEARCH_MAX {
        if pred(f) {
            return Some(f);
        }
        f += 1;
    }
    None
}

/// Scan backward from `start` for the first field satisfying `pred`.
pub fn max_search(start: Field, pred: impl Fn(Field) -> bool) -> Option<Field> {
    let mut f = start;
    for _ in 0..SEARCH_MAX {
        if pred(f) {
            return Some(f);
        }
        f -= 1;
    }
    None
}

/// Bisect `[lo, hi]` for the zero of a monotonically increasing signed
/// error function. Panics if the bracket fails to converge, since the
/// search bracket is assumed always valid for the supported date range.
pub fn bisection_search(mut lo: f64, mut hi: f64, err: impl Fn(f64) -> f64) -> f64 {
    for _ in 0..BISECTION_MAX {
        let mid = (lo + hi) / 2.0;
        let e = err(mid);
        if e.abs() < BISECTION_TOLERANCE {
            return mid;
        }
        if e > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    panic!("bisection failed to converge: invalid search bracket");
}
