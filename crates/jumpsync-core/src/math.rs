//! Numeric primitives shared by the processing stages
//!
//! This module provides:
//! - Physical constants
//! - Statistics over `f64` slices (mean, population variance, extrema)
//! - Bounded index searches used by phase detection
//! - Special functions needed by filter design (modified Bessel I0)

use core::ops::Range;

// ============================================================================
// Physical Constants
// ============================================================================

/// Physical constants for jump analysis
pub mod constants {
    /// Local gravitational acceleration used for force-to-acceleration conversion (m/s²)
    pub const GRAVITY: f64 = 9.7838;

    /// Default force low-pass cutoff (Hz)
    pub const FORCE_CUTOFF_HZ: f64 = 30.0;

    /// Default force low-pass order
    pub const FORCE_FILTER_ORDER: usize = 4;
}

// ============================================================================
// Statistics
// ============================================================================

/// Arithmetic mean. Returns 0 for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by `n`). Returns 0 for an empty slice.
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Index of the first minimum. NaN entries are skipped.
#[must_use]
pub fn argmin(values: &[f64]) -> Option<usize> {
    extremum(values, |candidate, best| candidate < best)
}

/// Index of the first maximum. NaN entries are skipped.
#[must_use]
pub fn argmax(values: &[f64]) -> Option<usize> {
    extremum(values, |candidate, best| candidate > best)
}

fn extremum(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if !better(v, b) => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Smallest and largest non-NaN value.
#[must_use]
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

// ============================================================================
// Bounded searches
// ============================================================================

/// First index in `range` whose value satisfies `predicate`.
///
/// The range is clipped to the slice; an empty or inverted range yields `None`.
#[must_use]
pub fn find_first(values: &[f64], range: Range<usize>, predicate: impl Fn(f64) -> bool) -> Option<usize> {
    let end = range.end.min(values.len());
    if range.start >= end {
        return None;
    }
    (range.start..end).find(|&i| predicate(values[i]))
}

/// Last index in `range` whose value satisfies `predicate`.
///
/// The range is clipped to the slice; an empty or inverted range yields `None`.
#[must_use]
pub fn find_last(values: &[f64], range: Range<usize>, predicate: impl Fn(f64) -> bool) -> Option<usize> {
    let end = range.end.min(values.len());
    if range.start >= end {
        return None;
    }
    (range.start..end).rev().find(|&i| predicate(values[i]))
}

// ============================================================================
// Special functions
// ============================================================================

/// Zeroth-order modified Bessel function of the first kind, I0(x).
///
/// Power series, summed until the term drops below 1e-12 of the total.
#[must_use]
pub fn bessel_i0(x: f64) -> f64 {
    let half_sq = 0.25 * x * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;
    while term > 1e-12 * sum {
        term *= half_sq / (k * k);
        sum += term;
        k += 1.0;
    }
    sum
}

/// Normalized sinc, `sin(πx)/(πx)`.
#[must_use]
pub fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        let px = core::f64::consts::PI * x;
        px.sin() / px
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_statistics() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(mean(&values), 3.0);
        // Population variance, not sample variance
        assert_relative_eq!(variance(&values), 2.0);
        assert_relative_eq!(std_dev(&values), 2.0_f64.sqrt());
        assert_relative_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_arg_extrema_first_occurrence() {
        let values = [3.0, 1.0, 5.0, 1.0, 5.0];
        assert_eq!(argmin(&values), Some(1));
        assert_eq!(argmax(&values), Some(2));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmin(&[f64::NAN, 2.0, 0.5]), Some(2));
        assert_eq!(min_max(&[f64::NAN, 2.0, -1.0]), Some((-1.0, 2.0)));
    }

    #[test]
    fn test_bounded_search() {
        let values = [5.0, 4.0, 3.0, 2.0, 3.0, 4.0];
        assert_eq!(find_first(&values, 0..6, |v| v < 3.5), Some(2));
        assert_eq!(find_last(&values, 0..6, |v| v < 3.5), Some(4));
        assert_eq!(find_first(&values, 3..3, |v| v < 3.5), None);
        assert_eq!(find_last(&values, 5..2, |v| v < 3.5), None);
        assert_eq!(find_first(&values, 0..100, |v| v > 4.5), Some(0));
        assert_eq!(find_first(&values, 0..6, |v| v > 10.0), None);
    }

    #[test]
    fn test_bessel_i0() {
        assert_relative_eq!(bessel_i0(0.0), 1.0);
        assert_relative_eq!(bessel_i0(1.0), 1.266_065_877_752_008, epsilon = 1e-10);
        assert_relative_eq!(bessel_i0(5.0), 27.239_871_823_604_45, epsilon = 1e-8);
    }

    #[test]
    fn test_sinc() {
        assert_relative_eq!(sinc(0.0), 1.0);
        assert!(sinc(1.0).abs() < 1e-12);
        assert_relative_eq!(sinc(0.5), 2.0 / core::f64::consts::PI, epsilon = 1e-12);
    }
}
