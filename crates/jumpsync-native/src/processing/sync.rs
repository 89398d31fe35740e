//! Cross-correlation time alignment
//!
//! Estimates the integer sample offset between two recordings of the same
//! movement and trims them so shared features line up.
//!
//! Sign convention: a positive lag means the features appear `lag`
//! samples later in `signal_a` than in `signal_b`.

use rustfft::{num_complex::Complex, FftPlanner};

use jumpsync_core::config::SyncSettings;
use jumpsync_core::error::{ProcessingError, ProcessingResult};
use jumpsync_core::math::mean;
use jumpsync_core::types::{is_missing, MISSING};
use tracing::debug;

/// Synchronizer options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncConfig {
    /// Subtract each signal's mean before correlating
    pub remove_mean: bool,
    /// Only consider `|lag| <= max_lag`
    pub max_lag: Option<usize>,
}

impl SyncConfig {
    /// Convert file settings, expressing the lag limit in samples at `sample_rate`.
    #[must_use]
    pub fn from_settings(settings: &SyncSettings, sample_rate: f64) -> Self {
        Self {
            remove_mean: settings.remove_mean,
            max_lag: settings
                .max_lag_seconds
                .filter(|s| s.is_finite() && *s >= 0.0)
                .map(|s| (s * sample_rate).round() as usize),
        }
    }
}

/// FFT-based cross-correlation lag estimator
pub struct Synchronizer {
    config: SyncConfig,
    planner: FftPlanner<f64>,
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl Synchronizer {
    /// Create a synchronizer
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self { config, planner: FftPlanner::new() }
    }

    /// Options in use
    #[must_use]
    pub fn config(&self) -> SyncConfig {
        self.config
    }

    /// Full linear cross-correlation of length `len(a) + len(b) - 1`.
    ///
    /// Entry `m` holds `sum_n a[n + k] * b[n]` with `k = m - (len(b) - 1)`.
    pub fn cross_correlate(&mut self, a: &[f64], b: &[f64]) -> Vec<f64> {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }

        let full_len = a.len() + b.len() - 1;
        let fft_len = full_len.next_power_of_two();
        let fft = self.planner.plan_fft_forward(fft_len);
        let ifft = self.planner.plan_fft_inverse(fft_len);

        let mut fa = padded(a, fft_len);
        let mut fb = padded(b, fft_len);
        fft.process(&mut fa);
        fft.process(&mut fb);

        let mut spectrum: Vec<Complex<f64>> = fa.iter().zip(&fb).map(|(x, y)| x * y.conj()).collect();
        ifft.process(&mut spectrum);

        let scale = 1.0 / fft_len as f64;
        let nb = b.len() as i64;
        (0..full_len as i64)
            .map(|m| {
                let k = m - (nb - 1);
                spectrum[k.rem_euclid(fft_len as i64) as usize].re * scale
            })
            .collect()
    }

    /// Lag of `signal_a` relative to `signal_b`.
    ///
    /// Missing samples are dropped from each signal before correlating, so
    /// the lag is in units of the compacted signals.
    ///
    /// # Errors
    ///
    /// Returns `EmptySignal` if either signal has no valid samples.
    pub fn estimate_lag(&mut self, signal_a: &[f64], signal_b: &[f64]) -> ProcessingResult<i64> {
        self.correlation_peak(signal_a, signal_b, 0)
    }

    /// Lag between two NaN-padded windows, in window indices.
    ///
    /// Same as [`Self::estimate_lag`], but shifted by the difference in
    /// leading padding so the result can be passed straight to [`apply_lag`]
    /// on the padded windows. `max_lag` bounds the window lag.
    ///
    /// # Errors
    ///
    /// Returns `EmptySignal` if either window has no valid samples.
    pub fn estimate_window_lag(&mut self, window_a: &[f64], window_b: &[f64]) -> ProcessingResult<i64> {
        let shift = leading_missing(window_a) as i64 - leading_missing(window_b) as i64;
        self.correlation_peak(window_a, window_b, shift)
    }

    /// Argmax of the cross-correlation of the valid samples, reported as
    /// `compact lag + shift`.
    fn correlation_peak(&mut self, signal_a: &[f64], signal_b: &[f64], shift: i64) -> ProcessingResult<i64> {
        let mut a = valid(signal_a);
        let mut b = valid(signal_b);
        if a.is_empty() || b.is_empty() {
            return Err(ProcessingError::EmptySignal);
        }
        if self.config.remove_mean {
            center(&mut a);
            center(&mut b);
        }

        let corr = self.cross_correlate(&a, &b);
        let offset = b.len() as i64 - 1 - shift;
        let max_lag = self.config.max_lag.map(|m| m as i64);

        let mut best: Option<(i64, f64)> = None;
        for (m, &c) in corr.iter().enumerate() {
            let lag = m as i64 - offset;
            if max_lag.is_some_and(|limit| lag.abs() > limit) {
                continue;
            }
            if best.map_or(true, |(_, v)| c > v) {
                best = Some((lag, c));
            }
        }

        let (lag, peak) = best.ok_or(ProcessingError::EmptySignal)?;
        debug!(lag, shift, peak, len_a = a.len(), len_b = b.len(), "Cross-correlation peak");
        Ok(lag)
    }
}

fn padded(signal: &[f64], len: usize) -> Vec<Complex<f64>> {
    let mut out: Vec<Complex<f64>> = signal.iter().map(|&v| Complex::new(v, 0.0)).collect();
    out.resize(len, Complex::new(0.0, 0.0));
    out
}

/// Number of missing samples before the first valid one.
#[must_use]
pub fn leading_missing(signal: &[f64]) -> usize {
    signal.iter().take_while(|v| is_missing(**v)).count()
}

fn valid(signal: &[f64]) -> Vec<f64> {
    signal.iter().copied().filter(|v| !is_missing(*v)).collect()
}

fn center(signal: &mut [f64]) {
    let m = mean(signal);
    for v in signal {
        *v -= m;
    }
}

/// Lag of `signal_a` relative to `signal_b` on the raw (valid) samples.
///
/// # Errors
///
/// Returns `EmptySignal` if either signal has no valid samples.
pub fn estimate_lag(signal_a: &[f64], signal_b: &[f64]) -> ProcessingResult<i64> {
    Synchronizer::default().estimate_lag(signal_a, signal_b)
}

/// Trim the leading samples of whichever signal lags.
///
/// Both outputs have length `max(len(a), len(b))` and are padded with
/// [`MISSING`]. `lag > 0` drops `a`'s first `lag` samples, `lag < 0` drops
/// `b`'s first `|lag|`.
#[must_use]
pub fn apply_lag(signal_a: &[f64], signal_b: &[f64], lag: i64) -> (Vec<f64>, Vec<f64>) {
    let len = signal_a.len().max(signal_b.len());
    let shift = lag.unsigned_abs() as usize;
    let (skip_a, skip_b) = if lag > 0 { (shift, 0) } else { (0, shift) };
    (trimmed(signal_a, skip_a, len), trimmed(signal_b, skip_b, len))
}

fn trimmed(signal: &[f64], skip: usize, len: usize) -> Vec<f64> {
    let mut out = vec![MISSING; len];
    if skip < signal.len() {
        let src = &signal[skip..];
        out[..src.len()].copy_from_slice(src);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bump(center: f64, width: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (-((i as f64 - center) / width).powi(2)).exp()).collect()
    }

    fn delayed(signal: &[f64], k: usize) -> Vec<f64> {
        let mut out = vec![0.0; k];
        out.extend_from_slice(signal);
        out
    }

    #[test]
    fn test_cross_correlate_matches_direct_sum() {
        let a = [1.0, 2.0, 3.0];
        let b = [0.0, 1.0, 0.5];
        let corr = Synchronizer::default().cross_correlate(&a, &b);
        // numpy.correlate([1,2,3], [0,1,0.5], "full")
        let expected = [0.5, 2.0, 3.5, 3.0, 0.0];
        assert_eq!(corr.len(), expected.len());
        for (c, e) in corr.iter().zip(expected) {
            assert!((c - e).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lag_sign_convention() {
        let s = bump(40.0, 5.0, 120);
        for k in [1, 7, 25] {
            let s2 = delayed(&s, k);
            assert_eq!(estimate_lag(&s, &s2).unwrap(), -(k as i64));
            assert_eq!(estimate_lag(&s2, &s).unwrap(), k as i64);
        }
    }

    #[test]
    fn test_identical_signals() {
        let s = bump(30.0, 4.0, 80);
        assert_eq!(estimate_lag(&s, &s).unwrap(), 0);
    }

    #[test]
    fn test_missing_samples_dropped() {
        let s = bump(40.0, 5.0, 100);
        let mut padded = vec![MISSING; 10];
        padded.extend_from_slice(&s);
        padded.extend(vec![MISSING; 10]);
        assert_eq!(estimate_lag(&padded, &s).unwrap(), 0);
    }

    #[test]
    fn test_leading_missing() {
        assert_eq!(leading_missing(&[MISSING, MISSING, 1.0, MISSING]), 2);
        assert_eq!(leading_missing(&[1.0, MISSING]), 0);
        assert_eq!(leading_missing(&[MISSING; 3]), 3);
        assert_eq!(leading_missing(&[]), 0);
    }

    #[test]
    fn test_window_lag_with_unequal_padding() {
        // Same samples, `a` starts its valid data 30 window slots later
        let s = bump(40.0, 5.0, 100);
        let mut a = vec![MISSING; 30];
        a.extend_from_slice(&s[..90]);
        let mut b = s.clone();
        b.extend(vec![MISSING; 20]);

        let mut sync = Synchronizer::default();
        assert_eq!(sync.estimate_lag(&a, &b).unwrap(), 0);
        let lag = sync.estimate_window_lag(&a, &b).unwrap();
        assert_eq!(lag, 30);

        let (a2, b2) = apply_lag(&a, &b, lag);
        for i in 0..90 {
            assert!((a2[i] - b2[i]).abs() < 1e-12, "sample {i}");
        }
    }

    #[test]
    fn test_window_lag_shifted_and_padded() {
        // `b` has 12 leading slots of padding and its features sit 5 slots earlier
        let s = bump(50.0, 4.0, 120);
        let a = s.clone();
        let mut b = vec![MISSING; 12];
        b.extend_from_slice(&s[17..]);
        let lag = Synchronizer::default().estimate_window_lag(&a, &b).unwrap();
        assert_eq!(lag, 5);
        let mut limited = Synchronizer::new(SyncConfig { remove_mean: false, max_lag: Some(5) });
        assert_eq!(limited.estimate_window_lag(&a, &b).unwrap(), 5);
    }

    #[test]
    fn test_remove_mean_with_offset() {
        let a: Vec<f64> = bump(60.0, 3.0, 100).iter().map(|v| v + 5.0).collect();
        let b = bump(50.0, 3.0, 100);
        let mut sync = Synchronizer::new(SyncConfig { remove_mean: true, max_lag: None });
        assert_eq!(sync.estimate_lag(&a, &b).unwrap(), 10);
    }

    #[test]
    fn test_max_lag_restricts_search() {
        // Two bumps in `a`; the larger one is out of reach
        let a: Vec<f64> = bump(20.0, 3.0, 200)
            .iter()
            .zip(bump(150.0, 3.0, 200))
            .map(|(x, y)| 0.5 * x + y)
            .collect();
        let b = bump(15.0, 3.0, 200);
        assert_eq!(estimate_lag(&a, &b).unwrap(), 135);
        let mut sync = Synchronizer::new(SyncConfig { remove_mean: false, max_lag: Some(30) });
        assert_eq!(sync.estimate_lag(&a, &b).unwrap(), 5);
    }

    #[test]
    fn test_empty_valid_input() {
        assert_eq!(estimate_lag(&[MISSING, MISSING], &[1.0]), Err(ProcessingError::EmptySignal));
        assert_eq!(estimate_lag(&[1.0], &[]), Err(ProcessingError::EmptySignal));
    }

    #[test]
    fn test_apply_lag() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0];

        let (a2, b2) = apply_lag(&a, &b, 2);
        assert_eq!(&a2[..2], &[3.0, 4.0]);
        assert!(a2[2..].iter().all(|v| is_missing(*v)));
        assert_eq!(&b2[..2], &[5.0, 6.0]);
        assert_eq!(b2.len(), 4);

        let (a3, b3) = apply_lag(&a, &b, -1);
        assert_eq!(a3, a.to_vec());
        assert_eq!(b3[0], 6.0);
        assert!(b3[1..].iter().all(|v| is_missing(*v)));

        let (a4, _) = apply_lag(&a, &b, 10);
        assert!(a4.iter().all(|v| is_missing(*v)));
    }

    #[test]
    fn test_apply_lag_aligns_delayed_copy() {
        let s = bump(40.0, 5.0, 100);
        let s2 = delayed(&s, 6);
        let lag = estimate_lag(&s2, &s).unwrap();
        let (a, b) = apply_lag(&s2, &s, lag);
        for i in 0..100 {
            assert!((a[i] - b[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_config_from_settings() {
        let settings = SyncSettings { remove_mean: true, max_lag_seconds: Some(0.5) };
        let config = SyncConfig::from_settings(&settings, 60.0);
        assert_eq!(config.max_lag, Some(30));
        assert!(config.remove_mean);
    }
}
