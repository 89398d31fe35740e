//! Zero-phase Butterworth filtering
//!
//! Filters are designed as a cascade of second-order sections (plus one
//! first-order section for odd orders) with the bilinear transform and
//! cutoff pre-warping. Sections run in transposed direct form II.

use std::f64::consts::PI;

use jumpsync_core::config::BandType;
use jumpsync_core::error::{ProcessingError, ProcessingResult};

/// Filter section coefficients (second-order; first-order has `b[2] = a[2] = 0`)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadCoeffs {
    /// Numerator coefficients [b0, b1, b2]
    pub b: [f64; 3],
    /// Denominator coefficients [a0=1, a1, a2]
    pub a: [f64; 3],
}

impl BiquadCoeffs {
    /// Second-order lowpass section with pre-warped `k = tan(π fc / fs)` and quality `q`
    #[must_use]
    pub fn lowpass(k: f64, q: f64) -> Self {
        let k2 = k * k;
        let norm = 1.0 / (1.0 + k / q + k2);
        Self {
            b: [k2 * norm, 2.0 * k2 * norm, k2 * norm],
            a: [1.0, 2.0 * (k2 - 1.0) * norm, (1.0 - k / q + k2) * norm],
        }
    }

    /// Second-order highpass section
    #[must_use]
    pub fn highpass(k: f64, q: f64) -> Self {
        let k2 = k * k;
        let norm = 1.0 / (1.0 + k / q + k2);
        Self {
            b: [norm, -2.0 * norm, norm],
            a: [1.0, 2.0 * (k2 - 1.0) * norm, (1.0 - k / q + k2) * norm],
        }
    }

    /// First-order lowpass section
    #[must_use]
    pub fn first_order_lowpass(k: f64) -> Self {
        let norm = 1.0 / (1.0 + k);
        Self { b: [k * norm, k * norm, 0.0], a: [1.0, (k - 1.0) * norm, 0.0] }
    }

    /// First-order highpass section
    #[must_use]
    pub fn first_order_highpass(k: f64) -> Self {
        let norm = 1.0 / (1.0 + k);
        Self { b: [norm, -norm, 0.0], a: [1.0, (k - 1.0) * norm, 0.0] }
    }

    /// Gain for a constant input
    #[must_use]
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[1] + self.a[2])
    }
}

/// Single filter section with state
#[derive(Clone, Debug)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    /// State: [s1, s2]
    state: [f64; 2],
}

impl Biquad {
    /// Create a new section with zero state
    #[must_use]
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self { coeffs, state: [0.0, 0.0] }
    }

    /// Set the state to the steady state of a constant input `x`.
    ///
    /// Returns the steady-state output, i.e. the input of the next section.
    pub fn prime(&mut self, x: f64) -> f64 {
        let c = &self.coeffs;
        let y = c.dc_gain() * x;
        let s2 = c.b[2] * x - c.a[2] * y;
        let s1 = c.b[1] * x - c.a[1] * y + s2;
        self.state = [s1, s2];
        y
    }

    /// Process a single sample
    pub fn filter(&mut self, input: f64) -> f64 {
        let c = &self.coeffs;
        let output = c.b[0] * input + self.state[0];
        self.state[0] = c.b[1] * input - c.a[1] * output + self.state[1];
        self.state[1] = c.b[2] * input - c.a[2] * output;
        output
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.state = [0.0, 0.0];
    }
}

/// Butterworth filter of arbitrary order as a section cascade
#[derive(Clone, Debug)]
pub struct ButterworthFilter {
    band: BandType,
    order: usize,
    sections: Vec<BiquadCoeffs>,
}

impl ButterworthFilter {
    /// Design a digital Butterworth filter.
    ///
    /// # Arguments
    ///
    /// * `band` - Lowpass or highpass
    /// * `sample_rate` - Sample rate in Hz
    /// * `cutoff_hz` - -3 dB frequency in Hz
    /// * `order` - Filter order (>= 1)
    ///
    /// # Errors
    ///
    /// Returns `InvalidSampleRate` for a non-positive rate and
    /// `InvalidFilterParameters` if the cutoff is not inside `(0, fs/2)` or
    /// the order is zero.
    pub fn design(band: BandType, sample_rate: f64, cutoff_hz: f64, order: usize) -> ProcessingResult<Self> {
        ProcessingError::check_rate(sample_rate)?;
        let nyquist_hz = sample_rate / 2.0;
        if order == 0 || cutoff_hz.is_nan() || cutoff_hz <= 0.0 || cutoff_hz >= nyquist_hz {
            return Err(ProcessingError::InvalidFilterParameters { cutoff_hz, order, nyquist_hz });
        }

        let k = (PI * cutoff_hz / sample_rate).tan();
        let n = order as f64;
        let mut sections: Vec<BiquadCoeffs> = (0..order / 2)
            .map(|i| {
                let theta = PI * (2.0 * i as f64 + 1.0) / (2.0 * n);
                let q = 1.0 / (2.0 * theta.cos());
                match band {
                    BandType::Lowpass => BiquadCoeffs::lowpass(k, q),
                    BandType::Highpass => BiquadCoeffs::highpass(k, q),
                }
            })
            .collect();

        if order % 2 == 1 {
            sections.push(match band {
                BandType::Lowpass => BiquadCoeffs::first_order_lowpass(k),
                BandType::Highpass => BiquadCoeffs::first_order_highpass(k),
            });
        }

        Ok(Self { band, order, sections })
    }

    /// Band type
    #[must_use]
    pub fn band(&self) -> BandType {
        self.band
    }

    /// Filter order
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Cascade sections
    #[must_use]
    pub fn sections(&self) -> &[BiquadCoeffs] {
        &self.sections
    }

    /// Single causal pass, each section primed to the steady state of the first sample.
    #[must_use]
    pub fn filter(&self, signal: &[f64]) -> Vec<f64> {
        let Some(&first) = signal.first() else {
            return Vec::new();
        };

        let mut stages: Vec<Biquad> = self.sections.iter().copied().map(Biquad::new).collect();
        let mut steady = first;
        for stage in &mut stages {
            steady = stage.prime(steady);
        }

        signal
            .iter()
            .map(|&x| stages.iter_mut().fold(x, |acc, stage| stage.filter(acc)))
            .collect()
    }

    /// Number of samples reflected at each edge before a zero-phase pass
    #[must_use]
    pub fn pad_len(&self) -> usize {
        3 * (self.order + 1)
    }

    /// Zero-phase (forward + backward) filtering with odd-extension padding.
    ///
    /// # Errors
    ///
    /// Returns `EmptySignal` for an empty input.
    pub fn filtfilt(&self, signal: &[f64]) -> ProcessingResult<Vec<f64>> {
        if signal.is_empty() {
            return Err(ProcessingError::EmptySignal);
        }

        let pad = self.pad_len().min(signal.len() - 1);
        let extended = odd_extend(signal, pad);

        let mut y = self.filter(&extended);
        y.reverse();
        let mut y = self.filter(&y);
        y.reverse();

        Ok(y[pad..pad + signal.len()].to_vec())
    }
}

/// Point-reflect `pad` samples about each end: `2*x[0] - x[pad..0]` and
/// `2*x[n-1] - x[n-2..n-1-pad]`.
fn odd_extend(signal: &[f64], pad: usize) -> Vec<f64> {
    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];

    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
    out.extend_from_slice(signal);
    out.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sine(freq: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * freq * i as f64 / fs).sin()).collect()
    }

    /// Fourth-order zero-phase pass at 1 kHz
    fn zero_phase(signal: &[f64], band: BandType, cutoff_hz: f64) -> ProcessingResult<Vec<f64>> {
        ButterworthFilter::design(band, 1000.0, cutoff_hz, 4)?.filtfilt(signal)
    }

    fn peak(signal: &[f64]) -> f64 {
        signal.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    #[test]
    fn test_second_order_matches_closed_form() {
        let filter = ButterworthFilter::design(BandType::Lowpass, 1000.0, 30.0, 2).unwrap();
        let k = (PI * 30.0 / 1000.0).tan();
        let sqrt2 = std::f64::consts::SQRT_2;
        let norm = 1.0 / (1.0 + sqrt2 * k + k * k);
        let section = filter.sections()[0];
        assert_abs_diff_eq!(section.b[0], k * k * norm, epsilon = 1e-12);
        assert_abs_diff_eq!(section.a[2], (1.0 - sqrt2 * k + k * k) * norm, epsilon = 1e-12);
    }

    #[test]
    fn test_section_count() {
        assert_eq!(ButterworthFilter::design(BandType::Lowpass, 1000.0, 30.0, 4).unwrap().sections().len(), 2);
        assert_eq!(ButterworthFilter::design(BandType::Highpass, 1000.0, 30.0, 3).unwrap().sections().len(), 2);
        assert_eq!(ButterworthFilter::design(BandType::Lowpass, 1000.0, 30.0, 1).unwrap().sections().len(), 1);
    }

    #[test]
    fn test_lowpass_dc_gain_is_unity() {
        for order in 1..=6 {
            let filter = ButterworthFilter::design(BandType::Lowpass, 1000.0, 30.0, order).unwrap();
            let gain: f64 = filter.sections().iter().map(BiquadCoeffs::dc_gain).product();
            assert_abs_diff_eq!(gain, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_constant_signal_passes_unchanged() {
        let signal = vec![686.0; 500];
        let filtered = zero_phase(&signal, BandType::Lowpass, 30.0).unwrap();
        for v in filtered {
            assert_abs_diff_eq!(v, 686.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_highpass_removes_offset() {
        let signal: Vec<f64> = sine(50.0, 1000.0, 2000).iter().map(|v| v + 3.0).collect();
        let filtered = zero_phase(&signal, BandType::Highpass, 5.0).unwrap();
        let middle = &filtered[500..1500];
        let mean = middle.iter().sum::<f64>() / middle.len() as f64;
        assert!(mean.abs() < 1e-2);
        assert!((peak(middle) - 1.0).abs() < 0.03);
    }

    #[test]
    fn test_lowpass_attenuation() {
        let pass = zero_phase(&sine(5.0, 1000.0, 3000), BandType::Lowpass, 30.0).unwrap();
        let stop = zero_phase(&sine(100.0, 1000.0, 3000), BandType::Lowpass, 30.0).unwrap();
        assert!(peak(&pass[1000..2000]) > 0.98);
        assert!(peak(&stop[1000..2000]) < 0.01);
    }

    #[test]
    fn test_zero_phase() {
        let signal = sine(5.0, 1000.0, 3000);
        let filtered = zero_phase(&signal, BandType::Lowpass, 30.0).unwrap();
        // 5 Hz peaks at 50 ms + k * 200 ms
        let window = &filtered[1000..1200];
        let peak_idx = window
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i + 1000)
            .unwrap();
        assert!((peak_idx as i64 - 1050).abs() <= 1);
    }

    #[test]
    fn test_short_signals() {
        assert_eq!(zero_phase(&[2.0], BandType::Lowpass, 30.0).unwrap().len(), 1);
        assert_eq!(zero_phase(&[1.0, 2.0, 3.0], BandType::Lowpass, 30.0).unwrap().len(), 3);
        assert_eq!(
            zero_phase(&[], BandType::Lowpass, 30.0),
            Err(ProcessingError::EmptySignal)
        );
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            ButterworthFilter::design(BandType::Lowpass, 1000.0, 500.0, 4),
            Err(ProcessingError::InvalidFilterParameters { .. })
        ));
        assert!(ButterworthFilter::design(BandType::Lowpass, 1000.0, 0.0, 4).is_err());
        assert!(ButterworthFilter::design(BandType::Lowpass, 1000.0, 30.0, 0).is_err());
        assert!(matches!(
            ButterworthFilter::design(BandType::Lowpass, -1.0, 30.0, 4),
            Err(ProcessingError::InvalidSampleRate { .. })
        ));
    }

    #[test]
    fn test_odd_extension() {
        let ext = odd_extend(&[1.0, 2.0, 4.0], 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 6.0, 7.0]);
    }
}
