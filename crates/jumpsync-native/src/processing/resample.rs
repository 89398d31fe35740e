//! Band-limited sample-rate conversion
//!
//! Kaiser-windowed sinc interpolation. The kernel cutoff sits at
//! `rolloff * min(source, target) / 2`, so downsampling is anti-aliased.
//! Taps are normalized per output sample, which keeps constant signals
//! exact up to the edges.

use jumpsync_core::config::ResampleSettings;
use jumpsync_core::error::{ProcessingError, ProcessingResult};
use jumpsync_core::math::{bessel_i0, sinc};
use jumpsync_core::types::{uniform_time, KinematicTriple};
use tracing::debug;

/// Windowed-sinc resampler
#[derive(Clone, Debug, Default)]
pub struct Resampler {
    settings: ResampleSettings,
}

impl Resampler {
    /// Create a resampler with the given kernel settings
    #[must_use]
    pub fn new(settings: ResampleSettings) -> Self {
        Self { settings }
    }

    /// Output length for `len` input samples: `floor(len * target / source)`.
    #[must_use]
    pub fn output_len(len: usize, source_rate: f64, target_rate: f64) -> usize {
        (len as f64 * target_rate / source_rate).floor() as usize
    }

    /// Resample `signal` from `source_rate` to `target_rate`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSampleRate` for a non-positive rate and `EmptySignal`
    /// for an empty input.
    pub fn resample(&self, signal: &[f64], source_rate: f64, target_rate: f64) -> ProcessingResult<Vec<f64>> {
        ProcessingError::check_rate(source_rate)?;
        ProcessingError::check_rate(target_rate)?;
        if signal.is_empty() {
            return Err(ProcessingError::EmptySignal);
        }
        if (source_rate - target_rate).abs() < f64::EPSILON * source_rate {
            return Ok(signal.to_vec());
        }

        let ratio = target_rate / source_rate;
        let out_len = Self::output_len(signal.len(), source_rate, target_rate);

        // Kernel expressed in input samples
        let cutoff = self.settings.rolloff * ratio.min(1.0);
        let half_width = self.settings.zero_crossings as f64 / cutoff;
        let beta = self.settings.kaiser_beta;
        let i0_beta = bessel_i0(beta);
        let last = signal.len() as i64 - 1;

        let out = (0..out_len)
            .map(|j| {
                let x = j as f64 / ratio;
                let lo = ((x - half_width).ceil() as i64).max(0);
                let hi = ((x + half_width).floor() as i64).min(last);

                let mut acc = 0.0;
                let mut weight = 0.0;
                for i in lo..=hi {
                    let d = x - i as f64;
                    let u = d / half_width;
                    let window = bessel_i0(beta * (1.0 - u * u).max(0.0).sqrt()) / i0_beta;
                    let tap = cutoff * sinc(cutoff * d) * window;
                    acc += tap * signal[i as usize];
                    weight += tap;
                }
                acc / weight
            })
            .collect();

        Ok(out)
    }

    /// Resample every channel of `triple` to `target_rate`.
    ///
    /// The time axis is rebuilt at the target rate from the source start time.
    ///
    /// # Errors
    ///
    /// Same as [`Resampler::resample`].
    pub fn resample_triple(&self, triple: &KinematicTriple, target_rate: f64) -> ProcessingResult<KinematicTriple> {
        let source_rate = triple.sample_rate;
        let start = triple.time.first().copied().ok_or(ProcessingError::EmptySignal)?;

        let displacement = self.resample(&triple.displacement, source_rate, target_rate)?;
        let velocity = self.resample(&triple.velocity, source_rate, target_rate)?;
        let acceleration = self.resample(&triple.acceleration, source_rate, target_rate)?;
        let time = uniform_time(displacement.len(), target_rate, start);

        debug!(source_rate, target_rate, from = triple.len(), to = time.len(), "Resampled triple");
        KinematicTriple::new(time, displacement, velocity, acceleration, target_rate)
    }
}

/// Resample with the default kernel (16 zero crossings, β = 8.555, rolloff 0.85).
///
/// # Errors
///
/// Same as [`Resampler::resample`].
pub fn resample(signal: &[f64], source_rate: f64, target_rate: f64) -> ProcessingResult<Vec<f64>> {
    Resampler::default().resample(signal, source_rate, target_rate)
}

/// Resample a triple with the default kernel.
///
/// # Errors
///
/// Same as [`Resampler::resample`].
pub fn resample_triple(triple: &KinematicTriple, target_rate: f64) -> ProcessingResult<KinematicTriple> {
    Resampler::default().resample_triple(triple, target_rate)
}
