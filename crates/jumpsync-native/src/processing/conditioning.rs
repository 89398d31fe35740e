//! Force signal conditioning
//!
//! Zero-phase low/high-pass filtering and removal of the platform's zero
//! offset measured during flight.

use jumpsync_core::config::BandType;
use jumpsync_core::error::{ProcessingError, ProcessingResult};
use jumpsync_core::math::{argmin, find_first, find_last, mean};
use tracing::debug;

use super::filters::ButterworthFilter;

/// Zero-phase Butterworth filter of the given order and cutoff.
///
/// # Arguments
///
/// * `signal` - Samples to filter
/// * `sample_rate` - Sample rate in Hz
/// * `band` - Lowpass or highpass
/// * `cutoff_hz` - Cutoff frequency in Hz
/// * `order` - Butterworth order
///
/// # Errors
///
/// Returns `InvalidFilterParameters` / `InvalidSampleRate` for an unusable
/// design and `EmptySignal` for an empty input.
pub fn filter(
    signal: &[f64],
    sample_rate: f64,
    band: BandType,
    cutoff_hz: f64,
    order: usize,
) -> ProcessingResult<Vec<f64>> {
    if signal.is_empty() {
        return Err(ProcessingError::EmptySignal);
    }
    ButterworthFilter::design(band, sample_rate, cutoff_hz, order)?.filtfilt(signal)
}

/// Subtract the mean force of the flight plateau from the whole signal.
///
/// The first sample is taken as body weight at rest. The flight plateau is
/// bracketed by the last sample above that weight before the global minimum
/// and the first one above it after the minimum; the mean over the middle
/// 25% of the bracket is the offset.
///
/// # Errors
///
/// Returns `EmptySignal` for an empty input and `PhaseNotFound` if either
/// bracket is missing.
pub fn correct_offset(signal: &[f64]) -> ProcessingResult<Vec<f64>> {
    let offset = flight_offset(signal)?;
    Ok(signal.iter().map(|v| v - offset).collect())
}

/// Mean of the flight plateau used by [`correct_offset`].
///
/// # Errors
///
/// Same as [`correct_offset`].
pub fn flight_offset(signal: &[f64]) -> ProcessingResult<f64> {
    let (&weight, _) = signal.split_first().ok_or(ProcessingError::EmptySignal)?;
    let min_idx = argmin(signal).ok_or(ProcessingError::EmptySignal)?;

    let takeoff = find_last(signal, 0..min_idx, |v| v > weight).ok_or(
        ProcessingError::PhaseNotFound { phase: "flight_start", start: 0, end: min_idx },
    )?;
    let landing = find_first(signal, min_idx..signal.len(), |v| v > weight).ok_or(
        ProcessingError::PhaseNotFound { phase: "flight_end", start: min_idx, end: signal.len() },
    )?;

    let middle = (takeoff + landing) / 2;
    let half = (landing - takeoff) / 4 / 2;
    let (start, end) = if half == 0 { (middle, middle + 1) } else { (middle - half, middle + half) };
    let offset = mean(&signal[start..end]);

    debug!(takeoff, landing, start, end, offset, "Flight plateau offset");
    Ok(offset)
}
