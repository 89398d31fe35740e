//! Error types for jump signal processing
//!
//! Every failure of the numeric pipeline is surfaced as a [`ProcessingError`].
//! Nothing here is recovered inside the library: a wrong phase index or a
//! zero normalization amplitude would otherwise produce a plausible-looking
//! but meaningless score.

use thiserror::Error;

/// Errors from conditioning, integration, segmentation, alignment and scoring.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    /// Filter design rejected (cutoff at or above Nyquist, zero order, ...)
    #[error("Invalid filter parameters: cutoff {cutoff_hz} Hz, order {order} (Nyquist {nyquist_hz} Hz)")]
    InvalidFilterParameters {
        /// Requested cutoff frequency in Hz
        cutoff_hz: f64,
        /// Requested filter order
        order: usize,
        /// Nyquist frequency of the signal in Hz
        nyquist_hz: f64,
    },

    /// Subject mass is zero, negative or not finite
    #[error("Invalid subject mass: {mass_kg} kg")]
    InvalidMass {
        /// Offending mass in kilograms
        mass_kg: f64,
    },

    /// Sample rate is zero, negative or not finite
    #[error("Invalid sample rate: {rate_hz} Hz")]
    InvalidSampleRate {
        /// Offending rate in Hz
        rate_hz: f64,
    },

    /// Operation needs at least one sample
    #[error("Signal is empty")]
    EmptySignal,

    /// A bounded threshold search ran off its range without a crossing
    #[error("Phase {phase} not found in samples [{start}, {end})")]
    PhaseNotFound {
        /// Phase (or intermediate bracket) being searched for
        phase: &'static str,
        /// Start of the searched index range (inclusive)
        start: usize,
        /// End of the searched index range (exclusive)
        end: usize,
    },

    /// No position is valid in both compared signals
    #[error("Signals have no valid overlapping samples")]
    EmptyOverlap,

    /// Reference signal is flat over the valid region
    #[error("Reference signal has zero peak-to-trough amplitude")]
    ZeroAmplitude,

    /// Trial metadata could not be determined and no override was supplied
    #[error("Missing trial metadata: {field}")]
    MissingMetadata {
        /// Name of the missing field (e.g. "mass_kg")
        field: &'static str,
    },

    /// Signals that must have equal length do not
    #[error("Shape mismatch: expected {expected} samples, got {actual}")]
    ShapeMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },
}

impl ProcessingError {
    /// Build a [`ProcessingError::ShapeMismatch`] unless the lengths agree.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when `expected != actual`.
    pub fn check_len(expected: usize, actual: usize) -> ProcessingResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::ShapeMismatch { expected, actual })
        }
    }

    /// Validate a sample rate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSampleRate` for zero, negative or non-finite rates.
    pub fn check_rate(rate_hz: f64) -> ProcessingResult<()> {
        if rate_hz.is_finite() && rate_hz > 0.0 {
            Ok(())
        } else {
            Err(Self::InvalidSampleRate { rate_hz })
        }
    }
}

/// Result type for processing operations
pub type ProcessingResult<T> = Result<T, ProcessingError>;
