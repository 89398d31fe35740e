//! Scale-invariant agreement scores
//!
//! Mean absolute error normalized by the reference's peak-to-trough
//! amplitude, computed over positions valid in both signals.

use jumpsync_core::error::{ProcessingError, ProcessingResult};
use jumpsync_core::math::min_max;
use jumpsync_core::types::{is_missing, Channel, ErrorScores, KinematicTriple};

/// `mean(|test - reference|) / (max(reference) - min(reference))`.
///
/// Positions where either value is missing are masked out.
///
/// # Errors
///
/// Returns `ShapeMismatch` for unequal lengths, `EmptyOverlap` if no
/// position is valid in both and `ZeroAmplitude` for a flat reference.
pub fn normalized_error(reference: &[f64], test: &[f64]) -> ProcessingResult<f64> {
    ProcessingError::check_len(reference.len(), test.len())?;

    let (valid_ref, abs_err): (Vec<f64>, Vec<f64>) = reference
        .iter()
        .zip(test)
        .filter(|(r, t)| !is_missing(**r) && !is_missing(**t))
        .map(|(r, t)| (*r, (t - r).abs()))
        .unzip();

    let (lo, hi) = min_max(&valid_ref).ok_or(ProcessingError::EmptyOverlap)?;
    let amplitude = hi - lo;
    if amplitude == 0.0 {
        return Err(ProcessingError::ZeroAmplitude);
    }

    let mae = abs_err.iter().sum::<f64>() / abs_err.len() as f64;
    Ok(mae / amplitude)
}

/// Score position, velocity and acceleration of two aligned windows.
///
/// # Errors
///
/// Same as [`normalized_error`], for the first failing channel.
pub fn score_triple(reference: &KinematicTriple, test: &KinematicTriple) -> ProcessingResult<ErrorScores> {
    let score = |channel| normalized_error(reference.channel(channel), test.channel(channel));
    Ok(ErrorScores {
        position: score(Channel::Position)?,
        velocity: score(Channel::Velocity)?,
        acceleration: score(Channel::Acceleration)?,
    })
}
