//! Force-to-kinematics integration
//!
//! Vertical ground-reaction force is converted to center-of-mass
//! acceleration and integrated twice with the trapezoidal rule.

use jumpsync_core::error::{ProcessingError, ProcessingResult};

/// Cumulative trapezoidal integral, same length as the input.
///
/// Element `i` holds the integral up to sample `i + 1`; the last element
/// repeats the final running sum. A single sample integrates to `[0.0]`.
///
/// # Errors
///
/// Returns `EmptySignal` for an empty input and `InvalidSampleRate` for a
/// non-positive rate.
pub fn integrate(signal: &[f64], sample_rate: f64) -> ProcessingResult<Vec<f64>> {
    ProcessingError::check_rate(sample_rate)?;
    if signal.is_empty() {
        return Err(ProcessingError::EmptySignal);
    }

    let dt = 1.0 / sample_rate;
    let mut out = Vec::with_capacity(signal.len());
    let mut running = 0.0;
    for pair in signal.windows(2) {
        running += 0.5 * (pair[0] + pair[1]) * dt;
        out.push(running);
    }
    out.push(running);
    Ok(out)
}

/// Acceleration, velocity and displacement derived from force.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedKinematics {
    /// `force / mass - g` in m/s²
    pub acceleration: Vec<f64>,
    /// Integrated acceleration in m/s
    pub velocity: Vec<f64>,
    /// Integrated velocity in m
    pub displacement: Vec<f64>,
}

/// Derive kinematics from vertical force.
///
/// # Arguments
///
/// * `force` - Vertical ground-reaction force in N
/// * `sample_rate` - Sample rate in Hz
/// * `mass` - Subject mass in kg
/// * `gravity` - Gravitational acceleration in m/s²
///
/// # Errors
///
/// Returns `InvalidMass` for a non-positive or non-finite mass,
/// `InvalidSampleRate` and `EmptySignal` as [`integrate`] does.
pub fn derive_kinematics(
    force: &[f64],
    sample_rate: f64,
    mass: f64,
    gravity: f64,
) -> ProcessingResult<DerivedKinematics> {
    if !mass.is_finite() || mass <= 0.0 {
        return Err(ProcessingError::InvalidMass { mass_kg: mass });
    }

    let acceleration: Vec<f64> = force.iter().map(|f| f / mass - gravity).collect();
    let velocity = integrate(&acceleration, sample_rate)?;
    let displacement = integrate(&velocity, sample_rate)?;

    Ok(DerivedKinematics { acceleration, velocity, displacement })
}
