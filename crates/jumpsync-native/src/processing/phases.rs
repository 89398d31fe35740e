//! Jump phase segmentation
//!
//! Locates the unweighting, braking, propulsion and flight boundaries of a
//! vertical jump from its force-derived kinematic triple. Every scan is a
//! bounded search over an explicit index range.

use jumpsync_core::config::PhaseConfig;
use jumpsync_core::error::{ProcessingError, ProcessingResult};
use jumpsync_core::math::{argmax, argmin, find_first, find_last, mean, std_dev};
use jumpsync_core::types::{JumpType, PhaseBoundaries, PhaseMark};
use tracing::debug;

/// Phase boundary detector
#[derive(Clone, Debug, Default)]
pub struct PhaseDetector {
    config: PhaseConfig,
}

impl PhaseDetector {
    /// Create a detector with the given thresholds
    #[must_use]
    pub fn new(config: PhaseConfig) -> Self {
        Self { config }
    }

    /// Threshold configuration
    #[must_use]
    pub fn config(&self) -> &PhaseConfig {
        &self.config
    }

    /// Detect all boundaries of a countermovement jump.
    ///
    /// # Errors
    ///
    /// Returns `EmptySignal` / `ShapeMismatch` for bad inputs and
    /// `PhaseNotFound` when a search range is empty, no sample crosses its
    /// threshold, or the resulting boundaries are out of order.
    pub fn detect(
        &self,
        time: &[f64],
        displacement: &[f64],
        velocity: &[f64],
        acceleration: &[f64],
    ) -> ProcessingResult<PhaseBoundaries> {
        self.detect_for(JumpType::Cmj, time, displacement, velocity, acceleration)
    }

    /// Detect boundaries using the policy of `jump_type`.
    ///
    /// Jumps without a countermovement report index 0 for unweighting and
    /// braking.
    ///
    /// # Errors
    ///
    /// Same as [`PhaseDetector::detect`].
    pub fn detect_for(
        &self,
        jump_type: JumpType,
        time: &[f64],
        displacement: &[f64],
        velocity: &[f64],
        acceleration: &[f64],
    ) -> ProcessingResult<PhaseBoundaries> {
        let n = time.len();
        if n == 0 {
            return Err(ProcessingError::EmptySignal);
        }
        ProcessingError::check_len(n, displacement.len())?;
        ProcessingError::check_len(n, velocity.len())?;
        ProcessingError::check_len(n, acceleration.len())?;

        let (end_unweighting, end_braking) = if jump_type.has_countermovement() {
            self.unweighting_braking(acceleration, velocity, displacement)?
        } else {
            (0, 0)
        };
        let (end_propulsion, end_flight) = self.propulsion_flight(acceleration, displacement, end_braking)?;

        let boundaries = PhaseBoundaries {
            init_movement: PhaseMark::at(0, time),
            end_unweighting: PhaseMark::at(end_unweighting, time),
            end_braking: PhaseMark::at(end_braking, time),
            end_propulsion: PhaseMark::at(end_propulsion, time),
            end_flight: PhaseMark::at(end_flight, time),
        };

        if let Some(phase) = boundaries.first_out_of_order(n) {
            return Err(ProcessingError::PhaseNotFound { phase: phase.as_str(), start: 0, end: n });
        }

        debug!(
            %jump_type,
            end_unweighting,
            end_braking,
            end_propulsion,
            end_flight,
            "Phase boundaries detected"
        );
        Ok(boundaries)
    }

    /// End of unweighting (most negative velocity) and end of braking
    /// (lowest displacement), both searched before peak take-off velocity.
    ///
    /// # Errors
    ///
    /// Returns `PhaseNotFound` if a search range is empty.
    pub fn unweighting_braking(
        &self,
        acceleration: &[f64],
        velocity: &[f64],
        displacement: &[f64],
    ) -> ProcessingResult<(usize, usize)> {
        let acc_min = argmin(acceleration).ok_or(ProcessingError::EmptySignal)?;
        let peak_vel = argmax(&velocity[..acc_min.min(velocity.len())])
            .ok_or(ProcessingError::PhaseNotFound { phase: "peak_velocity", start: 0, end: acc_min })?;
        let end_unweighting = argmin(&velocity[..peak_vel])
            .ok_or(ProcessingError::PhaseNotFound { phase: "end_unweighting", start: 0, end: peak_vel })?;
        let end_braking = argmin(&displacement[..peak_vel])
            .ok_or(ProcessingError::PhaseNotFound { phase: "end_braking", start: 0, end: peak_vel })?;

        debug!(acc_min, peak_vel, end_unweighting, end_braking, "Countermovement phases");
        Ok((end_unweighting, end_braking))
    }

    /// Take-off and landing indices.
    ///
    /// A coarse threshold (a fraction of the acceleration at the apex)
    /// brackets the flight; the mean and spread of the middle of that
    /// bracket give the refined threshold used for the final cut.
    ///
    /// # Errors
    ///
    /// Returns `PhaseNotFound` if a bracket or cut cannot be found.
    pub fn propulsion_flight(
        &self,
        acceleration: &[f64],
        displacement: &[f64],
        end_braking: usize,
    ) -> ProcessingResult<(usize, usize)> {
        let cfg = &self.config;

        let acc_min = argmin(acceleration).ok_or(ProcessingError::EmptySignal)?;
        let acc_max = acc_min
            + argmax(&acceleration[acc_min..]).ok_or(ProcessingError::EmptySignal)?;
        let flight_center = argmax(&displacement[..acc_max.min(displacement.len())])
            .ok_or(ProcessingError::PhaseNotFound { phase: "apex", start: 0, end: acc_max })?;

        let coarse = cfg.coarse_fraction * acceleration[flight_center];
        let bracket_start = find_first(acceleration, end_braking..flight_center, |a| a < coarse).ok_or(
            ProcessingError::PhaseNotFound { phase: "flight_bracket_start", start: end_braking, end: flight_center },
        )?;
        let bracket_end = find_last(acceleration, flight_center..acc_max, |a| a < coarse).ok_or(
            ProcessingError::PhaseNotFound { phase: "flight_bracket_end", start: flight_center, end: acc_max },
        )?;

        let center = (bracket_start + bracket_end) / 2;
        let half = (cfg.refine_window_fraction * (bracket_end - bracket_start) as f64) as usize / 2;
        let segment = if half == 0 {
            &acceleration[center..=center]
        } else {
            &acceleration[center - half..center + half]
        };
        let band = (cfg.sigma * std_dev(segment)).max(cfg.band_floor);
        let refined = mean(segment) + band;

        let end_propulsion = find_first(acceleration, bracket_start..flight_center, |a| a < refined).ok_or(
            ProcessingError::PhaseNotFound { phase: "end_propulsion", start: bracket_start, end: flight_center },
        )?;
        let end_flight = find_last(acceleration, flight_center..bracket_end, |a| a < refined).ok_or(
            ProcessingError::PhaseNotFound { phase: "end_flight", start: flight_center, end: bracket_end },
        )?;

        debug!(
            acc_min,
            acc_max,
            flight_center,
            coarse,
            refined,
            bracket_start,
            bracket_end,
            end_propulsion,
            end_flight,
            "Flight phases"
        );
        Ok((end_propulsion, end_flight))
    }
}
