//! Closed-form countermovement jump profile
//!
//! Piecewise-sinusoidal center-of-mass acceleration with known phase
//! boundaries, used by benchmarks and tests:
//!
//! | Segment | Acceleration |
//! |---------|--------------|
//! | stance | 0 |
//! | countermovement | `-A1 sin(2πτ/Tc)` (unweighting, then braking) |
//! | propulsion | `A2 sin(πτ/Tp)`, reaching the take-off velocity |
//! | flight | `-g` for `2 v / g` |
//! | landing | `A4 sin(πτ/Tl)`, cancelling the landing velocity |
//! | recovery | `A5 sin(2πτ/Tr)`, returning displacement to zero |
//! | rest | 0 |

use std::f64::consts::PI;

use jumpsync_core::error::ProcessingResult;
use jumpsync_core::types::{uniform_time, KinematicTriple};
use jumpsync_core::GRAVITY;

use crate::processing::kinematics::integrate;

/// Parameters of a synthetic jump
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticJump {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Total duration in seconds
    pub duration: f64,
    /// Subject mass in kg
    pub mass: f64,
    /// Gravitational acceleration in m/s²
    pub gravity: f64,
    /// Quiet standing before the movement (s)
    pub stance: f64,
    /// Countermovement duration (s)
    pub countermovement: f64,
    /// Countermovement acceleration amplitude (m/s²)
    pub countermovement_peak: f64,
    /// Propulsion duration (s)
    pub propulsion: f64,
    /// Take-off velocity (m/s)
    pub takeoff_velocity: f64,
    /// Landing duration (s)
    pub landing: f64,
    /// Recovery duration (s)
    pub recovery: f64,
}

impl Default for SyntheticJump {
    fn default() -> Self {
        Self {
            sample_rate: 1000.0,
            duration: 4.0,
            mass: 70.0,
            gravity: GRAVITY,
            stance: 1.0,
            countermovement: 0.5,
            countermovement_peak: 8.0,
            propulsion: 0.3,
            takeoff_velocity: 2.5,
            landing: 0.4,
            recovery: 0.8,
        }
    }
}

impl SyntheticJump {
    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        (self.duration * self.sample_rate).round() as usize
    }

    /// True if the profile has no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time of the most negative velocity
    #[must_use]
    pub fn unweighting_end_time(&self) -> f64 {
        self.stance + 0.5 * self.countermovement
    }

    /// Time of the lowest countermovement position
    #[must_use]
    pub fn braking_end_time(&self) -> f64 {
        self.stance + self.countermovement
    }

    /// Take-off time
    #[must_use]
    pub fn takeoff_time(&self) -> f64 {
        self.braking_end_time() + self.propulsion
    }

    /// Flight duration
    #[must_use]
    pub fn flight_time(&self) -> f64 {
        2.0 * self.takeoff_velocity / self.gravity
    }

    /// Landing time
    #[must_use]
    pub fn landing_time(&self) -> f64 {
        self.takeoff_time() + self.flight_time()
    }

    fn propulsion_peak(&self) -> f64 {
        PI * self.takeoff_velocity / (2.0 * self.propulsion)
    }

    fn landing_peak(&self) -> f64 {
        PI * self.takeoff_velocity / (2.0 * self.landing)
    }

    fn recovery_peak(&self) -> f64 {
        let takeoff_disp = -self.countermovement_peak * self.countermovement.powi(2) / (2.0 * PI)
            + self.propulsion_peak() * self.propulsion.powi(2) / PI;
        let landed_disp = takeoff_disp - self.takeoff_velocity * self.landing
            + self.landing_peak() * self.landing.powi(2) / PI;
        -2.0 * PI * landed_disp / self.recovery.powi(2)
    }

    /// Acceleration at time `t`
    #[must_use]
    pub fn acceleration_at(&self, t: f64) -> f64 {
        let mut tau = t - self.stance;
        if tau < 0.0 {
            return 0.0;
        }
        if tau < self.countermovement {
            return -self.countermovement_peak * (2.0 * PI * tau / self.countermovement).sin();
        }
        tau -= self.countermovement;
        if tau < self.propulsion {
            return self.propulsion_peak() * (PI * tau / self.propulsion).sin();
        }
        tau -= self.propulsion;
        if tau < self.flight_time() {
            return -self.gravity;
        }
        tau -= self.flight_time();
        if tau < self.landing {
            return self.landing_peak() * (PI * tau / self.landing).sin();
        }
        tau -= self.landing;
        if tau < self.recovery {
            return self.recovery_peak() * (2.0 * PI * tau / self.recovery).sin();
        }
        0.0
    }

    /// Sampled acceleration
    #[must_use]
    pub fn acceleration(&self) -> Vec<f64> {
        uniform_time(self.len(), self.sample_rate, 0.0)
            .into_iter()
            .map(|t| self.acceleration_at(t))
            .collect()
    }

    /// Vertical ground-reaction force, `mass * (a + g)`
    #[must_use]
    pub fn force(&self) -> Vec<f64> {
        self.acceleration().into_iter().map(|a| self.mass * (a + self.gravity)).collect()
    }

    /// Acceleration with its trapezoidal velocity and displacement.
    ///
    /// # Errors
    ///
    /// Returns `EmptySignal` / `InvalidSampleRate` for a degenerate profile.
    pub fn kinematics(&self) -> ProcessingResult<KinematicTriple> {
        let acceleration = self.acceleration();
        let velocity = integrate(&acceleration, self.sample_rate)?;
        let displacement = integrate(&velocity, self.sample_rate)?;
        KinematicTriple::uniform(displacement, velocity, acceleration, self.sample_rate, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_profile_returns_to_rest() {
        let jump = SyntheticJump::default();
        let triple = jump.kinematics().unwrap();
        let last = triple.len() - 1;
        assert!(triple.velocity[last].abs() < 0.03);
        assert!(triple.displacement[last].abs() < 0.05);
    }

    #[test]
    fn test_takeoff_velocity_reached() {
        let jump = SyntheticJump::default();
        let triple = jump.kinematics().unwrap();
        let takeoff = (jump.takeoff_time() * jump.sample_rate) as usize;
        assert_abs_diff_eq!(triple.velocity[takeoff - 2], jump.takeoff_velocity, epsilon = 0.02);
    }

    #[test]
    fn test_standing_force_is_body_weight() {
        let jump = SyntheticJump::default();
        let force = jump.force();
        assert_abs_diff_eq!(force[0], jump.mass * jump.gravity, epsilon = 1e-9);
        assert_eq!(force.len(), 4000);
    }
}
