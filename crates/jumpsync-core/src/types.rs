//! Core types for jump trial analysis
//!
//! This module provides the data model shared by every stage:
//! - Kinematic triples on a shared uniform time axis
//! - Channel and jump-type enumerations
//! - Phase boundary sets produced by segmentation
//! - Per-channel agreement scores

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, ProcessingResult};

// ============================================================================
// Missing-value sentinel
// ============================================================================

/// Sentinel written into padded or unavailable samples.
pub const MISSING: f64 = f64::NAN;

/// True for padding / unavailable samples (NaN or infinite).
#[inline]
#[must_use]
pub fn is_missing(value: f64) -> bool {
    !value.is_finite()
}

/// Build a uniform time axis of `len` samples starting at `start`.
#[must_use]
pub fn uniform_time(len: usize, sample_rate: f64, start: f64) -> Vec<f64> {
    (0..len).map(|i| start + i as f64 / sample_rate).collect()
}

/// Derive `1 / (t[1] - t[0])` from a time axis.
///
/// # Errors
///
/// Returns `MissingMetadata` with fewer than two samples and
/// `InvalidSampleRate` if the spacing is not positive.
pub fn sample_rate_from_time(time: &[f64]) -> ProcessingResult<f64> {
    if time.len() < 2 {
        return Err(ProcessingError::MissingMetadata { field: "sample_rate" });
    }
    let rate = 1.0 / (time[1] - time[0]);
    ProcessingError::check_rate(rate)?;
    Ok(rate)
}

// ============================================================================
// Kinematic triple
// ============================================================================

/// Kinematic channel of a vertical center-of-mass trajectory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Position / displacement (m)
    Position,
    /// Velocity (m/s)
    Velocity,
    /// Acceleration (m/s²)
    Acceleration,
}

impl Channel {
    /// All channels in storage order
    pub const ALL: [Self; 3] = [Self::Position, Self::Velocity, Self::Acceleration];

    /// Human-readable name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "Positional",
            Self::Velocity => "Velocity",
            Self::Acceleration => "Acceleration",
        }
    }

    /// SI unit
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Position => "m",
            Self::Velocity => "m/s",
            Self::Acceleration => "m/s^2",
        }
    }
}

/// Displacement, velocity and acceleration sharing one time axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KinematicTriple {
    /// Time stamps in seconds
    pub time: Vec<f64>,
    /// Vertical displacement or position (m)
    pub displacement: Vec<f64>,
    /// Vertical velocity (m/s)
    pub velocity: Vec<f64>,
    /// Vertical acceleration (m/s²)
    pub acceleration: Vec<f64>,
    /// Sample rate in Hz
    pub sample_rate: f64,
}

impl KinematicTriple {
    /// Create a triple, validating lengths and rate.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if any channel differs in length from `time`,
    /// or `InvalidSampleRate` for a non-positive rate.
    pub fn new(
        time: Vec<f64>,
        displacement: Vec<f64>,
        velocity: Vec<f64>,
        acceleration: Vec<f64>,
        sample_rate: f64,
    ) -> ProcessingResult<Self> {
        ProcessingError::check_rate(sample_rate)?;
        ProcessingError::check_len(time.len(), displacement.len())?;
        ProcessingError::check_len(time.len(), velocity.len())?;
        ProcessingError::check_len(time.len(), acceleration.len())?;
        Ok(Self { time, displacement, velocity, acceleration, sample_rate })
    }

    /// Create a triple on a generated uniform time axis.
    ///
    /// # Errors
    ///
    /// Same as [`KinematicTriple::new`].
    pub fn uniform(
        displacement: Vec<f64>,
        velocity: Vec<f64>,
        acceleration: Vec<f64>,
        sample_rate: f64,
        start: f64,
    ) -> ProcessingResult<Self> {
        ProcessingError::check_rate(sample_rate)?;
        let time = uniform_time(displacement.len(), sample_rate, start);
        Self::new(time, displacement, velocity, acceleration, sample_rate)
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True if the triple holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Borrow one channel.
    #[must_use]
    pub fn channel(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::Position => &self.displacement,
            Channel::Velocity => &self.velocity,
            Channel::Acceleration => &self.acceleration,
        }
    }

    /// Mutably borrow one channel.
    pub fn channel_mut(&mut self, channel: Channel) -> &mut Vec<f64> {
        match channel {
            Channel::Position => &mut self.displacement,
            Channel::Velocity => &mut self.velocity,
            Channel::Acceleration => &mut self.acceleration,
        }
    }

    /// Add a constant to the position channel (e.g. resting center-of-mass height).
    pub fn offset_position(&mut self, offset: f64) {
        for d in &mut self.displacement {
            *d += offset;
        }
    }
}

// ============================================================================
// Jump type
// ============================================================================

/// Jump protocol recorded in the force-platform file header.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpType {
    /// Countermovement jump
    #[serde(rename = "CMJ")]
    Cmj,
    /// Squat jump (no countermovement)
    #[serde(rename = "SJ")]
    Sj,
    /// Weighted squat jump
    #[serde(rename = "WSJ")]
    Wsj,
    /// Isometric pull/push
    #[serde(rename = "ISO")]
    Iso,
    /// Header did not name a known protocol
    #[default]
    Unknown,
}

impl JumpType {
    /// Classify a header line by keyword.
    ///
    /// Weighted squat jumps are tested before plain squat jumps because
    /// `"WSJ"` contains `"SJ"`.
    #[must_use]
    pub fn from_header(line: &str) -> Self {
        if line.contains("Countermovement") || line.contains("CMJ") {
            Self::Cmj
        } else if line.contains("Weighted") || line.contains("WSJ") {
            Self::Wsj
        } else if line.contains("Squat") || line.contains("SJ") {
            Self::Sj
        } else if line.contains("Isometric") || line.contains("ISO") {
            Self::Iso
        } else {
            Self::Unknown
        }
    }

    /// Whether the unweighting/braking phases should be searched for.
    ///
    /// `Unknown` is treated as a countermovement jump.
    #[must_use]
    pub const fn has_countermovement(self) -> bool {
        !matches!(self, Self::Sj | Self::Wsj | Self::Iso)
    }

    /// Short protocol code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Cmj => "CMJ",
            Self::Sj => "SJ",
            Self::Wsj => "WSJ",
            Self::Iso => "ISO",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for JumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Phase boundaries
// ============================================================================

/// Named jump-phase boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Start of the analysed movement
    InitMovement,
    /// End of unweighting (most negative velocity)
    EndUnweighting,
    /// End of braking (lowest point of the countermovement)
    EndBraking,
    /// End of propulsion (take-off)
    EndPropulsion,
    /// End of flight (landing)
    EndFlight,
}

impl Phase {
    /// All phases in chronological order
    pub const ALL: [Self; 5] = [
        Self::InitMovement,
        Self::EndUnweighting,
        Self::EndBraking,
        Self::EndPropulsion,
        Self::EndFlight,
    ];

    /// Snake-case identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InitMovement => "init_movement",
            Self::EndUnweighting => "end_unweighting",
            Self::EndBraking => "end_braking",
            Self::EndPropulsion => "end_propulsion",
            Self::EndFlight => "end_flight",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sample index of a boundary plus its time stamp.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseMark {
    /// Index into the kinematic triple
    pub index: usize,
    /// Time stamp of that sample in seconds
    pub time: f64,
}

impl PhaseMark {
    /// Mark `index` using the given time axis.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds for `time`.
    #[must_use]
    pub fn at(index: usize, time: &[f64]) -> Self {
        Self { index, time: time[index] }
    }
}

/// Phase boundary set of one trial. Immutable once detected.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseBoundaries {
    /// Start of movement
    pub init_movement: PhaseMark,
    /// End of unweighting
    pub end_unweighting: PhaseMark,
    /// End of braking
    pub end_braking: PhaseMark,
    /// End of propulsion
    pub end_propulsion: PhaseMark,
    /// End of flight
    pub end_flight: PhaseMark,
}

impl PhaseBoundaries {
    /// Look up one boundary.
    #[must_use]
    pub const fn get(&self, phase: Phase) -> PhaseMark {
        match phase {
            Phase::InitMovement => self.init_movement,
            Phase::EndUnweighting => self.end_unweighting,
            Phase::EndBraking => self.end_braking,
            Phase::EndPropulsion => self.end_propulsion,
            Phase::EndFlight => self.end_flight,
        }
    }

    /// First phase whose index breaks the chronological order or lies
    /// outside `[0, len)`, if any.
    #[must_use]
    pub fn first_out_of_order(&self, len: usize) -> Option<Phase> {
        let mut previous = 0;
        for phase in Phase::ALL {
            let index = self.get(phase).index;
            if index < previous || index >= len {
                return Some(phase);
            }
            previous = index;
        }
        None
    }

    /// Flight time in seconds (take-off to landing)
    #[must_use]
    pub fn flight_time(&self) -> f64 {
        self.end_flight.time - self.end_propulsion.time
    }
}

// ============================================================================
// Scores
// ============================================================================

/// Normalized mean absolute error per channel.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorScores {
    /// Position / displacement error
    pub position: f64,
    /// Velocity error
    pub velocity: f64,
    /// Acceleration error
    pub acceleration: f64,
}

impl ErrorScores {
    /// Score of one channel.
    #[must_use]
    pub const fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Position => self.position,
            Channel::Velocity => self.velocity,
            Channel::Acceleration => self.acceleration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marks(indices: [usize; 5]) -> PhaseBoundaries {
        let time: Vec<f64> = (0..100).map(|i| i as f64 * 0.01).collect();
        PhaseBoundaries {
            init_movement: PhaseMark::at(indices[0], &time),
            end_unweighting: PhaseMark::at(indices[1], &time),
            end_braking: PhaseMark::at(indices[2], &time),
            end_propulsion: PhaseMark::at(indices[3], &time),
            end_flight: PhaseMark::at(indices[4], &time),
        }
    }

    #[test]
    fn test_uniform_time_axis() {
        let time = uniform_time(10, 50.0, 2.0);
        assert!((time[1] - 2.02).abs() < 1e-12);
        assert!((sample_rate_from_time(&time).unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_rate_needs_two_samples() {
        assert_eq!(
            sample_rate_from_time(&[0.0]),
            Err(ProcessingError::MissingMetadata { field: "sample_rate" })
        );
        assert!(sample_rate_from_time(&[1.0, 0.5]).is_err());
    }

    #[test]
    fn test_triple_validation() {
        let bad = KinematicTriple::new(vec![0.0, 0.1], vec![0.0; 2], vec![0.0; 3], vec![0.0; 2], 10.0);
        assert_eq!(bad, Err(ProcessingError::ShapeMismatch { expected: 2, actual: 3 }));

        let mut triple =
            KinematicTriple::uniform(vec![0.0; 4], vec![1.0; 4], vec![2.0; 4], 100.0, 0.0).unwrap();
        triple.offset_position(1.5);
        assert_eq!(triple.channel(Channel::Position), &[1.5; 4]);
        assert_eq!(triple.channel(Channel::Velocity), &[1.0; 4]);
    }

    #[test]
    fn test_jump_type_from_header() {
        assert_eq!(JumpType::from_header("Countermovement Jump (CMJ)"), JumpType::Cmj);
        assert_eq!(JumpType::from_header("Weighted Squat Jump"), JumpType::Wsj);
        assert_eq!(JumpType::from_header("WSJ test"), JumpType::Wsj);
        assert_eq!(JumpType::from_header("Squat Jump"), JumpType::Sj);
        assert_eq!(JumpType::from_header("Isometric mid-thigh pull"), JumpType::Iso);
        assert_eq!(JumpType::from_header("Drop jump"), JumpType::Unknown);

        assert!(JumpType::Cmj.has_countermovement());
        assert!(JumpType::Unknown.has_countermovement());
        assert!(!JumpType::Iso.has_countermovement());
    }

    #[test]
    fn test_phase_order_check() {
        assert_eq!(marks([0, 10, 20, 30, 40]).first_out_of_order(100), None);
        assert_eq!(marks([0, 0, 0, 30, 40]).first_out_of_order(100), None);
        assert_eq!(
            marks([0, 25, 20, 30, 40]).first_out_of_order(100),
            Some(Phase::EndBraking)
        );
        assert_eq!(marks([0, 10, 20, 30, 40]).first_out_of_order(40), Some(Phase::EndFlight));
    }

    #[test]
    fn test_missing_sentinel() {
        assert!(is_missing(MISSING));
        assert!(is_missing(f64::INFINITY));
        assert!(!is_missing(0.0));
    }
}
