//! Trial-level entry points
//!
//! Chains the processing stages into the two measurement paths and their
//! comparison:
//!
//! ```text
//! force file ─► filter ─► offset ─► integrate ─┐
//!                                              ├─► resample ─► crop ─► lag ─► score
//! center-of-mass CSV ─► low-pass ──────────────┘
//! ```

use std::path::Path;

use jumpsync_core::config::{AnalysisConfig, PhaseConfig};
use jumpsync_core::error::{ProcessingError, ProcessingResult};
use jumpsync_core::math::{argmax, mean};
use jumpsync_core::types::{is_missing, ErrorScores, JumpType, KinematicTriple, PhaseBoundaries};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::TrialResult;
use crate::io::force_file::{AcpReader, ForceFileOptions, ForceFileReader, ForceTrial};
use crate::processing::compare::score_triple;
use crate::processing::conditioning::{correct_offset, filter};
use crate::processing::kinematics::derive_kinematics;
use crate::processing::phases::PhaseDetector;
use crate::processing::resample::Resampler;
use crate::processing::sync::{apply_lag, SyncConfig, Synchronizer};
use crate::processing::window::{crop_triple, window_samples};

// ============================================================================
// Force path
// ============================================================================

/// Kinematics derived from one force-platform trial
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForceKinematics {
    /// Time stamps in seconds
    pub time: Vec<f64>,
    /// Center-of-mass displacement in m
    pub displacement: Vec<f64>,
    /// Velocity in m/s
    pub velocity: Vec<f64>,
    /// Acceleration in m/s²
    pub acceleration: Vec<f64>,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Subject mass in kg
    pub mass: f64,
    /// Jump protocol
    pub jump_type: JumpType,
}

impl ForceKinematics {
    /// Copy the kinematic channels into a [`KinematicTriple`].
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the channels differ in length.
    pub fn to_triple(&self) -> ProcessingResult<KinematicTriple> {
        KinematicTriple::new(
            self.time.clone(),
            self.displacement.clone(),
            self.velocity.clone(),
            self.acceleration.clone(),
            self.sample_rate,
        )
    }
}

/// Read a force-platform export and derive its kinematics.
///
/// # Errors
///
/// Returns reader errors (I/O, parse, missing metadata) and the
/// processing errors of [`analyze_force_signal`].
pub fn analyze_force_trial(
    path: &Path,
    options: ForceFileOptions,
    config: &AnalysisConfig,
) -> TrialResult<ForceKinematics> {
    let trial = AcpReader::new(options).read_force_trial(path)?;
    Ok(analyze_force_signal(&trial, config)?)
}

/// Filter, offset-correct and integrate an already loaded force trial.
///
/// # Errors
///
/// Returns `InvalidFilterParameters` for a cutoff at or above Nyquist,
/// `PhaseNotFound` if the offset correction finds no flight, and
/// `InvalidMass` for a non-positive mass.
pub fn analyze_force_signal(trial: &ForceTrial, config: &AnalysisConfig) -> ProcessingResult<ForceKinematics> {
    let fs = trial.sample_rate;
    let settings = &config.force_filter;

    let mut force = filter(&trial.force, fs, settings.band, settings.cutoff_hz, settings.order)?;
    if config.correct_offset {
        force = correct_offset(&force)?;
    }
    let kinematics = derive_kinematics(&force, fs, trial.mass_kg, config.gravity)?;

    debug!(samples = force.len(), sample_rate = fs, mass = trial.mass_kg, "Force kinematics derived");

    Ok(ForceKinematics {
        time: trial.time.clone(),
        displacement: kinematics.displacement,
        velocity: kinematics.velocity,
        acceleration: kinematics.acceleration,
        sample_rate: fs,
        mass: trial.mass_kg,
        jump_type: trial.jump_type,
    })
}

/// Countermovement phase boundaries of a kinematic triple.
///
/// # Errors
///
/// See [`PhaseDetector::detect`].
pub fn detect_phases(
    time: &[f64],
    displacement: &[f64],
    velocity: &[f64],
    acceleration: &[f64],
    config: &PhaseConfig,
) -> ProcessingResult<PhaseBoundaries> {
    PhaseDetector::new(*config).detect(time, displacement, velocity, acceleration)
}

/// Phase boundaries using the policy of `jump_type`.
///
/// # Errors
///
/// See [`PhaseDetector::detect_for`].
pub fn detect_phases_for(
    jump_type: JumpType,
    time: &[f64],
    displacement: &[f64],
    velocity: &[f64],
    acceleration: &[f64],
    config: &PhaseConfig,
) -> ProcessingResult<PhaseBoundaries> {
    PhaseDetector::new(*config).detect_for(jump_type, time, displacement, velocity, acceleration)
}

// ============================================================================
// Alignment
// ============================================================================

/// Cropped, lag-corrected windows of two triples at a common rate
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlignmentOutcome {
    /// Lag between the windows in samples at the reference rate
    pub lag: i64,
    /// Normalized errors per channel
    pub scores: ErrorScores,
    /// Reference window after lag correction
    pub reference_window: KinematicTriple,
    /// Test window after lag correction
    pub test_window: KinematicTriple,
}

/// Lag-corrected windows before scoring
#[derive(Clone, Debug, PartialEq)]
struct AlignedWindows {
    lag: i64,
    reference: KinematicTriple,
    test: KinematicTriple,
}

/// Bring `test` to the reference rate, crop both around their anchors and
/// correct the lag estimated on position.
fn align_windows(
    reference: &KinematicTriple,
    test: &KinematicTriple,
    anchor_reference: usize,
    anchor_test: usize,
    window_seconds: f64,
    config: &AnalysisConfig,
) -> ProcessingResult<AlignedWindows> {
    let reference_rate = reference.sample_rate;
    let test_rate = test.sample_rate;
    ProcessingError::check_rate(reference_rate)?;
    ProcessingError::check_rate(test_rate)?;

    let (test, anchor_test) = if (reference_rate - test_rate).abs() > f64::EPSILON * reference_rate {
        let resampled = Resampler::new(config.resample).resample_triple(test, reference_rate)?;
        let anchor = (anchor_test as f64 * reference_rate / test_rate).round() as usize;
        debug!(test_rate, reference_rate, anchor, "Test triple resampled");
        (resampled, anchor)
    } else {
        (test.clone(), anchor_test)
    };

    let reference_window = crop_triple(reference, anchor_reference as i64, window_seconds);
    let test_window = crop_triple(&test, anchor_test as i64, window_seconds);

    let mut synchronizer = Synchronizer::new(SyncConfig::from_settings(&config.sync, reference_rate));
    let lag = synchronizer.estimate_window_lag(&reference_window.displacement, &test_window.displacement)?;

    let shift = |a: &[f64], b: &[f64]| apply_lag(a, b, lag);
    let (ref_time, test_time) = shift(&reference_window.time, &test_window.time);
    let (ref_d, test_d) = shift(&reference_window.displacement, &test_window.displacement);
    let (ref_v, test_v) = shift(&reference_window.velocity, &test_window.velocity);
    let (ref_a, test_a) = shift(&reference_window.acceleration, &test_window.acceleration);

    let valid = ref_d.iter().zip(&test_d).filter(|(r, t)| !is_missing(**r) && !is_missing(**t)).count();
    let size = window_samples(window_seconds, reference_rate);
    if valid < size / 2 {
        warn!(valid, window = size, lag, "Aligned window has few valid samples");
    }
    debug!(lag, valid, "Windows aligned");

    Ok(AlignedWindows {
        lag,
        reference: KinematicTriple::new(ref_time, ref_d, ref_v, ref_a, reference_rate)?,
        test: KinematicTriple::new(test_time, test_d, test_v, test_a, reference_rate)?,
    })
}

/// Align two triples around their anchors and score `test` against `reference`.
///
/// `test` is resampled to the reference rate first (anchor rescaled with
/// `round(anchor * reference_rate / test_rate)`); both are cropped to
/// `window_seconds` around their anchors and shifted by one lag estimated
/// on position. The lag is in window indices, so windows with different
/// amounts of leading padding still line up.
///
/// # Arguments
///
/// * `reference` - Ground truth triple; its rate is the common rate
/// * `test` - Triple under evaluation
/// * `anchor_reference` - Anchor sample index in `reference`
/// * `anchor_test` - Anchor sample index in `test` at its own rate
/// * `window_seconds` - Window length in seconds
/// * `config` - Resampling and synchronization settings
///
/// # Errors
///
/// Returns `InvalidSampleRate`, `EmptySignal` if a window holds no valid
/// position samples, and `EmptyOverlap` / `ZeroAmplitude` from scoring.
pub fn align_and_score(
    reference: &KinematicTriple,
    test: &KinematicTriple,
    anchor_reference: usize,
    anchor_test: usize,
    window_seconds: f64,
    config: &AnalysisConfig,
) -> ProcessingResult<AlignmentOutcome> {
    let aligned = align_windows(reference, test, anchor_reference, anchor_test, window_seconds, config)?;
    let scores = score_triple(&aligned.reference, &aligned.test)?;
    Ok(AlignmentOutcome {
        lag: aligned.lag,
        scores,
        reference_window: aligned.reference,
        test_window: aligned.test,
    })
}

// ============================================================================
// Trial comparison
// ============================================================================

/// Result of comparing one force trial with its motion-capture recording
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrialComparison {
    /// Resting center-of-mass height added to the force displacement (m)
    pub baseline_height: f64,
    /// Anchor index in the motion-capture triple
    pub mocap_anchor: usize,
    /// Anchor index in the force triple at the force rate
    pub force_anchor: usize,
    /// Lag in motion-capture samples
    pub lag: i64,
    /// Force-referenced normalized errors
    pub scores: ErrorScores,
    /// Motion-capture window after lag correction
    pub mocap_window: KinematicTriple,
    /// Force window after resampling and lag correction
    pub force_window: KinematicTriple,
}

/// Compare force-platform kinematics with motion-capture kinematics.
///
/// The force displacement is lifted by the resting center-of-mass height
/// of the motion capture, both triples are anchored at
/// `config.anchor`, the force triple is brought to the motion-capture rate
/// and the motion capture is scored with the force platform as ground truth.
///
/// # Errors
///
/// Returns `EmptySignal` if the baseline window holds no samples,
/// `PhaseNotFound` when a phase anchor cannot be detected, and the errors
/// of [`align_and_score`].
pub fn compare_trial(
    force: &ForceKinematics,
    mocap: &KinematicTriple,
    config: &AnalysisConfig,
) -> ProcessingResult<TrialComparison> {
    let baseline_height = baseline_height(mocap, config.baseline_window_s)?;
    let mut force_triple = force.to_triple()?;
    force_triple.offset_position(baseline_height);

    let force_anchor = anchor_index(&force_triple, force.jump_type, config)?;
    let mocap_anchor = anchor_index(mocap, force.jump_type, config)?;
    debug!(baseline_height, force_anchor, mocap_anchor, anchor = ?config.anchor, "Anchors selected");

    let aligned = align_windows(mocap, &force_triple, mocap_anchor, force_anchor, config.window_seconds, config)?;
    let scores = score_triple(&aligned.test, &aligned.reference)?;

    info!(
        lag = aligned.lag,
        position = scores.position,
        velocity = scores.velocity,
        acceleration = scores.acceleration,
        "Trial compared"
    );

    Ok(TrialComparison {
        baseline_height,
        mocap_anchor,
        force_anchor,
        lag: aligned.lag,
        scores,
        mocap_window: aligned.reference,
        force_window: aligned.test,
    })
}

/// Mean position over `[start, end)` seconds of the triple.
fn baseline_height(triple: &KinematicTriple, [start_s, end_s]: [f64; 2]) -> ProcessingResult<f64> {
    let fs = triple.sample_rate;
    let start = window_samples(start_s, fs).min(triple.len());
    let end = window_samples(end_s, fs).min(triple.len());
    let samples: Vec<f64> = triple.displacement[start..end.max(start)]
        .iter()
        .copied()
        .filter(|v| !is_missing(*v))
        .collect();
    if samples.is_empty() {
        return Err(ProcessingError::EmptySignal);
    }
    Ok(mean(&samples))
}

/// Index of the configured anchor event.
fn anchor_index(triple: &KinematicTriple, jump_type: JumpType, config: &AnalysisConfig) -> ProcessingResult<usize> {
    match config.anchor.phase() {
        None => argmax(&triple.displacement).ok_or(ProcessingError::EmptySignal),
        Some(phase) => {
            let phases = detect_phases_for(
                jump_type,
                &triple.time,
                &triple.displacement,
                &triple.velocity,
                &triple.acceleration,
                &config.phases,
            )?;
            Ok(phases.get(phase).index)
        }
    }
}
