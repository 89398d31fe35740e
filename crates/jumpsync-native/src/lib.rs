//! jumpsync native - host-side jump processing
//!
//! This crate turns force-platform exports and motion-capture
//! center-of-mass series into comparable kinematics:
//! - Zero-phase Butterworth filtering and flight-offset correction
//! - Double integration of force to displacement
//! - Jump phase segmentation
//! - Resampling, anchor-centred cropping and lag correction
//! - Normalized error scores and result files
//!
//! # Modules
//!
//! - [`processing`]: Numeric pipeline stages
//! - [`io`]: Force-file reader, kinematics CSV, reports
//! - [`pipeline`]: Trial-level entry points
//! - [`synthetic`]: Closed-form jump profiles for tests and benchmarks

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod error;
pub mod io;
pub mod pipeline;
pub mod processing;
pub mod synthetic;

// Re-export key types
pub use error::{TrialError, TrialResult};
pub use io::{AcpReader, CsvKinematicsProvider, ErrorReport, ForceFileOptions, ForceTrial, KinematicsProvider};
pub use pipeline::{
    align_and_score, analyze_force_signal, analyze_force_trial, compare_trial, detect_phases, detect_phases_for,
    AlignmentOutcome, ForceKinematics, TrialComparison,
};
pub use processing::{PhaseDetector, Resampler, Synchronizer};
pub use synthetic::SyntheticJump;
