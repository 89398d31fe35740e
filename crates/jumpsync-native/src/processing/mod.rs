//! Signal processing pipelines
//!
//! This module provides the numeric stages of the jump comparison:
//! - [`filters`]: Butterworth section cascade and zero-phase filtering
//! - [`conditioning`]: Force filtering and flight-offset correction
//! - [`kinematics`]: Trapezoidal integration of force to kinematics
//! - [`phases`]: Jump phase segmentation
//! - [`window`]: Anchor-centred fixed-length cropping
//! - [`resample`]: Windowed-sinc sample-rate conversion
//! - [`sync`]: FFT cross-correlation lag estimation
//! - [`compare`]: Normalized error scores

pub mod compare;
pub mod conditioning;
pub mod filters;
pub mod kinematics;
pub mod phases;
pub mod resample;
pub mod sync;
pub mod window;

pub use compare::{normalized_error, score_triple};
pub use conditioning::{correct_offset, filter};
pub use kinematics::{derive_kinematics, integrate, DerivedKinematics};
pub use phases::PhaseDetector;
pub use resample::{resample, resample_triple, Resampler};
pub use sync::{apply_lag, estimate_lag, leading_missing, SyncConfig, Synchronizer};
pub use window::{crop, crop_triple};
