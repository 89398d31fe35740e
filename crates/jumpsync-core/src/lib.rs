//! jumpsync core - data model and numeric primitives
//!
//! This crate provides the types shared by every stage of the
//! force-platform / motion-capture jump comparison: kinematic triples on
//! a uniform time axis, phase boundary sets, agreement scores, the
//! error enum and the analysis configuration.
//!
//! # Modules
//!
//! - [`types`]: Kinematic triples, jump types, phase boundaries
//! - [`error`]: [`ProcessingError`] and result alias
//! - [`math`]: Statistics, bounded searches, constants
//! - [`config`]: [`AnalysisConfig`] with serde defaults
//!
//! # Example
//!
//! ```rust
//! use jumpsync_core::types::{Channel, KinematicTriple};
//!
//! let triple = KinematicTriple::uniform(vec![0.0; 4], vec![0.0; 4], vec![-9.8; 4], 100.0, 0.0).unwrap();
//! assert_eq!(triple.channel(Channel::Acceleration)[2], -9.8);
//! assert!((triple.time[1] - 0.01).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod error;
pub mod math;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{AnalysisConfig, AnchorEvent, BandType};
pub use error::{ProcessingError, ProcessingResult};
pub use math::constants::GRAVITY;
pub use types::{
    Channel, ErrorScores, JumpType, KinematicTriple, Phase, PhaseBoundaries, PhaseMark, MISSING,
};
