//! Analysis configuration.
//!
//! Every field has a default, so a JSON file only needs to name what it
//! changes:
//!
//! ```rust
//! use jumpsync_core::config::{AnalysisConfig, AnchorEvent};
//!
//! let config = AnalysisConfig::from_json_str(r#"{ "window_seconds": 6.0, "anchor": "end_propulsion" }"#).unwrap();
//! assert_eq!(config.window_seconds, 6.0);
//! assert_eq!(config.anchor, AnchorEvent::EndPropulsion);
//! assert_eq!(config.force_filter.order, 4);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, ProcessingResult};
use crate::math::constants::{FORCE_CUTOFF_HZ, FORCE_FILTER_ORDER, GRAVITY};
use crate::types::Phase;

// ============================================================================
// Filter settings
// ============================================================================

/// Butterworth band type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandType {
    /// Pass frequencies below the cutoff
    #[default]
    Lowpass,
    /// Pass frequencies above the cutoff
    Highpass,
}

/// Zero-phase Butterworth filter settings.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Band type
    pub band: BandType,
    /// Cutoff frequency in Hz
    pub cutoff_hz: f64,
    /// Filter order
    pub order: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self { band: BandType::Lowpass, cutoff_hz: FORCE_CUTOFF_HZ, order: FORCE_FILTER_ORDER }
    }
}

// ============================================================================
// Phase detection
// ============================================================================

/// Thresholds of the propulsion / flight search.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    /// Fraction of the apex acceleration used for the coarse brackets
    pub coarse_fraction: f64,
    /// Fraction of the bracket distance averaged for the refined threshold
    pub refine_window_fraction: f64,
    /// Standard deviations above the flight mean for the refined threshold
    pub sigma: f64,
    /// Minimum width of the refined band in m/s²
    pub band_floor: f64,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self { coarse_fraction: 0.9, refine_window_fraction: 0.5, sigma: 5.0, band_floor: 1e-6 }
    }
}

// ============================================================================
// Synchronization and resampling
// ============================================================================

/// Cross-correlation settings used by the trial comparison.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Subtract each signal's mean before correlating
    pub remove_mean: bool,
    /// Largest admissible |lag| in seconds, unrestricted when `None`
    pub max_lag_seconds: Option<f64>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self { remove_mean: true, max_lag_seconds: None }
    }
}

/// Kaiser windowed-sinc resampler settings.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleSettings {
    /// Zero crossings of the sinc kernel on each side
    pub zero_crossings: usize,
    /// Kaiser window shape parameter
    pub kaiser_beta: f64,
    /// Anti-alias cutoff as a fraction of the lower Nyquist frequency
    pub rolloff: f64,
}

impl Default for ResampleSettings {
    fn default() -> Self {
        Self { zero_crossings: 16, kaiser_beta: 8.555, rolloff: 0.85 }
    }
}

// ============================================================================
// Anchor
// ============================================================================

/// Event each trial's crop window is centred on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorEvent {
    /// Highest point of the position channel
    #[default]
    Apex,
    /// Start of movement
    InitMovement,
    /// End of unweighting
    EndUnweighting,
    /// End of braking
    EndBraking,
    /// Take-off
    EndPropulsion,
    /// Landing
    EndFlight,
}

impl AnchorEvent {
    /// Phase boundary this anchor refers to, `None` for [`AnchorEvent::Apex`].
    #[must_use]
    pub const fn phase(self) -> Option<Phase> {
        match self {
            Self::Apex => None,
            Self::InitMovement => Some(Phase::InitMovement),
            Self::EndUnweighting => Some(Phase::EndUnweighting),
            Self::EndBraking => Some(Phase::EndBraking),
            Self::EndPropulsion => Some(Phase::EndPropulsion),
            Self::EndFlight => Some(Phase::EndFlight),
        }
    }
}

// ============================================================================
// Top-level configuration
// ============================================================================

/// Complete analysis configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Force low-pass filter
    pub force_filter: FilterSettings,
    /// Gravitational acceleration in m/s²
    pub gravity: f64,
    /// Subtract the flight-plateau mean from the force signal
    pub correct_offset: bool,
    /// Phase detector thresholds
    pub phases: PhaseConfig,
    /// Crop window length in seconds
    pub window_seconds: f64,
    /// Sample rate of the motion-capture kinematics in Hz
    pub mocap_sample_rate: f64,
    /// Low-pass cutoff applied to motion-capture channels, `None` disables it
    pub mocap_lowpass_hz: Option<f64>,
    /// Time span `[start, end]` (s) whose mean position is the resting height
    pub baseline_window_s: [f64; 2],
    /// Event both crop windows are centred on
    pub anchor: AnchorEvent,
    /// Cross-correlation settings
    pub sync: SyncSettings,
    /// Resampler settings
    pub resample: ResampleSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            force_filter: FilterSettings::default(),
            gravity: GRAVITY,
            correct_offset: true,
            phases: PhaseConfig::default(),
            window_seconds: 3.0,
            mocap_sample_rate: 60.0,
            mocap_lowpass_hz: Some(10.0),
            baseline_window_s: [1.0, 2.0],
            anchor: AnchorEvent::Apex,
            sync: SyncSettings::default(),
            resample: ResampleSettings::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON or mistyped fields.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Reject values no stage can work with.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSampleRate` for a non-positive motion-capture rate and
    /// `InvalidFilterParameters` for a non-positive cutoff or zero order.
    pub fn validate(&self) -> ProcessingResult<()> {
        ProcessingError::check_rate(self.mocap_sample_rate)?;
        let f = self.force_filter;
        if f.cutoff_hz.is_nan() || f.cutoff_hz <= 0.0 || f.order == 0 {
            return Err(ProcessingError::InvalidFilterParameters {
                cutoff_hz: f.cutoff_hz,
                order: f.order,
                nyquist_hz: f64::NAN,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.force_filter.cutoff_hz, 30.0);
        assert_eq!(config.force_filter.order, 4);
        assert_eq!(config.gravity, 9.7838);
        assert_eq!(config.phases.sigma, 5.0);
        assert_eq!(config.resample.zero_crossings, 16);
        assert!(config.sync.remove_mean);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = AnalysisConfig::from_json_str(
            r#"{ "force_filter": { "cutoff_hz": 20.0 }, "mocap_lowpass_hz": null, "sync": { "max_lag_seconds": 0.5 } }"#,
        )
        .unwrap();
        assert_eq!(config.force_filter.cutoff_hz, 20.0);
        assert_eq!(config.force_filter.order, 4);
        assert_eq!(config.force_filter.band, BandType::Lowpass);
        assert_eq!(config.mocap_lowpass_hz, None);
        assert_eq!(config.sync.max_lag_seconds, Some(0.5));
        assert!(config.sync.remove_mean);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = AnalysisConfig::default();
        config.anchor = AnchorEvent::EndFlight;
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"end_flight\""));
        assert_eq!(AnalysisConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_anchor_phase() {
        assert_eq!(AnchorEvent::Apex.phase(), None);
        assert_eq!(AnchorEvent::EndPropulsion.phase(), Some(Phase::EndPropulsion));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AnalysisConfig::default();
        config.mocap_sample_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.force_filter.order = 0;
        assert!(config.validate().is_err());
    }
}
