//! Kinematics CSV files and the motion-capture kinematics provider
//!
//! Files hold `time` plus one vertical position/displacement, velocity and
//! acceleration column, values printed with six decimals.

use std::path::Path;

use jumpsync_core::config::BandType;
use jumpsync_core::error::ProcessingError;
use jumpsync_core::types::KinematicTriple;
use tracing::{debug, info};

use crate::error::{TrialError, TrialResult};
use crate::io::force_file::snap_rate;
use crate::processing::conditioning::filter;

/// Column layout of a kinematics file
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CsvLayout {
    /// Force-platform derived (`displacement_y`)
    ForcePlatform,
    /// Motion-capture center of mass (`position_y`)
    MotionCapture,
}

impl CsvLayout {
    /// Header columns in file order
    #[must_use]
    pub const fn header(self) -> [&'static str; 4] {
        match self {
            Self::ForcePlatform => ["time", "displacement_y", "velocity_y", "acceleration_y"],
            Self::MotionCapture => ["time", "position_y", "velocity_y", "acceleration_y"],
        }
    }
}

/// Write `triple` as CSV.
///
/// # Errors
///
/// Returns a CSV or I/O error if the file cannot be written.
pub fn write_kinematics_csv(path: &Path, triple: &KinematicTriple, layout: CsvLayout) -> TrialResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(layout.header())?;
    for i in 0..triple.len() {
        wtr.write_record([
            format!("{:.6}", triple.time[i]),
            format!("{:.6}", triple.displacement[i]),
            format!("{:.6}", triple.velocity[i]),
            format!("{:.6}", triple.acceleration[i]),
        ])?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), rows = triple.len(), "Kinematics written");
    Ok(())
}

/// Read a kinematics CSV of either layout.
///
/// The sample rate comes from the span of the time column, or
/// `fallback_rate` if the file has fewer than two rows.
///
/// # Errors
///
/// Returns `MissingColumn`, `Parse`, CSV/I/O errors, or `MissingMetadata`
/// if no sample rate can be determined.
pub fn read_kinematics_csv(path: &Path, fallback_rate: Option<f64>) -> TrialResult<KinematicTriple> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let headers = rdr.headers()?.clone();

    let column = |names: &[&'static str]| {
        names
            .iter()
            .find_map(|name| headers.iter().position(|h| h == *name))
            .ok_or_else(|| TrialError::MissingColumn { column: names[0], path: path.to_path_buf() })
    };
    let columns = [
        column(&["time"])?,
        column(&["position_y", "displacement_y"])?,
        column(&["velocity_y"])?,
        column(&["acceleration_y"])?,
    ];

    let mut data: [Vec<f64>; 4] = Default::default();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        for (values, &idx) in data.iter_mut().zip(&columns) {
            let field = record.get(idx).unwrap_or_default();
            let value = field
                .parse::<f64>()
                .map_err(|e| TrialError::Parse { line, reason: format!("'{field}': {e}") })?;
            values.push(value);
        }
    }

    let [time, displacement, velocity, acceleration] = data;
    let sample_rate = rate_from_span(&time)
        .or(fallback_rate)
        .ok_or(ProcessingError::MissingMetadata { field: "sample_rate" })?;
    Ok(KinematicTriple::new(time, displacement, velocity, acceleration, sample_rate)?)
}

/// Rate from the mean spacing of the whole time axis.
///
/// Printed time stamps carry six decimals, so the first interval alone is
/// too coarse at motion-capture rates.
fn rate_from_span(time: &[f64]) -> Option<f64> {
    let (first, last) = (time.first()?, time.last()?);
    let span = last - first;
    if time.len() < 2 || span.is_nan() || span <= 0.0 {
        return None;
    }
    Some(snap_rate((time.len() - 1) as f64 / span))
}

/// Source of motion-capture center-of-mass kinematics
pub trait KinematicsProvider {
    /// Kinematics of `subject_model` performing `motion_source`.
    ///
    /// With a cutoff, each channel is low-pass filtered.
    ///
    /// # Errors
    ///
    /// Returns an error if the motion cannot be loaded or filtered.
    fn get_kinematics(
        &self,
        subject_model: &str,
        motion_source: &Path,
        lowpass_cutoff_hz: Option<f64>,
    ) -> TrialResult<KinematicTriple>;
}

/// Provider reading center-of-mass CSVs exported by the biomechanical model
#[derive(Clone, Debug)]
pub struct CsvKinematicsProvider {
    fallback_rate: f64,
    filter_order: usize,
}

impl CsvKinematicsProvider {
    /// Create a provider; `fallback_rate` is used for files too short to derive a rate.
    #[must_use]
    pub fn new(fallback_rate: f64) -> Self {
        Self { fallback_rate, filter_order: 4 }
    }
}

impl KinematicsProvider for CsvKinematicsProvider {
    fn get_kinematics(
        &self,
        subject_model: &str,
        motion_source: &Path,
        lowpass_cutoff_hz: Option<f64>,
    ) -> TrialResult<KinematicTriple> {
        let mut triple = read_kinematics_csv(motion_source, Some(self.fallback_rate))?;
        if triple.is_empty() {
            return Err(ProcessingError::EmptySignal.into());
        }

        if let Some(cutoff) = lowpass_cutoff_hz {
            let fs = triple.sample_rate;
            triple.displacement = filter(&triple.displacement, fs, BandType::Lowpass, cutoff, self.filter_order)?;
            triple.velocity = filter(&triple.velocity, fs, BandType::Lowpass, cutoff, self.filter_order)?;
            triple.acceleration = filter(&triple.acceleration, fs, BandType::Lowpass, cutoff, self.filter_order)?;
        }

        info!(
            model = subject_model,
            source = %motion_source.display(),
            samples = triple.len(),
            sample_rate = triple.sample_rate,
            "Motion-capture kinematics loaded"
        );
        Ok(triple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::fs;

    fn sample_triple() -> KinematicTriple {
        let n = 120;
        let d: Vec<f64> = (0..n).map(|i| 0.9 + 0.001 * i as f64).collect();
        KinematicTriple::uniform(d, vec![0.06; n], vec![0.0; n], 60.0, 0.0).unwrap()
    }

    #[test]
    fn test_round_trip_six_decimals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("com_1.csv");
        let triple = sample_triple();
        write_kinematics_csv(&path, &triple, CsvLayout::MotionCapture).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("time,position_y,velocity_y,acceleration_y\n"));
        assert!(text.contains("0.016667,0.901000,0.060000,0.000000"));

        let read = read_kinematics_csv(&path, None).unwrap();
        assert_eq!(read.len(), 120);
        assert_eq!(read.sample_rate, 60.0);
        assert_abs_diff_eq!(read.displacement[10], 0.91, epsilon = 1e-6);
    }

    #[test]
    fn test_force_layout_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jp_1.csv");
        write_kinematics_csv(&path, &sample_triple(), CsvLayout::ForcePlatform).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("time,displacement_y,velocity_y,acceleration_y\n"));
        assert_eq!(read_kinematics_csv(&path, None).unwrap().len(), 120);
    }

    #[test]
    fn test_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "time,position_y,velocity_y\n0.0,1.0,0.0\n").unwrap();
        assert!(matches!(
            read_kinematics_csv(&path, None),
            Err(TrialError::MissingColumn { column: "acceleration_y", .. })
        ));
    }

    #[test]
    fn test_bad_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "time,position_y,velocity_y,acceleration_y\n0.0,1.0,0.0,0.0\n0.1,x,0.0,0.0\n").unwrap();
        assert!(matches!(read_kinematics_csv(&path, None), Err(TrialError::Parse { line: 3, .. })));
    }

    #[test]
    fn test_fallback_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.csv");
        fs::write(&path, "time,position_y,velocity_y,acceleration_y\n0.0,1.0,0.0,0.0\n").unwrap();
        assert!(read_kinematics_csv(&path, None).is_err());
        assert_eq!(read_kinematics_csv(&path, Some(60.0)).unwrap().sample_rate, 60.0);
    }

    #[test]
    fn test_provider_filters_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("com_2.csv");
        let n = 600;
        // 1 Hz motion plus 25 Hz jitter at 60 Hz
        let d: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 / 60.0;
                (2.0 * std::f64::consts::PI * t).sin() + 0.1 * (2.0 * std::f64::consts::PI * 25.0 * t).sin()
            })
            .collect();
        let triple = KinematicTriple::uniform(d, vec![0.0; n], vec![0.0; n], 60.0, 0.0).unwrap();
        write_kinematics_csv(&path, &triple, CsvLayout::MotionCapture).unwrap();

        let provider = CsvKinematicsProvider::new(60.0);
        let raw = provider.get_kinematics("model", &path, None).unwrap();
        let smooth = provider.get_kinematics("model", &path, Some(10.0)).unwrap();
        let jitter = |s: &[f64]| {
            s[100..500]
                .iter()
                .enumerate()
                .map(|(i, v)| (v - (2.0 * std::f64::consts::PI * (i + 100) as f64 / 60.0).sin()).abs())
                .fold(0.0_f64, f64::max)
        };
        assert!(jitter(&raw.displacement) > 0.05);
        assert!(jitter(&smooth.displacement) < 0.01);
    }
}
