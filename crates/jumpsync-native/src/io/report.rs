//! Per-trial result files

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use jumpsync_core::types::{Channel, ErrorScores, PhaseBoundaries};
use tracing::info;

use crate::error::TrialResult;

/// Agreement scores of one trial pair, rendered one channel per line.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorReport {
    /// Trial label used in the file name
    pub label: String,
    /// Normalized errors per channel
    pub scores: ErrorScores,
}

impl ErrorReport {
    /// File name of the report: `mae_<label>.txt`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("mae_{}.txt", self.label)
    }

    /// Write the report into `dir`, returning the file path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn write_to(&self, dir: &Path) -> TrialResult<PathBuf> {
        let path = dir.join(self.file_name());
        fs::write(&path, self.to_string())?;
        info!(path = %path.display(), "Report written");
        Ok(path)
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for channel in Channel::ALL {
            writeln!(f, "{} MAE: {:.4}", channel.name(), self.scores.get(channel))?;
        }
        Ok(())
    }
}

/// Write phase boundaries as pretty JSON.
///
/// # Errors
///
/// Returns a JSON or I/O error.
pub fn write_phases_json(path: &Path, phases: &PhaseBoundaries) -> TrialResult<()> {
    let json = serde_json::to_string_pretty(phases)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read phase boundaries written by [`write_phases_json`].
///
/// # Errors
///
/// Returns a JSON or I/O error.
pub fn read_phases_json(path: &Path) -> TrialResult<PhaseBoundaries> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jumpsync_core::types::PhaseMark;

    fn report() -> ErrorReport {
        ErrorReport {
            label: "3".to_string(),
            scores: ErrorScores { position: 0.012_34, velocity: 0.1, acceleration: 0.256_78 },
        }
    }

    #[test]
    fn test_report_lines() {
        assert_eq!(
            report().to_string(),
            "Positional MAE: 0.0123\nVelocity MAE: 0.1000\nAcceleration MAE: 0.2568\n"
        );
    }

    #[test]
    fn test_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = report().write_to(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "mae_3.txt");
        assert!(fs::read_to_string(path).unwrap().starts_with("Positional MAE: 0.0123"));
    }

    #[test]
    fn test_phases_json() {
        let mark = |index: usize| PhaseMark { index, time: index as f64 / 1000.0 };
        let phases = PhaseBoundaries {
            init_movement: mark(0),
            end_unweighting: mark(1250),
            end_braking: mark(1500),
            end_propulsion: mark(1800),
            end_flight: mark(2310),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phases.json");
        write_phases_json(&path, &phases).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"end_propulsion\""));
        assert_eq!(read_phases_json(&path).unwrap(), phases);
    }
}
