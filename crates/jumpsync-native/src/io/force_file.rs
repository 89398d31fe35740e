//! Force-platform export reader
//!
//! Reads the tab-separated export of the force platform software: a
//! free-text header followed by a `Time (s)` column line and numeric rows.
//!
//! Header rules:
//! - first line: jump protocol ([`JumpType::from_header`])
//! - line containing `(body weight)`: mass in kg in its first tab field
//! - line containing `data rate`: rate in Hz after `@ `
//! - line containing `Time (s)`: tab-separated column names

use std::fs;
use std::path::Path;

use jumpsync_core::error::ProcessingError;
use jumpsync_core::types::{sample_rate_from_time, JumpType};
use tracing::{debug, warn};

use crate::error::{TrialError, TrialResult};

/// Name of the time column
pub const TIME_COLUMN: &str = "Time (s)";

/// Name of the vertical force column
pub const FORCE_COLUMN: &str = "Raw Fz (N)";

/// One force-platform trial
#[derive(Clone, Debug, PartialEq)]
pub struct ForceTrial {
    /// Time stamps in seconds
    pub time: Vec<f64>,
    /// Vertical ground-reaction force in N
    pub force: Vec<f64>,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Subject mass in kg
    pub mass_kg: f64,
    /// Jump protocol from the header
    pub jump_type: JumpType,
}

/// Values that take precedence over the file header
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForceFileOptions {
    /// Subject mass in kg
    pub mass_kg: Option<f64>,
    /// Sample rate in Hz
    pub sample_rate: Option<f64>,
}

/// Source of force-platform trials
pub trait ForceFileReader {
    /// Read one trial.
    ///
    /// # Errors
    ///
    /// Returns an I/O, parse, missing-column or missing-metadata error.
    fn read_force_trial(&self, path: &Path) -> TrialResult<ForceTrial>;
}

/// Reader for the tab-separated platform export
#[derive(Clone, Debug, Default)]
pub struct AcpReader {
    options: ForceFileOptions,
}

/// Metadata collected from the header lines
#[derive(Debug, Default)]
struct Header {
    jump_type: JumpType,
    mass_kg: Option<f64>,
    data_rate: Option<f64>,
    columns: Vec<String>,
}

impl AcpReader {
    /// Create a reader with header overrides
    #[must_use]
    pub fn new(options: ForceFileOptions) -> Self {
        Self { options }
    }

    /// Parse the contents of an export.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed rows, `MissingColumn` if the time or
    /// force column is absent and `MissingMetadata` if mass or sample rate
    /// cannot be determined.
    pub fn parse(&self, text: &str, path: &Path) -> TrialResult<ForceTrial> {
        let mut lines = text.lines().enumerate();
        let mut header = Header::default();

        for (i, line) in lines.by_ref() {
            if i == 0 {
                header.jump_type = JumpType::from_header(line);
            }
            if line.contains("(body weight)") {
                header.mass_kg = line
                    .split('\t')
                    .next()
                    .and_then(|field| field.trim().parse::<f64>().ok())
                    .filter(|m| m.is_finite() && *m > 0.0);
                if header.mass_kg.is_none() {
                    warn!(line = i + 1, "Body weight line has no usable mass");
                }
            }
            if line.contains(TIME_COLUMN) {
                header.columns = line.split('\t').map(|c| c.trim().to_string()).collect();
                break;
            }
            if line.contains("data rate") {
                header.data_rate = extract_rate(line);
            }
        }

        let column = |name: &'static str| {
            header
                .columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| TrialError::MissingColumn { column: name, path: path.to_path_buf() })
        };
        let time_idx = column(TIME_COLUMN)?;
        let force_idx = column(FORCE_COLUMN)?;
        let width = header.columns.len();

        let mut time = Vec::new();
        let mut force = Vec::new();
        for (i, line) in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let values = trimmed
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<Vec<f64>, _>>()
                .map_err(|e| TrialError::Parse { line: i + 1, reason: e.to_string() })?;
            if values.len() != width {
                return Err(TrialError::Parse {
                    line: i + 1,
                    reason: format!("expected {width} columns, found {}", values.len()),
                });
            }
            time.push(values[time_idx]);
            force.push(values[force_idx]);
        }

        let sample_rate = self.resolve_rate(&time, header.data_rate)?;
        let mass_kg = self.resolve_mass(header.mass_kg)?;

        debug!(
            path = %path.display(),
            samples = force.len(),
            sample_rate,
            mass_kg,
            jump_type = %header.jump_type,
            "Force trial parsed"
        );

        Ok(ForceTrial { time, force, sample_rate, mass_kg, jump_type: header.jump_type })
    }

    /// Override, then the time column, then the header data rate.
    fn resolve_rate(&self, time: &[f64], header_rate: Option<f64>) -> TrialResult<f64> {
        if let Some(rate) = self.options.sample_rate {
            ProcessingError::check_rate(rate)?;
            return Ok(rate);
        }
        if let Ok(rate) = sample_rate_from_time(time) {
            return Ok(snap_rate(rate));
        }
        header_rate.ok_or(TrialError::Processing(ProcessingError::MissingMetadata { field: "sample_rate" }))
    }

    /// Override, then the header body weight.
    fn resolve_mass(&self, header_mass: Option<f64>) -> TrialResult<f64> {
        match self.options.mass_kg {
            Some(mass) if mass.is_finite() && mass > 0.0 => Ok(mass),
            Some(mass) => Err(ProcessingError::InvalidMass { mass_kg: mass }.into()),
            None => header_mass.ok_or(TrialError::Processing(ProcessingError::MissingMetadata { field: "mass_kg" })),
        }
    }
}

impl ForceFileReader for AcpReader {
    fn read_force_trial(&self, path: &Path) -> TrialResult<ForceTrial> {
        let text = fs::read_to_string(path)?;
        self.parse(&text, path)
    }
}

/// Integer rate following `@ ` (e.g. `"3000 @ 1000 (number of samples, data rate)"`).
fn extract_rate(line: &str) -> Option<f64> {
    let rest = &line[line.find("@ ")? + 2..];
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<u32>().ok().filter(|r| *r > 0).map(f64::from)
}

/// Round rates derived from printed time stamps (e.g. 999.9999999) to the integer they stand for.
pub(crate) fn snap_rate(rate: f64) -> f64 {
    let rounded = rate.round();
    if (rate - rounded).abs() <= 1e-6 * rate {
        rounded
    } else {
        rate
    }
}
