//! Trial input and output
//!
//! - [`force_file`]: Force-platform export reader
//! - [`kinematics_csv`]: Kinematics CSV files and the motion-capture provider
//! - [`report`]: Score reports and phase exports

pub mod force_file;
pub mod kinematics_csv;
pub mod report;

pub use force_file::{AcpReader, ForceFileOptions, ForceFileReader, ForceTrial};
pub use kinematics_csv::{
    read_kinematics_csv, write_kinematics_csv, CsvKinematicsProvider, CsvLayout, KinematicsProvider,
};
pub use report::{read_phases_json, write_phases_json, ErrorReport};
