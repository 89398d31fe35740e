//! jumpsync
//!
//! Compares force-platform and motion-capture recordings of vertical jumps.
//!
//! # Usage
//!
//! ```bash
//! # Force-path kinematics and phase boundaries of one trial
//! jumpsync analyze trial_1.txt --output jp_1.csv --phases phases_1.json
//!
//! # One force / motion-capture pair
//! jumpsync compare --force trial_1.txt --mocap com_1.csv --output-dir results
//!
//! # Every numbered pair of two directories
//! jumpsync --config analysis.json batch --force-dir force --mocap-dir com --output-dir results
//! ```

mod pairing;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use jumpsync_core::config::AnalysisConfig;
use jumpsync_native::io::kinematics_csv::{write_kinematics_csv, CsvLayout};
use jumpsync_native::io::report::write_phases_json;
use jumpsync_native::io::{CsvKinematicsProvider, ErrorReport, ForceFileOptions, KinematicsProvider};
use jumpsync_native::{analyze_force_trial, compare_trial, detect_phases_for, TrialComparison};

use crate::pairing::{list_files, pair_trials, trial_number};

/// Force-platform / motion-capture jump comparison
#[derive(Parser, Debug)]
#[command(name = "jumpsync")]
#[command(author, version, about = "Force-platform and motion-capture jump comparison", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Analysis configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Derive kinematics and phase boundaries from a force export
    Analyze {
        /// Force-platform export
        force_file: PathBuf,

        /// Subject mass in kg (overrides the header)
        #[arg(long)]
        mass: Option<f64>,

        /// Sample rate in Hz (overrides the time column)
        #[arg(long)]
        sample_rate: Option<f64>,

        /// Write kinematics CSV here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write phase boundaries JSON here
        #[arg(long)]
        phases: Option<PathBuf>,
    },

    /// Score one motion-capture file against its force export
    Compare {
        /// Force-platform export
        #[arg(long)]
        force: PathBuf,

        /// Center-of-mass CSV
        #[arg(long)]
        mocap: PathBuf,

        /// Directory for the report
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Report label (defaults to the trial number of the force file)
        #[arg(long)]
        label: Option<String>,

        /// Subject mass in kg
        #[arg(long)]
        mass: Option<f64>,

        /// Comparison window in seconds
        #[arg(short, long)]
        window: Option<f64>,
    },

    /// Score every numbered pair of two directories
    Batch {
        /// Directory of force exports (`*.txt`)
        #[arg(long)]
        force_dir: PathBuf,

        /// Directory of center-of-mass files (`*.csv`)
        #[arg(long)]
        mocap_dir: PathBuf,

        /// Directory for the reports
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Subject mass in kg
        #[arg(long)]
        mass: Option<f64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("jumpsync v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { force_file, mass, sample_rate, output, phases } => {
            let options = ForceFileOptions { mass_kg: mass, sample_rate };
            run_analyze(&force_file, options, output.as_deref(), phases.as_deref(), &config)?;
        }
        Commands::Compare { force, mocap, output_dir, label, mass, window } => {
            if let Some(window) = window {
                config.window_seconds = window;
            }
            config.validate()?;
            let label = label.unwrap_or_else(|| default_label(&force));
            fs::create_dir_all(&output_dir)
                .with_context(|| format!("creating {}", output_dir.display()))?;
            run_compare(&force, &mocap, &output_dir, &label, mass, &config)?;
        }
        Commands::Batch { force_dir, mocap_dir, output_dir, mass } => {
            fs::create_dir_all(&output_dir)
                .with_context(|| format!("creating {}", output_dir.display()))?;
            run_batch(&force_dir, &mocap_dir, &output_dir, mass, &config)?;
        }
    }

    Ok(())
}

/// Defaults, or the JSON file at `path`
fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = AnalysisConfig::from_json_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Trial number of the file, else its stem
fn default_label(path: &Path) -> String {
    trial_number(path).map_or_else(
        || path.file_stem().map_or_else(|| "trial".to_string(), |s| s.to_string_lossy().into_owned()),
        |n| n.to_string(),
    )
}

/// Force-path kinematics and phase boundaries of one export
fn run_analyze(
    force_file: &Path,
    options: ForceFileOptions,
    output: Option<&Path>,
    phases_path: Option<&Path>,
    config: &AnalysisConfig,
) -> anyhow::Result<()> {
    let kinematics = analyze_force_trial(force_file, options, config)
        .with_context(|| format!("analyzing {}", force_file.display()))?;

    info!(
        samples = kinematics.time.len(),
        sample_rate = kinematics.sample_rate,
        mass = kinematics.mass,
        jump_type = %kinematics.jump_type,
        "Force trial analyzed"
    );

    if let Some(path) = output {
        write_kinematics_csv(path, &kinematics.to_triple()?, CsvLayout::ForcePlatform)?;
        info!(path = %path.display(), "Kinematics written");
    }

    let phases = detect_phases_for(
        kinematics.jump_type,
        &kinematics.time,
        &kinematics.displacement,
        &kinematics.velocity,
        &kinematics.acceleration,
        &config.phases,
    );
    match (phases, phases_path) {
        (Ok(phases), path) => {
            let flight = phases.flight_time();
            info!(
                end_unweighting = phases.end_unweighting.time,
                end_braking = phases.end_braking.time,
                end_propulsion = phases.end_propulsion.time,
                end_flight = phases.end_flight.time,
                flight_time = flight,
                jump_height = config.gravity * flight * flight / 8.0,
                "Phases detected"
            );
            if let Some(path) = path {
                write_phases_json(path, &phases)?;
                info!(path = %path.display(), "Phases written");
            }
        }
        (Err(e), Some(_)) => return Err(e).context("detecting phases"),
        (Err(e), None) => warn!(error = %e, "Phase detection failed"),
    }

    Ok(())
}

/// Score one pair and write `mae_<label>.txt`
fn run_compare(
    force: &Path,
    mocap: &Path,
    output_dir: &Path,
    label: &str,
    mass: Option<f64>,
    config: &AnalysisConfig,
) -> anyhow::Result<TrialComparison> {
    let options = ForceFileOptions { mass_kg: mass, sample_rate: None };
    let force_kinematics =
        analyze_force_trial(force, options, config).with_context(|| format!("analyzing {}", force.display()))?;

    let provider = CsvKinematicsProvider::new(config.mocap_sample_rate);
    let mocap_triple = provider
        .get_kinematics(label, mocap, config.mocap_lowpass_hz)
        .with_context(|| format!("loading {}", mocap.display()))?;

    let comparison = compare_trial(&force_kinematics, &mocap_triple, config)?;
    let report = ErrorReport { label: label.to_string(), scores: comparison.scores };
    report.write_to(output_dir)?;

    info!(
        label,
        lag = comparison.lag,
        position = comparison.scores.position,
        velocity = comparison.scores.velocity,
        acceleration = comparison.scores.acceleration,
        "Pair scored"
    );
    Ok(comparison)
}

/// Score every pair, skipping the ones that fail
fn run_batch(
    force_dir: &Path,
    mocap_dir: &Path,
    output_dir: &Path,
    mass: Option<f64>,
    config: &AnalysisConfig,
) -> anyhow::Result<()> {
    let force_files = list_files(force_dir, "txt").with_context(|| format!("listing {}", force_dir.display()))?;
    let mocap_files = list_files(mocap_dir, "csv").with_context(|| format!("listing {}", mocap_dir.display()))?;
    let pairs = pair_trials(&force_files, &mocap_files);
    info!(pairs = pairs.len(), "Trial pairs found");

    let mut failed = 0;
    for pair in &pairs {
        let label = pair.number.to_string();
        if let Err(e) = run_compare(&pair.force, &pair.mocap, output_dir, &label, mass, config) {
            warn!(trial = pair.number, "Trial skipped: {e:#}");
            failed += 1;
        }
    }

    info!(scored = pairs.len() - failed, failed, "Batch complete");
    Ok(())
}
