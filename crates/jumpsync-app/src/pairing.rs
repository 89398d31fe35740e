//! Batch file pairing
//!
//! Force exports and center-of-mass files belong together when their names
//! end with the same trial number (`trial_3.txt` and `com_3.csv`).

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// One force export with its motion-capture file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialPair {
    /// Shared trial number
    pub number: u64,
    /// Force-platform export
    pub force: PathBuf,
    /// Center-of-mass CSV
    pub mocap: PathBuf,
}

/// Trailing number of the file stem, if any.
pub fn trial_number(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    stem[stem.len() - digits..].parse().ok()
}

/// Files in `dir` with `extension`, sorted by name.
pub fn list_files(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e.eq_ignore_ascii_case(extension)) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Match force and motion-capture files by trial number.
///
/// Unnumbered or unmatched files are logged and skipped.
pub fn pair_trials(force_files: &[PathBuf], mocap_files: &[PathBuf]) -> Vec<TrialPair> {
    if force_files.len() != mocap_files.len() {
        warn!(force = force_files.len(), mocap = mocap_files.len(), "File counts differ");
    }

    let mut mocap_by_number = BTreeMap::new();
    for path in mocap_files {
        match trial_number(path) {
            Some(n) => {
                if mocap_by_number.insert(n, path.clone()).is_some() {
                    warn!(trial = n, path = %path.display(), "Duplicate trial number");
                }
            }
            None => warn!(path = %path.display(), "No trial number, skipped"),
        }
    }

    let mut pairs = Vec::new();
    for force in force_files {
        let Some(number) = trial_number(force) else {
            warn!(path = %force.display(), "No trial number, skipped");
            continue;
        };
        match mocap_by_number.remove(&number) {
            Some(mocap) => pairs.push(TrialPair { number, force: force.clone(), mocap }),
            None => warn!(trial = number, path = %force.display(), "No motion-capture file"),
        }
    }
    for (number, path) in mocap_by_number {
        warn!(trial = number, path = %path.display(), "No force file");
    }

    pairs.sort_by_key(|p| p.number);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_number() {
        assert_eq!(trial_number(Path::new("data/trial_3.txt")), Some(3));
        assert_eq!(trial_number(Path::new("com12.csv")), Some(12));
        assert_eq!(trial_number(Path::new("jump_2a.txt")), None);
        assert_eq!(trial_number(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_pairing() {
        let force: Vec<PathBuf> = ["trial_10.txt", "trial_2.txt", "trial_4.txt"].iter().map(PathBuf::from).collect();
        let mocap: Vec<PathBuf> = ["com_2.csv", "com_10.csv", "com_7.csv"].iter().map(PathBuf::from).collect();
        let pairs = pair_trials(&force, &mocap);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], TrialPair { number: 2, force: "trial_2.txt".into(), mocap: "com_2.csv".into() });
        assert_eq!(pairs[1].number, 10);
    }

    #[test]
    fn test_list_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["trial_2.txt", "trial_1.TXT", "com_1.csv"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let files = list_files(dir.path(), "txt").unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, ["trial_1.TXT", "trial_2.txt"]);
    }
}
