//! Batch processing of downloaded report files
//!
//! One file at a time, strictly sequential. A file that cannot be processed
//! (locked by the spreadsheet editor, corrupt, unexpected content) is logged
//! and skipped; nothing short of an unreadable directory fails the run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::consolidate::{consolidate, CONSOLIDATED_FILE_NAME};
use crate::error::Result;
use crate::pipeline::{shape_grid, ShapeStats};
use crate::{load_grid, save_grid};

/// Outcome of one batch run: files attempted vs. files shaped
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Number of report files found
    pub attempted: usize,
    /// Number of files shaped and saved
    pub succeeded: usize,
    /// Path of the consolidated file, when consolidation ran
    pub consolidated: Option<PathBuf>,
}

impl BatchOutcome {
    /// A batch run succeeds when at least one file was shaped
    pub fn is_success(&self) -> bool {
        self.succeeded > 0
    }

    /// Number of files that failed
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// Name of today's per-date output directory (DDMMYYYY, local time)
pub fn daily_directory_name() -> String {
    Local::now().format("%d%m%Y").to_string()
}

/// List the report files in a directory: `*.xlsx`, skipping editor lock
/// files (`~$` prefix) and the consolidated output by exact name.
pub fn report_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if !name.ends_with(".xlsx") || name.starts_with("~$") || name == CONSOLIDATED_FILE_NAME {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Shape a single report file in place.
///
/// The save runs only after every rule has succeeded; a failing file never
/// overwrites its source with half-applied rules.
pub fn shape_file(path: &Path) -> Result<ShapeStats> {
    let mut grid = load_grid(path)?;
    let stats = shape_grid(&mut grid)?;
    save_grid(grid, path)?;
    Ok(stats)
}

/// Shape every report file in `dir`. With `consolidate_results`, the files
/// that shaped cleanly are merged into the consolidated output afterwards.
pub fn shape_directory(dir: &Path, consolidate_results: bool) -> Result<BatchOutcome> {
    let files = report_files(dir)?;

    let mut outcome = BatchOutcome {
        attempted: files.len(),
        ..Default::default()
    };
    let mut processed: Vec<PathBuf> = Vec::new();

    for (i, file) in files.iter().enumerate() {
        log::info!("shaping {}/{}: {}", i + 1, files.len(), file.display());
        match shape_file(file) {
            Ok(stats) => {
                log::debug!(
                    "{}: {} rows hidden, {} tails cleared",
                    file.display(),
                    stats.hidden_rows(),
                    stats.cleared_tails
                );
                outcome.succeeded += 1;
                processed.push(file.clone());
            }
            Err(e) => {
                log::warn!("skipping {}: {e}", file.display());
            }
        }
    }

    if consolidate_results && !processed.is_empty() {
        match consolidate(&processed, dir) {
            Ok(path) => outcome.consolidated = Some(path),
            Err(e) => log::warn!("consolidation failed: {e}"),
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_files_filters_lock_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let touch = |name: &str| fs::write(dir.path().join(name), b"x").unwrap();

        touch("BC01.xlsx");
        touch("BC02.xlsx");
        touch("~$BC01.xlsx");
        touch("Kết quả.xlsx");
        touch("notes.txt");

        let files = report_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["BC01.xlsx", "BC02.xlsx"]);
    }

    #[test]
    fn test_daily_directory_name_shape() {
        let name = daily_directory_name();
        assert_eq!(name.len(), 8);
        assert!(name.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_outcome_counts() {
        let outcome = BatchOutcome {
            attempted: 3,
            succeeded: 1,
            consolidated: None,
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.failed(), 2);

        assert!(!BatchOutcome::default().is_success());
    }
}
