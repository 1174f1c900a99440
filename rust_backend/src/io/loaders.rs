use chrono::NaiveDate;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::domain::{Snapshot, SnapshotFile, Timeline};
use crate::error::{QualityError, QualityResult};
use crate::parsing::snapshot_parser;

/// Decode the snapshot date encoded in a file stem, e.g. `2024-05-12.csv`.
pub fn parse_snapshot_date(path: &Path) -> QualityResult<NaiveDate> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| QualityError::DateParse {
            name: path.display().to_string(),
            reason: "file has no name".to_string(),
        })?;

    NaiveDate::parse_from_str(stem, "%Y-%m-%d").map_err(|e| QualityError::DateParse {
        name: stem.to_string(),
        reason: e.to_string(),
    })
}

/// List the CSV files of a directory, sorted by name.
pub fn list_csv_files(dir: &Path) -> QualityResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(QualityError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Discovers and reads the dated snapshot tables of a directory.
pub struct SnapshotLoader;

impl SnapshotLoader {
    /// Build the timeline of a snapshot directory.
    ///
    /// Files whose name is not an ISO date are skipped with a warning.
    pub fn discover(dir: &Path) -> QualityResult<Timeline> {
        let mut files = Vec::new();
        for path in list_csv_files(dir)? {
            match parse_snapshot_date(&path) {
                Ok(date) => files.push(SnapshotFile::new(date, path)),
                Err(e) => warn!("Skipping snapshot {}: {}", path.display(), e),
            }
        }

        debug!("Discovered {} snapshots in {}", files.len(), dir.display());
        Ok(Timeline::new(files))
    }

    /// Read a single snapshot file; its date must be encoded in its name.
    pub fn load_file(path: &Path) -> QualityResult<Snapshot> {
        let date = parse_snapshot_date(path)?;
        SnapshotFile::new(date, path).read_all()
    }
}

impl SnapshotFile {
    /// Column names present in the file.
    pub fn columns(&self) -> QualityResult<Vec<String>> {
        snapshot_parser::read_header(&self.path)
    }

    /// Read every column.
    pub fn read_all(&self) -> QualityResult<Snapshot> {
        let frame = snapshot_parser::parse_snapshot_csv(&self.path, None)?;
        Ok(Snapshot {
            date: self.date,
            path: self.path.clone(),
            frame,
        })
    }

    /// Read only the named columns. Names absent from the file are skipped;
    /// callers check [`Snapshot::has_column`].
    pub fn read_columns(&self, names: &[&str]) -> QualityResult<Snapshot> {
        let header = self.columns()?;
        let mut present: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if header.iter().any(|h| h == name) && !present.iter().any(|p| p == name) {
                present.push(name.to_string());
            }
        }

        let frame = if present.is_empty() {
            polars::prelude::DataFrame::empty()
        } else {
            snapshot_parser::parse_snapshot_csv(&self.path, Some(&present))?
        };
        Ok(Snapshot {
            date: self.date,
            path: self.path.clone(),
            frame,
        })
    }
}
