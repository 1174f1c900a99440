//! Domain models for dated quality snapshots and their derived statistics.
//!
//! A snapshot is one CSV table produced by the quality analyzer on a given
//! date. The ordered sequence of snapshots is the [`Timeline`] every other
//! component works over.

use chrono::{Datelike, NaiveDate};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A snapshot file on disk whose date has been decoded from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub date: NaiveDate,
    pub path: PathBuf,
}

impl SnapshotFile {
    pub fn new(date: NaiveDate, path: impl Into<PathBuf>) -> Self {
        Self {
            date,
            path: path.into(),
        }
    }

    /// File name including extension, e.g. `2024-05-12.csv`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A snapshot materialised in memory.
///
/// Every column is held as text; metric columns are decoded on demand with
/// the lenient decoders in [`crate::parsing::cells`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub path: PathBuf,
    pub frame: DataFrame,
}

impl Snapshot {
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame
            .get_column_names()
            .iter()
            .any(|c| c.as_str() == name)
    }
}

/// Snapshot files ordered ascending by date.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    files: Vec<SnapshotFile>,
}

impl Timeline {
    /// Build a timeline; the files are sorted by date, ties keep file-name order.
    pub fn new(mut files: Vec<SnapshotFile>) -> Self {
        files.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.path.cmp(&b.path)));
        Self { files }
    }

    pub fn files(&self) -> &[SnapshotFile] {
        &self.files
    }

    pub fn iter(&self) -> impl Iterator<Item = &SnapshotFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn first(&self) -> Option<&SnapshotFile> {
        self.files.first()
    }

    pub fn latest(&self) -> Option<&SnapshotFile> {
        self.files.last()
    }

    /// Snapshots dated strictly after `date`.
    pub fn after(&self, date: NaiveDate) -> Timeline {
        Timeline {
            files: self
                .files
                .iter()
                .filter(|f| f.date > date)
                .cloned()
                .collect(),
        }
    }
}

/// Reachability of an entity's SPARQL endpoint in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReachabilityStatus {
    Available,
    Unavailable,
    NotIndicated,
    Other(String),
}

impl ReachabilityStatus {
    /// Decode a raw status cell. Missing and blank cells count as not indicated.
    pub fn from_cell(cell: Option<&str>) -> Self {
        match cell.map(str::trim) {
            None | Some("") => ReachabilityStatus::NotIndicated,
            Some("Available") => ReachabilityStatus::Available,
            Some("Unavailable") | Some("Offline") => ReachabilityStatus::Unavailable,
            Some("Not indicated") => ReachabilityStatus::NotIndicated,
            Some(other) => ReachabilityStatus::Other(other.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ReachabilityStatus::Available)
    }

    pub fn label(&self) -> &str {
        match self {
            ReachabilityStatus::Available => "Available",
            ReachabilityStatus::Unavailable => "Unavailable",
            ReachabilityStatus::NotIndicated => "Not indicated",
            ReachabilityStatus::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for ReachabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label of one statistic row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketLabel {
    /// A single snapshot date.
    Day(NaiveDate),
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
    /// The whole observation, used by punctual statistics.
    All,
}

impl BucketLabel {
    pub fn month_of(date: NaiveDate) -> Self {
        BucketLabel::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn quarter_of(date: NaiveDate) -> Self {
        BucketLabel::Quarter {
            year: date.year(),
            quarter: (date.month() - 1) / 3 + 1,
        }
    }
}

impl fmt::Display for BucketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketLabel::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            BucketLabel::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            BucketLabel::Quarter { year, quarter } => write!(f, "{:04}-Q{}", year, quarter),
            BucketLabel::All => f.write_str("all"),
        }
    }
}

/// Distributional summary of a set of scores. `None` means "no data".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl SummaryStats {
    /// The all-no-data summary of an empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Values in output column order: min, q1, median, q3, max, mean.
    pub fn as_array(&self) -> [Option<f64>; 6] {
        [self.min, self.q1, self.median, self.q3, self.max, self.mean]
    }
}

/// One row of a bucketed statistics table.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticRow {
    pub label: BucketLabel,
    pub stats: SummaryStats,
}

impl StatisticRow {
    pub fn new(label: BucketLabel, stats: SummaryStats) -> Self {
        Self { label, stats }
    }

    pub fn no_data(label: BucketLabel) -> Self {
        Self::new(label, SummaryStats::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_timeline_sorted_by_date() {
        let timeline = Timeline::new(vec![
            SnapshotFile::new(d(2024, 5, 12), "b/2024-05-12.csv"),
            SnapshotFile::new(d(2024, 3, 17), "a/2024-03-17.csv"),
            SnapshotFile::new(d(2024, 4, 1), "c/2024-04-01.csv"),
        ]);

        let dates: Vec<NaiveDate> = timeline.iter().map(|f| f.date).collect();
        assert_eq!(dates, vec![d(2024, 3, 17), d(2024, 4, 1), d(2024, 5, 12)]);
        assert_eq!(timeline.latest().unwrap().date, d(2024, 5, 12));
    }

    #[test]
    fn test_timeline_after_is_strict() {
        let timeline = Timeline::new(vec![
            SnapshotFile::new(d(2024, 5, 5), "2024-05-05.csv"),
            SnapshotFile::new(d(2024, 5, 6), "2024-05-06.csv"),
        ]);
        let after = timeline.after(d(2024, 5, 5));
        assert_eq!(after.len(), 1);
        assert_eq!(after.first().unwrap().date, d(2024, 5, 6));
    }

    #[test]
    fn test_status_decoding() {
        assert_eq!(
            ReachabilityStatus::from_cell(Some(" Available ")),
            ReachabilityStatus::Available
        );
        assert_eq!(
            ReachabilityStatus::from_cell(Some("Offline")),
            ReachabilityStatus::Unavailable
        );
        assert_eq!(
            ReachabilityStatus::from_cell(None),
            ReachabilityStatus::NotIndicated
        );
        assert_eq!(
            ReachabilityStatus::from_cell(Some("Restricted")),
            ReachabilityStatus::Other("Restricted".to_string())
        );
    }

    #[test]
    fn test_bucket_labels() {
        assert_eq!(BucketLabel::Day(d(2024, 5, 1)).to_string(), "2024-05-01");
        assert_eq!(BucketLabel::month_of(d(2024, 5, 19)).to_string(), "2024-05");
        assert_eq!(BucketLabel::quarter_of(d(2024, 5, 19)).to_string(), "2024-Q2");
        assert_eq!(BucketLabel::quarter_of(d(2024, 12, 1)).to_string(), "2024-Q4");
        assert_eq!(BucketLabel::All.to_string(), "all");
    }
}
