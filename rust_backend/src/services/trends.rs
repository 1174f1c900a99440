use chrono::NaiveDate;
use log::{debug, info};

use crate::config::{AnalysisConfig, ColumnSettings};
use crate::core::domain::{BucketLabel, Snapshot, SnapshotFile, StatisticRow, Timeline};
use crate::error::QualityResult;
use crate::parsing::{cells, snapshot_parser};
use crate::services::statistics::compute_summary;
use crate::time::{bucket_timeline, Granularity};

/// Where the per-row values of a metric come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricSource {
    /// A numeric score column.
    Column(String),
    /// 1 when an author or a publisher is declared, else 0.
    Provenance,
    /// Leading number of the annotated extensional-conciseness cell.
    ExtensionalConciseness,
    /// Number of elements of a list-valued column.
    ListLength(String),
}

impl MetricSource {
    pub fn column(name: &str) -> Self {
        MetricSource::Column(name.to_string())
    }

    /// Name of the metric in output tables.
    pub fn name(&self) -> String {
        match self {
            MetricSource::Column(name) => name.clone(),
            MetricSource::Provenance => "P1-Provenance_information".to_string(),
            MetricSource::ExtensionalConciseness => "extensional_conciseness".to_string(),
            MetricSource::ListLength(name) => format!("{} count", name),
        }
    }

    /// Key used to look up a cutover policy.
    fn policy_key(&self) -> Option<&str> {
        match self {
            MetricSource::Column(name) | MetricSource::ListLength(name) => Some(name.as_str()),
            _ => None,
        }
    }

    fn required_columns(&self, columns: &ColumnSettings) -> Vec<String> {
        match self {
            MetricSource::Column(name) | MetricSource::ListLength(name) => vec![name.clone()],
            MetricSource::Provenance => vec![columns.author.clone(), columns.publisher.clone()],
            MetricSource::ExtensionalConciseness => vec![columns.extensional_conciseness.clone()],
        }
    }

    /// Per-row values of the metric in a snapshot holding the required columns.
    fn values(&self, snapshot: &Snapshot, columns: &ColumnSettings) -> QualityResult<Vec<Option<f64>>> {
        let frame = &snapshot.frame;
        Ok(match self {
            MetricSource::Column(name) => snapshot_parser::score_values(frame, name)?,
            MetricSource::ListLength(name) => snapshot_parser::raw_values(frame, name)?
                .iter()
                .map(|cell| cells::decode_list_len(cell.as_deref()))
                .collect(),
            MetricSource::ExtensionalConciseness => {
                snapshot_parser::raw_values(frame, &columns.extensional_conciseness)?
                    .iter()
                    .map(|cell| cells::decode_leading_number(cell.as_deref()))
                    .collect()
            }
            MetricSource::Provenance => {
                let authors = snapshot_parser::raw_values(frame, &columns.author)?;
                let publishers = snapshot_parser::raw_values(frame, &columns.publisher)?;
                authors
                    .iter()
                    .zip(publishers.iter())
                    .map(|(a, p)| Some(cells::decode_provenance(a.as_deref(), p.as_deref())))
                    .collect()
            }
        })
    }
}

/// Time-bucketed statistics over a snapshot timeline.
pub struct TrendsEngine {
    timeline: Timeline,
    config: AnalysisConfig,
}

impl TrendsEngine {
    pub fn new(timeline: Timeline, config: &AnalysisConfig) -> Self {
        Self {
            timeline,
            config: config.clone(),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    fn valid_after(&self, source: &MetricSource) -> Option<NaiveDate> {
        self.config.valid_after(source.policy_key()?)
    }

    /// Timeline restricted to the snapshots a metric may use.
    fn eligible_timeline(&self, source: &MetricSource) -> Timeline {
        match self.valid_after(source) {
            Some(cutover) => self.timeline.after(cutover),
            None => self.timeline.clone(),
        }
    }

    /// Values of a metric in one snapshot, optionally only for reachable KGs.
    ///
    /// A snapshot lacking any required column contributes no values.
    fn snapshot_values(
        &self,
        file: &SnapshotFile,
        source: &MetricSource,
        restrict_to_reachable: bool,
    ) -> QualityResult<Vec<Option<f64>>> {
        let required = source.required_columns(&self.config.columns);
        let mut wanted: Vec<&str> = required.iter().map(String::as_str).collect();
        if restrict_to_reachable {
            wanted.push(self.config.columns.status.as_str());
        }

        let snapshot = file.read_columns(&wanted)?;
        if let Some(missing) = required.iter().find(|c| !snapshot.has_column(c)) {
            debug!("{} has no column '{}'", file.file_name(), missing);
            return Ok(Vec::new());
        }

        let values = source.values(&snapshot, &self.config.columns)?;
        if !restrict_to_reachable {
            return Ok(values);
        }
        if !snapshot.has_column(&self.config.columns.status) {
            return Ok(Vec::new());
        }

        let statuses = snapshot_parser::text_values(&snapshot.frame, &self.config.columns.status)?;
        Ok(values
            .into_iter()
            .zip(statuses)
            .filter(|(_, status)| status.as_deref() == Some("Available"))
            .map(|(value, _)| value)
            .collect())
    }

    /// Bucketed statistics of a score column.
    pub fn compute_stats(
        &self,
        metric: &str,
        granularity: Granularity,
        restrict_to_reachable: bool,
    ) -> QualityResult<Vec<StatisticRow>> {
        self.compute_source_stats(&MetricSource::column(metric), granularity, restrict_to_reachable)
    }

    /// Bucketed statistics of any metric source.
    ///
    /// Each bucket is summarised from its earliest snapshot only. Buckets
    /// without a snapshot, or without values left after filtering, produce
    /// a no-data row rather than being dropped.
    pub fn compute_source_stats(
        &self,
        source: &MetricSource,
        granularity: Granularity,
        restrict_to_reachable: bool,
    ) -> QualityResult<Vec<StatisticRow>> {
        info!("Evaluating the {} metric ({})", source.name(), granularity);

        let timeline = self.eligible_timeline(source);
        let mut rows = Vec::new();
        for bucket in bucket_timeline(&timeline, granularity) {
            let row = match &bucket.snapshot {
                Some(file) => {
                    let values = self.snapshot_values(file, source, restrict_to_reachable)?;
                    StatisticRow::new(bucket.label, compute_summary(&values))
                }
                None => StatisticRow::no_data(bucket.label),
            };
            rows.push(row);
        }
        Ok(rows)
    }

    /// Single-bucket statistics of several metrics on the latest snapshot.
    ///
    /// Every row is labelled [`BucketLabel::All`]; a metric whose cutover
    /// excludes the latest snapshot yields a no-data row.
    pub fn punctual_stats(
        &self,
        sources: &[MetricSource],
        restrict_to_reachable: bool,
    ) -> QualityResult<Vec<(String, StatisticRow)>> {
        let Some(latest) = self.timeline.latest() else {
            return Ok(sources
                .iter()
                .map(|s| (s.name(), StatisticRow::no_data(BucketLabel::All)))
                .collect());
        };
        info!("Punctual evaluation on {}", latest.file_name());

        let mut rows = Vec::with_capacity(sources.len());
        for source in sources {
            let excluded = self
                .valid_after(source)
                .map(|cutover| latest.date <= cutover)
                .unwrap_or(false);
            let row = if excluded {
                StatisticRow::no_data(BucketLabel::All)
            } else {
                let values = self.snapshot_values(latest, source, restrict_to_reachable)?;
                StatisticRow::new(BucketLabel::All, compute_summary(&values))
            };
            rows.push((source.name(), row));
        }
        Ok(rows)
    }
}
