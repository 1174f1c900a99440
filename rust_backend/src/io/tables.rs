//! Output tables of an evaluation run.
//!
//! Every table is a CSV file. Statistic tables share the header
//! `<label>,Min,Q1,Median,Q3,Max,Mean`; a "no data" statistic is an empty cell.

use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::domain::{StatisticRow, SummaryStats};
use crate::error::QualityResult;
use crate::parsing::snapshot_parser::{self, write_snapshot_csv};
use crate::time::Granularity;

/// Header of the label column of over-time statistic tables.
pub const DATE_HEADER: &str = "Analysis date";
/// Header of the label column of punctual statistic tables.
pub const METRIC_HEADER: &str = "Metric";

const STAT_HEADERS: [&str; 6] = ["Min", "Q1", "Median", "Q3", "Max", "Mean"];

pub const STATUS_COUNTS_FILE: &str = "sparql_over_time.csv";
pub const ALTERNATING_FILE: &str = "sparql_alternating_percentage.csv";
pub const AVAILABILITY_FREQUENCY_FILE: &str = "percentage_of_availability_sparql.csv";
pub const SWING_SUMMARY_FILE: &str = "sparql_swing_summary.csv";
pub const DIMENSIONS_STATS_FILE: &str = "dimensions_stats.csv";
pub const CATEGORIES_STATS_FILE: &str = "categories_stats.csv";
pub const COMPARISON_STATS_FILE: &str = "metrics_to_compare_with_luzzu.csv";

/// How metrics are grouped in the over-time hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grouping {
    ByDimension,
    ByCategory,
    ByMetric,
}

impl Grouping {
    pub fn dir_name(self) -> &'static str {
        match self {
            Grouping::ByDimension => "by_dimension",
            Grouping::ByCategory => "by_category",
            Grouping::ByMetric => "by_metric",
        }
    }
}

/// `<root>/over_time/<granularity>/<grouping>`
pub fn over_time_dir(root: &Path, granularity: Granularity, grouping: Grouping) -> PathBuf {
    root.join("over_time")
        .join(granularity.dir_name())
        .join(grouping.dir_name())
}

/// Directory of the endpoint availability tables.
pub fn availability_dir(root: &Path) -> PathBuf {
    root.join("over_time").join(Grouping::ByMetric.dir_name())
}

pub fn punctual_dir(root: &Path) -> PathBuf {
    root.join("punctual")
}

/// File name used for a metric's table; `/` cannot appear in file names.
pub fn metric_file_name(metric: &str) -> String {
    format!("{}.csv", metric.replace('/', "-"))
}

fn write_frame(path: &Path, mut df: DataFrame) -> QualityResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_snapshot_csv(path, &mut df)
}

fn statistics_frame(label_header: &str, labels: Vec<String>, stats: &[SummaryStats]) -> QualityResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(7);
    columns.push(Column::new(label_header.into(), labels));
    for (idx, header) in STAT_HEADERS.iter().enumerate() {
        let values: Vec<Option<f64>> = stats.iter().map(|s| s.as_array()[idx]).collect();
        columns.push(Column::new((*header).into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

/// Write bucketed statistic rows labelled by date or period.
pub fn write_statistic_rows(path: &Path, rows: &[StatisticRow]) -> QualityResult<()> {
    let labels = rows.iter().map(|r| r.label.to_string()).collect();
    let stats: Vec<SummaryStats> = rows.iter().map(|r| r.stats).collect();
    write_frame(path, statistics_frame(DATE_HEADER, labels, &stats)?)
}

/// Write one statistic row per metric.
pub fn write_metric_summaries(path: &Path, rows: &[(String, SummaryStats)]) -> QualityResult<()> {
    let labels = rows.iter().map(|(m, _)| m.clone()).collect();
    let stats: Vec<SummaryStats> = rows.iter().map(|(_, s)| *s).collect();
    write_frame(path, statistics_frame(METRIC_HEADER, labels, &stats)?)
}

/// Read a statistic table back as `(label, summary)` pairs.
pub fn read_statistic_table(path: &Path) -> QualityResult<Vec<(String, SummaryStats)>> {
    let df = snapshot_parser::parse_snapshot_csv(path, None)?;
    let label_header = df
        .get_column_names()
        .first()
        .map(|s| s.to_string())
        .unwrap_or_else(|| DATE_HEADER.to_string());

    let labels = snapshot_parser::text_values(&df, &label_header)?;
    let mut columns = Vec::with_capacity(STAT_HEADERS.len());
    for header in STAT_HEADERS {
        columns.push(snapshot_parser::score_values(&df, header)?);
    }

    Ok(labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let stats = SummaryStats {
                min: columns[0][i],
                q1: columns[1][i],
                median: columns[2][i],
                q3: columns[3][i],
                max: columns[4][i],
                mean: columns[5][i],
            };
            (label.unwrap_or_default(), stats)
        })
        .collect())
}

/// Write a `(label, count)` table, e.g. availability classes.
pub fn write_count_table(
    path: &Path,
    label_header: &str,
    count_header: &str,
    rows: &[(String, usize)],
) -> QualityResult<()> {
    let labels: Vec<String> = rows.iter().map(|(l, _)| l.clone()).collect();
    let counts: Vec<u32> = rows.iter().map(|(_, c)| *c as u32).collect();
    let df = DataFrame::new(vec![
        Column::new(label_header.into(), labels),
        Column::new(count_header.into(), counts),
    ])?;
    write_frame(path, df)
}

/// Write a `(key, value)` table of numbers.
pub fn write_value_table(
    path: &Path,
    key_header: &str,
    value_header: &str,
    rows: &[(String, Option<f64>)],
) -> QualityResult<()> {
    let keys: Vec<String> = rows.iter().map(|(k, _)| k.clone()).collect();
    let values: Vec<Option<f64>> = rows.iter().map(|(_, v)| *v).collect();
    let df = DataFrame::new(vec![
        Column::new(key_header.into(), keys),
        Column::new(value_header.into(), values),
    ])?;
    write_frame(path, df)
}

/// Write `(statistic, value)` pairs; undefined values are written as `-`.
pub fn write_summary_table(path: &Path, rows: &[(String, Option<f64>)]) -> QualityResult<()> {
    let keys: Vec<String> = rows.iter().map(|(k, _)| k.clone()).collect();
    let values: Vec<String> = rows
        .iter()
        .map(|(_, v)| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()))
        .collect();
    let df = DataFrame::new(vec![
        Column::new("Statistic".into(), keys),
        Column::new("Value".into(), values),
    ])?;
    write_frame(path, df)
}

/// Write a table of percentage value → number of entities.
pub fn write_frequency_table(
    path: &Path,
    value_header: &str,
    count_header: &str,
    rows: &[(f64, usize)],
) -> QualityResult<()> {
    let values: Vec<f64> = rows.iter().map(|(v, _)| *v).collect();
    let counts: Vec<u32> = rows.iter().map(|(_, c)| *c as u32).collect();
    let df = DataFrame::new(vec![
        Column::new(value_header.into(), values),
        Column::new(count_header.into(), counts),
    ])?;
    write_frame(path, df)
}

/// Read a two-column numeric table written by [`write_frequency_table`].
pub fn read_frequency_table(path: &Path) -> QualityResult<Vec<(f64, usize)>> {
    let df = snapshot_parser::parse_snapshot_csv(path, None)?;
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    if names.len() < 2 {
        return Ok(Vec::new());
    }

    let values = snapshot_parser::score_values(&df, &names[0])?;
    let counts = snapshot_parser::score_values(&df, &names[1])?;
    Ok(values
        .into_iter()
        .zip(counts)
        .filter_map(|(v, c)| Some((v?, c? as usize)))
        .collect())
}
