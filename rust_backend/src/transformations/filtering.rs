use log::{debug, info};
use polars::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{QualityError, QualityResult};
use crate::io::list_csv_files;
use crate::parsing::snapshot_parser;
use crate::services::membership::TopicMap;

/// Outcome of filtering one snapshot directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub files: usize,
    pub rows_kept: usize,
    /// Per file, how many wanted ids it does not contain.
    pub missing: Vec<(String, usize)>,
}

/// Keep the rows of a DataFrame whose trimmed entity id is in `ids`.
///
/// The entity column is rewritten trimmed. Returns the filtered frame and
/// the number of wanted ids absent from the input.
pub fn filter_frame(
    df: &DataFrame,
    ids: &HashSet<String>,
    entity_col: &str,
) -> QualityResult<(DataFrame, usize)> {
    let entities = snapshot_parser::text_values(df, entity_col)?;

    let present: HashSet<&str> = entities.iter().flatten().map(String::as_str).collect();
    let missing = ids.iter().filter(|id| !present.contains(id.as_str())).count();

    let mask: BooleanChunked = entities
        .iter()
        .map(|id| id.as_deref().is_some_and(|id| ids.contains(id)))
        .collect();

    let mut trimmed = df.clone();
    trimmed.with_column(Series::new(entity_col.into(), entities))?;
    Ok((trimmed.filter(&mask)?, missing))
}

/// Filter one snapshot file into `output`.
pub fn filter_snapshot(
    input: &Path,
    output: &Path,
    ids: &HashSet<String>,
    entity_col: &str,
) -> QualityResult<(usize, usize)> {
    let df = snapshot_parser::parse_snapshot_csv(input, None)?;
    if !df.get_column_names().iter().any(|c| c.as_str() == entity_col) {
        return Err(QualityError::SchemaMismatch {
            file: input.to_path_buf(),
            missing: vec![entity_col.to_string()],
        });
    }

    let (mut filtered, missing) = filter_frame(&df, ids, entity_col)?;
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    snapshot_parser::write_snapshot_csv(output, &mut filtered)?;
    Ok((filtered.height(), missing))
}

/// Rewrite every CSV of `input_dir` into `output_dir`, keeping only the
/// rows of the wanted KGs. File names are preserved.
pub fn filter_snapshot_dir(
    input_dir: &Path,
    output_dir: &Path,
    ids: &HashSet<String>,
    entity_col: &str,
) -> QualityResult<FilterReport> {
    let mut report = FilterReport::default();
    for input in list_csv_files(input_dir)? {
        let Some(name) = input.file_name() else {
            continue;
        };
        let name = name.to_string_lossy().to_string();
        let (kept, missing) = filter_snapshot(&input, &output_dir.join(&name), ids, entity_col)?;
        debug!("{}: kept {} rows, {} KGs not analyzed", name, kept, missing);

        report.files += 1;
        report.rows_kept += kept;
        report.missing.push((name, missing));
    }

    info!(
        "Filtered {} snapshots from {} into {}",
        report.files,
        input_dir.display(),
        output_dir.display()
    );
    Ok(report)
}

/// Write one filtered copy of the snapshots per topic, under
/// `<output_root>/<topic>/`.
pub fn partition_by_topic(
    input_dir: &Path,
    output_root: &Path,
    topics: &TopicMap,
    entity_col: &str,
) -> QualityResult<BTreeMap<String, FilterReport>> {
    let mut reports = BTreeMap::new();
    for topic in topics.topics() {
        info!("Splitting snapshots for topic {}", topic);
        let report = filter_snapshot_dir(
            input_dir,
            &output_root.join(topic),
            &topics.ids(topic),
            entity_col,
        )?;
        reports.insert(topic.to_string(), report);
    }
    Ok(reports)
}
