use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::error::QualityResult;
use crate::parsing::cells;

/// Parse a snapshot CSV into a DataFrame with every column read as text.
///
/// When `columns` is given only those columns are materialised; every name
/// must exist in the file (see [`read_header`]).
pub fn parse_snapshot_csv(path: &Path, columns: Option<&[String]>) -> QualityResult<DataFrame> {
    let mut options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0));

    if let Some(columns) = columns {
        let names: Arc<[PlSmallStr]> = columns
            .iter()
            .map(|c| PlSmallStr::from(c.as_str()))
            .collect();
        options = options.with_columns(Some(names));
    }

    let df = options
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(df)
}

/// Column names of a snapshot, read without materialising its rows.
pub fn read_header(path: &Path) -> QualityResult<Vec<String>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_n_rows(Some(1))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect())
}

/// Write a snapshot back to disk, replacing the file.
pub fn write_snapshot_csv(path: &Path, df: &mut DataFrame) -> QualityResult<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Trimmed text values of a column.
pub fn text_values(df: &DataFrame, name: &str) -> QualityResult<Vec<Option<String>>> {
    let column = df.column(name)?;
    if column.dtype() == &DataType::String {
        let values = column.str()?;
        return Ok(values
            .into_iter()
            .map(|v| v.map(|s| s.trim().to_string()))
            .collect());
    }

    let cast = column.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect())
}

/// Numeric values of a score column; undecodable cells are `None`.
pub fn score_values(df: &DataFrame, name: &str) -> QualityResult<Vec<Option<f64>>> {
    let column = df.column(name)?;
    if column.dtype() == &DataType::String {
        return Ok(column
            .str()?
            .into_iter()
            .map(cells::decode_score)
            .collect());
    }

    let cast = column.cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

/// Raw text of a column without trimming, for the structured-cell decoders.
pub fn raw_values(df: &DataFrame, name: &str) -> QualityResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}
