//! Snapshot scoping transformations.
//!
//! Snapshots are rewritten to keep only the KGs of a reference list, either
//! the whole LOD Cloud or one of its topics.
//!
//! # Example
//!
//! ```no_run
//! use kgq_rust::transformations::filter_snapshot_dir;
//! use std::collections::HashSet;
//! use std::path::Path;
//!
//! # fn example() -> kgq_rust::error::QualityResult<()> {
//! let ids: HashSet<String> = ["dbpedia".to_string()].into_iter().collect();
//! let report = filter_snapshot_dir(Path::new("raw"), Path::new("filtered/all"), &ids, "KG id")?;
//! println!("kept {} rows", report.rows_kept);
//! # Ok(())
//! # }
//! ```

pub mod filtering;

pub use filtering::{
    filter_frame, filter_snapshot, filter_snapshot_dir, partition_by_topic, FilterReport,
};
