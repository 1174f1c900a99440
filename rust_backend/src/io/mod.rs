//! Snapshot discovery and output table I/O.
//!
//! [`loaders`] turns a directory of dated analyzer CSV files into a
//! [`Timeline`](crate::core::Timeline) and reads constrained column subsets;
//! [`tables`] writes and reads the statistic and classification tables of a run.
//!
//! # Example
//!
//! ```no_run
//! use kgq_rust::io::SnapshotLoader;
//! use std::path::Path;
//!
//! let timeline = SnapshotLoader::discover(Path::new("data/quality_data/only_from_LODC/all"))
//!     .expect("Failed to discover snapshots");
//! println!("Loaded {} snapshots", timeline.len());
//! ```

pub mod loaders;
pub mod tables;


pub use loaders::{list_csv_files, parse_snapshot_date, SnapshotLoader};
