//! Parsers for the analyzer's snapshot tables and the LOD Cloud diagrams.
//!
//! # Parsers
//!
//! - [`snapshot_parser`]: Read and write snapshot CSV files as text-typed DataFrames
//! - [`cells`]: Lenient decoders for score, list and annotated-number cells
//! - [`topic_svg`]: Extract dataset links from topic diagrams
//!
//! # Example
//!
//! ```no_run
//! use kgq_rust::parsing::snapshot_parser::{parse_snapshot_csv, score_values};
//! use std::path::Path;
//!
//! let df = parse_snapshot_csv(Path::new("2024-05-12.csv"), None)
//!     .expect("Failed to parse snapshot");
//! let scores = score_values(&df, "Accuracy score").expect("Missing column");
//! ```

pub mod cells;
pub mod snapshot_parser;
pub mod topic_svg;


pub use topic_svg::{entity_id_from_link, extract_topic_links, topic_from_url};
