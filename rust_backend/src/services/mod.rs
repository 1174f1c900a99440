//! Statistics and reference-data services.
//!
//! - [`statistics`]: quantile summaries of score values
//! - [`trends`]: per-metric statistics over the snapshot timeline
//! - [`membership`]: LOD Cloud dataset list and topic map

pub mod membership;
pub mod statistics;
pub mod trends;


pub use membership::{ReferenceList, TopicMap};
pub use statistics::{compute_summary, sample_std_dev};
pub use trends::{MetricSource, TrendsEngine};
