//! Core domain models for snapshot-based quality analysis.
//!
//! This module defines the snapshot timeline, endpoint reachability states and
//! the statistic rows shared by the loader, the statistics engine and the
//! output writers.

pub mod domain;

pub use domain::{
    BucketLabel, ReachabilityStatus, Snapshot, SnapshotFile, StatisticRow, SummaryStats, Timeline,
};
