//! Calendar bucketing of the snapshot timeline.

pub mod buckets;

pub use buckets::{bucket_timeline, Bucket, Granularity};
