//! Classification algorithms over the snapshot timeline.
//!
//! - [`availability`]: endpoint availability classes and swing percentages

pub mod availability;

pub use availability::{
    classify, swing, AvailabilityClass, Classification, StatusHistory, SwingReport,
};
