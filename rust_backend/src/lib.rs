//! Longitudinal quality statistics for LOD Cloud knowledge graphs.
//!
//! The crate reads the dated CSV snapshots produced by a KG quality analyzer
//! and derives:
//!
//! - per-metric distribution statistics over time ([`services::trends`])
//! - category scores from groups of quality dimensions ([`preprocessing::augmenter`])
//! - a classification of SPARQL endpoint availability ([`algorithms::availability`])
//! - chart descriptions of the resulting tables ([`charts`])

pub mod algorithms;
pub mod charts;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod parsing;
pub mod preprocessing;
pub mod services;
pub mod time;
pub mod transformations;

pub use error::{QualityError, QualityResult};
