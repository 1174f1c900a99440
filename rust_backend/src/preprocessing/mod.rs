pub mod augmenter;
pub mod pipeline;

pub use augmenter::{AugmentReport, CategoryAugmenter};
pub use pipeline::{EvaluationPipeline, ScopeReport, ScopeSelection, ALL_SCOPE};
