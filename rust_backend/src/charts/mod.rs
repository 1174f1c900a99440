//! Chart descriptions of the evaluation tables.
//!
//! Charts are described as [`ChartSpec`] values and handed to a
//! [`ChartRenderer`]. [`JsonChartRenderer`] writes each description as a JSON
//! document that a plotting front-end can draw. [`ChartPlanner`] decides which
//! charts to produce from the tables of one scope.

pub mod json;
pub mod planner;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::QualityError;

pub use json::JsonChartRenderer;
pub use planner::{ChartPlanner, PlanSummary};

/// Failure to render one chart.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Bubble sizes span an invalid range ({min} to {max})")]
    DegenerateSizeRange { min: f64, max: f64 },

    #[error("Chart '{0}' has no data")]
    NoData(String),

    #[error("Cannot read chart input: {0}")]
    Input(#[from] QualityError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Five-number summary drawn as one box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    /// Position on the x axis (a date, a period or a metric).
    pub x: String,
    /// Series the box belongs to in a grouped boxplot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubblePoint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// Description of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Boxplot {
        title: String,
        x_label: String,
        y_label: String,
        y_range: (f64, f64),
        boxes: Vec<BoxSpec>,
    },
    Bubble {
        title: String,
        x_label: String,
        y_label: String,
        size_range: (f64, f64),
        points: Vec<BubblePoint>,
    },
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Boxplot { title, .. } | ChartSpec::Bubble { title, .. } => title,
        }
    }
}

/// Draws chart descriptions to files.
pub trait ChartRenderer {
    /// Render `chart` to `output` (without extension); returns the written path.
    fn render(&self, chart: &ChartSpec, output: &Path) -> Result<PathBuf, RenderError>;
}

/// Name shown for a metric in chart titles.
pub fn display_name(metric: &str) -> String {
    match metric {
        "Representational-Consistency score" => "Interoperability score".to_string(),
        "Volatility score" => "Timeliness score".to_string(),
        other => other.to_string(),
    }
}

/// Short legend name of a metric in combined boxplots.
pub fn short_name(metric: &str) -> String {
    let first = metric.split(' ').next().unwrap_or(metric);
    match first {
        "Representational-Consistency" => "Interoperability",
        "Representational-Conciseness" => "Rep.-Conc.",
        "Understandability" => "Underst.",
        "Volatility" => "Timeliness",
        "Amount" => "Amount of data",
        "Dataset" => "Dataset dynamicity",
        other => other,
    }
    .to_string()
}
