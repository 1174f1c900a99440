//! Analysis configuration file support.
//!
//! Every process-wide constant of an evaluation run (column names, the
//! category taxonomy, metric cutovers, the classification window, input and
//! output locations) lives in [`AnalysisConfig`]. The configuration is read
//! once, validated, and passed explicitly to the components that need it.

pub mod taxonomy;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{QualityError, QualityResult};

pub use taxonomy::{default_categories, Category, CategoryTaxonomy};

const CONFIG_SEARCH_PATHS: [&str; 3] = [
    "analysis.toml",
    "rust_backend/analysis.toml",
    "../analysis.toml",
];

/// Top-level configuration of an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub columns: ColumnSettings,
    #[serde(default)]
    pub window: ObservationWindow,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    #[serde(default = "default_metric_policies")]
    pub metric_policies: Vec<MetricPolicy>,
    #[serde(default)]
    pub metrics: MetricSettings,
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub sources: SourceSettings,
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
}

/// Column names of the analyzer's snapshot tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSettings {
    #[serde(default = "default_entity_column")]
    pub entity: String,
    #[serde(default = "default_status_column")]
    pub status: String,
    #[serde(default = "default_author_column")]
    pub author: String,
    #[serde(default = "default_publisher_column")]
    pub publisher: String,
    #[serde(default = "default_conciseness_column")]
    pub extensional_conciseness: String,
}

fn default_entity_column() -> String {
    "KG id".to_string()
}

fn default_status_column() -> String {
    "Sparql endpoint".to_string()
}

fn default_author_column() -> String {
    "Author (metadata)".to_string()
}

fn default_publisher_column() -> String {
    "Publisher".to_string()
}

fn default_conciseness_column() -> String {
    "Extensional conciseness".to_string()
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            entity: default_entity_column(),
            status: default_status_column(),
            author: default_author_column(),
            publisher: default_publisher_column(),
            extensional_conciseness: default_conciseness_column(),
        }
    }
}

/// Inclusive date window used to classify endpoint availability.
///
/// The window is the same for every entity, even for entities that were only
/// analysed for part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ObservationWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl Default for ObservationWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 3, 17).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap_or_default(),
        }
    }
}

/// A metric whose values are only comparable after a given date.
///
/// Snapshots dated on or before `valid_after` are ignored for that metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPolicy {
    pub metric: String,
    pub valid_after: NaiveDate,
}

fn default_metric_policies() -> Vec<MetricPolicy> {
    // The analyzer changed the understandability formula on this date.
    vec![MetricPolicy {
        metric: "Understandability score".to_string(),
        valid_after: NaiveDate::from_ymd_opt(2024, 5, 5).unwrap_or_default(),
    }]
}

/// Metric lists evaluated by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSettings {
    #[serde(default = "default_dimensions")]
    pub dimensions: Vec<String>,
    #[serde(default = "default_by_metric")]
    pub by_metric: Vec<String>,
    #[serde(default = "default_comparison_metrics")]
    pub comparison: Vec<String>,
}

fn default_dimensions() -> Vec<String> {
    [
        "Availability score",
        "Licensing score",
        "Interlinking score",
        "Performance score",
        "Accuracy score",
        "Consistency score",
        "Conciseness score",
        "Verifiability score",
        "Reputation score",
        "Believability score",
        "Currency score",
        "Volatility score",
        "Completeness score",
        "Amount of data score",
        "Representational-Consistency score",
        "Representational-Conciseness score",
        "Understandability score",
        "Interpretability score",
        "Versatility score",
        "Security score",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_by_metric() -> Vec<String> {
    [
        "Entities as member of disjoint class",
        "Invalid usage of inverse-functional properties",
        "Deprecated classes/properties used",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_comparison_metrics() -> Vec<String> {
    ["U1-value", "CS2-value", "IN3-value", "RC1-value", "RC2-value", "N4-value"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
            by_metric: default_by_metric(),
            comparison: default_comparison_metrics(),
        }
    }
}

/// Filesystem layout of inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Unfiltered analyzer output, one CSV per date.
    #[serde(default = "default_raw_snapshots")]
    pub raw_snapshots: PathBuf,
    /// Root of the filtered snapshots; one sub-directory per scope.
    #[serde(default = "default_filtered_root")]
    pub filtered_root: PathBuf,
    #[serde(default = "default_evaluation_root")]
    pub evaluation_root: PathBuf,
    #[serde(default = "default_charts_root")]
    pub charts_root: PathBuf,
    /// Bundled copy of the LOD Cloud dataset list.
    #[serde(default = "default_reference_fallback")]
    pub reference_fallback: PathBuf,
    #[serde(default = "default_topic_map")]
    pub topic_map: PathBuf,
}

fn default_raw_snapshots() -> PathBuf {
    PathBuf::from("data/quality_data/all_kgs_analyzed")
}

fn default_filtered_root() -> PathBuf {
    PathBuf::from("data/quality_data/only_from_LODC")
}

fn default_evaluation_root() -> PathBuf {
    PathBuf::from("data/evaluation_results")
}

fn default_charts_root() -> PathBuf {
    PathBuf::from("charts")
}

fn default_reference_fallback() -> PathBuf {
    PathBuf::from("data/lodcloud.json")
}

fn default_topic_map() -> PathBuf {
    PathBuf::from("data/kgs_by_topic.json")
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            raw_snapshots: default_raw_snapshots(),
            filtered_root: default_filtered_root(),
            evaluation_root: default_evaluation_root(),
            charts_root: default_charts_root(),
            reference_fallback: default_reference_fallback(),
            topic_map: default_topic_map(),
        }
    }
}

/// Remote reference documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default = "default_reference_url")]
    pub reference_url: String,
    #[serde(default = "default_topic_diagram_urls")]
    pub topic_diagram_urls: Vec<String>,
}

fn default_reference_url() -> String {
    "https://lod-cloud.net/versions/latest/lod-data.json".to_string()
}

fn default_topics() -> Vec<String> {
    [
        "cross-domain",
        "geography",
        "government",
        "life-sciences",
        "linguistic",
        "media",
        "publications",
        "social-networking",
        "user-generated",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_topic_diagram_urls() -> Vec<String> {
    default_topics()
        .iter()
        .map(|t| format!("https://lod-cloud.net/versions/latest/{}-lod.svg", t))
        .collect()
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            reference_url: default_reference_url(),
            topic_diagram_urls: default_topic_diagram_urls(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            columns: ColumnSettings::default(),
            window: ObservationWindow::default(),
            categories: default_categories(),
            metric_policies: default_metric_policies(),
            metrics: MetricSettings::default(),
            paths: PathSettings::default(),
            sources: SourceSettings::default(),
            topics: default_topics(),
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> QualityResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            QualityError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> QualityResult<Self> {
        let config: AnalysisConfig = toml::from_str(content)
            .map_err(|e| QualityError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from the default location.
    ///
    /// Searches for `analysis.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    ///
    /// Returns `Ok(None)` when no file exists; a file that exists but fails to
    /// parse or validate is an error.
    pub fn from_default_location() -> QualityResult<Option<Self>> {
        Self::search_from(Path::new("."))
    }

    /// Same search as [`from_default_location`](Self::from_default_location),
    /// relative to `base`.
    pub fn search_from(base: &Path) -> QualityResult<Option<Self>> {
        for relative in CONFIG_SEARCH_PATHS {
            let path = base.join(relative);
            if path.is_file() {
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Check the invariants the components rely on.
    pub fn validate(&self) -> QualityResult<()> {
        if self.window.start > self.window.end {
            return Err(QualityError::Config(format!(
                "Observation window starts after it ends ({} > {})",
                self.window.start, self.window.end
            )));
        }
        if self.columns.entity.trim().is_empty() || self.columns.status.trim().is_empty() {
            return Err(QualityError::Config(
                "Entity and status column names must not be empty".to_string(),
            ));
        }
        self.taxonomy().map(|_| ())
    }

    /// The validated category taxonomy.
    pub fn taxonomy(&self) -> QualityResult<CategoryTaxonomy> {
        CategoryTaxonomy::new(self.categories.clone())
    }

    /// Cutover date configured for `metric`, if any.
    pub fn valid_after(&self, metric: &str) -> Option<NaiveDate> {
        self.metric_policies
            .iter()
            .find(|p| p.metric == metric)
            .map(|p| p.valid_after)
    }

    /// Directory holding the filtered snapshots of one scope.
    pub fn snapshot_dir(&self, scope: &str) -> PathBuf {
        self.paths.filtered_root.join(scope)
    }

    /// Directory receiving the evaluation tables of one scope.
    pub fn evaluation_dir(&self, scope: &str) -> PathBuf {
        self.paths.evaluation_root.join(scope)
    }

    /// Directory receiving the charts of one scope.
    pub fn charts_dir(&self, scope: &str) -> PathBuf {
        self.paths.charts_root.join(scope)
    }
}
