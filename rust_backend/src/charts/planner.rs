use log::{info, warn};
use std::path::{Path, PathBuf};

use super::{display_name, short_name, BoxSpec, BubblePoint, ChartRenderer, ChartSpec, RenderError};
use crate::core::domain::SummaryStats;
use crate::io::list_csv_files;
use crate::io::tables::{self, Grouping};
use crate::time::Granularity;

/// Scores live in [0, 1]; the top margin keeps boxes at 1 visible.
const SCORE_RANGE: (f64, f64) = (0.0, 1.009);
const BUBBLE_SCALE: f64 = 4.0;

/// Charts written and charts that failed in one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanSummary {
    pub rendered: Vec<PathBuf>,
    pub failed: usize,
}

impl PlanSummary {
    fn record(&mut self, name: &str, result: Result<PathBuf, RenderError>) {
        match result {
            Ok(path) => self.rendered.push(path),
            Err(e) => {
                warn!("Chart {} not rendered: {}", name, e);
                self.failed += 1;
            }
        }
    }
}

fn to_box(x: String, series: Option<String>, stats: &SummaryStats) -> Option<BoxSpec> {
    Some(BoxSpec {
        x,
        series,
        min: stats.min?,
        q1: stats.q1?,
        median: stats.median?,
        q3: stats.q3?,
        max: stats.max?,
    })
}

fn table_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Plans and renders the charts of one scope's evaluation tables.
pub struct ChartPlanner<R> {
    renderer: R,
    tables_dir: PathBuf,
    charts_dir: PathBuf,
}

impl<R: ChartRenderer> ChartPlanner<R> {
    pub fn new(renderer: R, tables_dir: impl Into<PathBuf>, charts_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            tables_dir: tables_dir.into(),
            charts_dir: charts_dir.into(),
        }
    }

    fn over_time_tables(&self, granularity: Granularity, grouping: Grouping) -> Result<Vec<PathBuf>, RenderError> {
        Ok(list_csv_files(&tables::over_time_dir(&self.tables_dir, granularity, grouping))?)
    }

    /// One boxplot per metric table; x is the bucket label.
    pub fn over_time_boxplots(
        &self,
        granularity: Granularity,
        grouping: Grouping,
    ) -> Vec<(String, Result<PathBuf, RenderError>)> {
        let files = match self.over_time_tables(granularity, grouping) {
            Ok(files) => files,
            Err(e) => return vec![(grouping.dir_name().to_string(), Err(e))],
        };

        files
            .iter()
            .map(|file| {
                let title = display_name(&table_stem(file));
                let result = self.over_time_boxplot(file, granularity, grouping, &title);
                (title, result)
            })
            .collect()
    }

    fn over_time_boxplot(
        &self,
        file: &Path,
        granularity: Granularity,
        grouping: Grouping,
        title: &str,
    ) -> Result<PathBuf, RenderError> {
        let boxes = tables::read_statistic_table(file)?
            .iter()
            .filter_map(|(label, stats)| to_box(label.clone(), None, stats))
            .collect();
        let chart = ChartSpec::Boxplot {
            title: title.to_string(),
            x_label: "Date".to_string(),
            y_label: "Values".to_string(),
            y_range: SCORE_RANGE,
            boxes,
        };
        let output = tables::over_time_dir(&self.charts_dir, granularity, grouping).join(title);
        self.renderer.render(&chart, &output)
    }

    /// All metrics of a grouping in one chart, one series per metric.
    pub fn combined_boxplot(
        &self,
        granularity: Granularity,
        grouping: Grouping,
        title: &str,
        name: &str,
    ) -> Result<PathBuf, RenderError> {
        let mut boxes = Vec::new();
        for file in self.over_time_tables(granularity, grouping)? {
            let series = short_name(&table_stem(&file));
            for (label, stats) in tables::read_statistic_table(&file)? {
                boxes.extend(to_box(label, Some(series.clone()), &stats));
            }
        }
        let chart = ChartSpec::Boxplot {
            title: title.to_string(),
            x_label: "Analysis Date".to_string(),
            y_label: "Value".to_string(),
            y_range: SCORE_RANGE,
            boxes,
        };
        let output = tables::over_time_dir(&self.charts_dir, granularity, grouping).join(name);
        self.renderer.render(&chart, &output)
    }

    /// One box per metric of a punctual statistic table.
    pub fn punctual_boxplot(&self, table: &str, name: &str, x_label: &str) -> Result<PathBuf, RenderError> {
        let path = tables::punctual_dir(&self.tables_dir).join(table);
        let boxes = tables::read_statistic_table(&path)?
            .iter()
            .filter_map(|(metric, stats)| to_box(display_name(metric), None, stats))
            .collect();
        let chart = ChartSpec::Boxplot {
            title: format!("Quality {} Evaluation", x_label),
            x_label: x_label.to_string(),
            y_label: "Values".to_string(),
            y_range: SCORE_RANGE,
            boxes,
        };
        self.renderer
            .render(&chart, &tables::punctual_dir(&self.charts_dir).join(name))
    }

    /// Bubble chart of how many alternating KGs share each availability percentage.
    pub fn availability_bubble(&self) -> Result<PathBuf, RenderError> {
        let path = tables::availability_dir(&self.tables_dir).join(tables::AVAILABILITY_FREQUENCY_FILE);
        let points: Vec<BubblePoint> = tables::read_frequency_table(&path)?
            .into_iter()
            .map(|(pct, count)| BubblePoint {
                x: pct,
                y: count as f64,
                size: count as f64 * BUBBLE_SCALE,
            })
            .collect();

        let min = points.iter().map(|p| p.size).fold(f64::INFINITY, f64::min);
        let max = points.iter().map(|p| p.size).fold(f64::NEG_INFINITY, f64::max);
        let chart = ChartSpec::Bubble {
            title: "Availability of alternating SPARQL endpoints".to_string(),
            x_label: "Percentage of Availability".to_string(),
            y_label: "Number of KGs".to_string(),
            size_range: (min, max),
            points,
        };
        self.renderer.render(
            &chart,
            &tables::availability_dir(&self.charts_dir).join("availability_sparql_over_time"),
        )
    }

    /// Render every chart of the scope. Failures are logged and skipped.
    pub fn render_all(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();

        for grouping in [Grouping::ByDimension, Grouping::ByCategory] {
            for (name, result) in self.over_time_boxplots(Granularity::Monthly, grouping) {
                summary.record(&name, result);
            }
        }
        summary.record(
            "category_score_over_time_quarterly",
            self.combined_boxplot(
                Granularity::Quarterly,
                Grouping::ByCategory,
                "Quality by category",
                "category_score_over_time_quarterly",
            ),
        );
        summary.record(
            "quality_dimensions",
            self.punctual_boxplot(tables::DIMENSIONS_STATS_FILE, "quality_dimensions", "Dimension"),
        );
        summary.record(
            "quality_categories",
            self.punctual_boxplot(tables::CATEGORIES_STATS_FILE, "quality_categories", "Category"),
        );
        summary.record("availability_sparql_over_time", self.availability_bubble());

        info!(
            "Rendered {} charts into {} ({} failed)",
            summary.rendered.len(),
            self.charts_dir.display(),
            summary.failed
        );
        summary
    }
}
