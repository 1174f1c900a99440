use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::algorithms::availability::{classify, swing, AvailabilityClass, StatusHistory};
use crate::charts::{ChartPlanner, ChartRenderer, PlanSummary};
use crate::config::AnalysisConfig;
use crate::core::domain::Timeline;
use crate::io::tables::{self, Grouping};
use crate::io::SnapshotLoader;
use crate::preprocessing::augmenter::CategoryAugmenter;
use crate::services::membership::{ReferenceList, TopicMap};
use crate::services::trends::{MetricSource, TrendsEngine};
use crate::time::Granularity;
use crate::transformations::filtering::{filter_snapshot_dir, partition_by_topic};

/// Scope name of the whole LOD Cloud corpus.
pub const ALL_SCOPE: &str = "all";

/// Which scopes a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeSelection {
    #[default]
    Everything,
    WholeCorpus,
    TopicsOnly,
}

/// Result of evaluating one scope
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeReport {
    pub scope: String,
    pub snapshots: usize,
    pub tables_written: usize,
    pub classes: Vec<(AvailabilityClass, usize)>,
    pub swing_aggregate: Option<f64>,
}

/// Runs the filtering, evaluation and charting stages over the configured layout.
pub struct EvaluationPipeline {
    config: AnalysisConfig,
}

impl EvaluationPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Scope names of a selection, the whole corpus first.
    pub fn scopes(&self, selection: ScopeSelection) -> Vec<String> {
        let mut scopes = Vec::new();
        if selection != ScopeSelection::TopicsOnly {
            scopes.push(ALL_SCOPE.to_string());
        }
        if selection != ScopeSelection::WholeCorpus {
            scopes.extend(self.config.topics.iter().cloned());
        }
        scopes
    }

    /// Keep only LOD Cloud KGs, then split them by topic.
    pub fn filter_corpus(&self) -> Result<()> {
        let paths = &self.config.paths;
        let entity = &self.config.columns.entity;

        let reference = ReferenceList::fetch_or_fallback(
            &self.config.sources.reference_url,
            &paths.reference_fallback,
        )
        .context("Failed to load the LOD Cloud dataset list")?;
        let report = filter_snapshot_dir(
            &paths.raw_snapshots,
            &self.config.snapshot_dir(ALL_SCOPE),
            reference.identifiers(),
            entity,
        )
        .context("Failed to filter the analyzed snapshots")?;
        info!("Kept {} rows of LOD Cloud KGs", report.rows_kept);

        let topics = TopicMap::fetch_or_load(&self.config.sources.topic_diagram_urls, &paths.topic_map)
            .context("Failed to load the topic map")?;
        for (topic, report) in partition_by_topic(&paths.raw_snapshots, &paths.filtered_root, &topics, entity)
            .context("Failed to split the snapshots by topic")?
        {
            for (file, missing) in &report.missing {
                info!("Topic {}: {} KGs not analyzed in {}", topic, missing, file);
            }
        }
        Ok(())
    }

    /// Evaluate one configured scope.
    pub fn evaluate_scope(&self, scope: &str) -> Result<ScopeReport> {
        info!("Running evaluation for {}", scope);
        self.evaluate_dir(
            scope,
            &self.config.snapshot_dir(scope),
            &self.config.evaluation_dir(scope),
        )
    }

    /// Evaluate the snapshots of `snapshot_dir`, writing tables under `out_dir`.
    pub fn evaluate_dir(&self, scope: &str, snapshot_dir: &Path, out_dir: &Path) -> Result<ScopeReport> {
        let timeline = SnapshotLoader::discover(snapshot_dir)
            .with_context(|| format!("Failed to load snapshots of {}", scope))?;
        if timeline.is_empty() {
            warn!("No snapshots found in {}", snapshot_dir.display());
        }
        let engine = TrendsEngine::new(timeline.clone(), &self.config);
        let mut written = 0usize;

        let dimensions: Vec<MetricSource> = self
            .config
            .metrics
            .dimensions
            .iter()
            .map(|m| MetricSource::column(m))
            .collect();
        written += self.write_punctual(&engine, &dimensions, true, out_dir, tables::DIMENSIONS_STATS_FILE)?;

        let comparison: Vec<MetricSource> = self
            .config
            .metrics
            .comparison
            .iter()
            .map(|m| MetricSource::column(m))
            .collect();
        written += self.write_punctual(&engine, &comparison, false, out_dir, tables::COMPARISON_STATS_FILE)?;

        let mut by_metric: Vec<MetricSource> = self
            .config
            .metrics
            .by_metric
            .iter()
            .map(|m| MetricSource::column(m))
            .collect();
        by_metric.push(MetricSource::Provenance);
        by_metric.push(MetricSource::ExtensionalConciseness);
        written += self.write_over_time(&engine, &by_metric, &[Granularity::None], Grouping::ByMetric, false, out_dir)?;

        let (classes, swing_aggregate, availability_tables) = self.write_availability(&timeline, out_dir)?;
        written += availability_tables;

        let augmenter = CategoryAugmenter::from_config(&self.config)?;
        augmenter
            .augment_timeline(&timeline)
            .with_context(|| format!("Failed to add category scores to {}", scope))?;

        let categories: Vec<MetricSource> = augmenter
            .taxonomy()
            .names()
            .into_iter()
            .map(|name| MetricSource::column(&name))
            .collect();
        written += self.write_over_time(&engine, &categories, &Granularity::ALL, Grouping::ByCategory, true, out_dir)?;
        written += self.write_punctual(&engine, &categories, true, out_dir, tables::CATEGORIES_STATS_FILE)?;
        written += self.write_over_time(&engine, &dimensions, &Granularity::ALL, Grouping::ByDimension, true, out_dir)?;

        info!("Wrote {} tables for {}", written, scope);
        Ok(ScopeReport {
            scope: scope.to_string(),
            snapshots: timeline.len(),
            tables_written: written,
            classes,
            swing_aggregate,
        })
    }

    fn write_punctual(
        &self,
        engine: &TrendsEngine,
        sources: &[MetricSource],
        restrict_to_reachable: bool,
        out_dir: &Path,
        file: &str,
    ) -> Result<usize> {
        let rows: Vec<_> = engine
            .punctual_stats(sources, restrict_to_reachable)?
            .into_iter()
            .map(|(metric, row)| (metric, row.stats))
            .collect();
        let path = tables::punctual_dir(out_dir).join(file);
        tables::write_metric_summaries(&path, &rows)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(1)
    }

    fn write_over_time(
        &self,
        engine: &TrendsEngine,
        sources: &[MetricSource],
        granularities: &[Granularity],
        grouping: Grouping,
        restrict_to_reachable: bool,
        out_dir: &Path,
    ) -> Result<usize> {
        let mut written = 0;
        for &granularity in granularities {
            let dir = tables::over_time_dir(out_dir, granularity, grouping);
            for source in sources {
                let rows = engine
                    .compute_source_stats(source, granularity, restrict_to_reachable)
                    .with_context(|| format!("Failed to evaluate {}", source.name()))?;
                let path = dir.join(tables::metric_file_name(&source.name()));
                tables::write_statistic_rows(&path, &rows)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                written += 1;
            }
        }
        Ok(written)
    }

    fn write_availability(
        &self,
        timeline: &Timeline,
        out_dir: &Path,
    ) -> Result<(Vec<(AvailabilityClass, usize)>, Option<f64>, usize)> {
        let history = StatusHistory::from_timeline(timeline, &self.config.columns)
            .context("Failed to collect endpoint statuses")?;
        let classification = classify(&history, &self.config.window);
        let report = swing(&history, &classification);
        let counts = classification.counts();
        let dir = tables::availability_dir(out_dir);

        let count_rows: Vec<(String, usize)> = counts
            .iter()
            .map(|(class, n)| (class.label().to_string(), *n))
            .collect();
        tables::write_count_table(&dir.join(tables::STATUS_COUNTS_FILE), "Status", "Count", &count_rows)?;

        let percentages: Vec<(String, Option<f64>)> = report
            .percentages
            .iter()
            .map(|(id, pct)| (id.clone(), Some(*pct)))
            .collect();
        tables::write_value_table(
            &dir.join(tables::ALTERNATING_FILE),
            &self.config.columns.entity,
            "Percentage of availability",
            &percentages,
        )?;
        tables::write_frequency_table(
            &dir.join(tables::AVAILABILITY_FREQUENCY_FILE),
            "Percentage of availability",
            "Number of KGs",
            &report.frequencies(),
        )?;
        tables::write_summary_table(&dir.join(tables::SWING_SUMMARY_FILE), &report.summary_rows())?;

        Ok((counts, report.aggregate, 4))
    }

    /// Render the charts of one scope with `renderer`.
    pub fn render_charts<R: ChartRenderer>(&self, scope: &str, renderer: R) -> PlanSummary {
        self.charts_for(renderer, self.config.evaluation_dir(scope), self.config.charts_dir(scope))
    }

    pub fn charts_for<R: ChartRenderer>(&self, renderer: R, tables_dir: PathBuf, charts_dir: PathBuf) -> PlanSummary {
        ChartPlanner::new(renderer, tables_dir, charts_dir).render_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes() {
        let pipeline = EvaluationPipeline::new(AnalysisConfig::default());
        assert_eq!(pipeline.scopes(ScopeSelection::WholeCorpus), vec!["all"]);

        let scopes = pipeline.scopes(ScopeSelection::Everything);
        assert_eq!(scopes.len(), 10);
        assert_eq!(scopes[0], "all");
        assert!(scopes.contains(&"life-sciences".to_string()));

        let topics = pipeline.scopes(ScopeSelection::TopicsOnly);
        assert_eq!(topics.len(), 9);
        assert!(!topics.contains(&"all".to_string()));
    }
}
