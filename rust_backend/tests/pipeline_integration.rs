//! End-to-end tests of the evaluation pipeline on a small snapshot corpus.
//!
//! The corpus has three monthly snapshots and three LOD Cloud KGs:
//! - `always-up`: endpoint available in every snapshot
//! - `swinging`: available, offline, available
//! - `always-down`: offline in every snapshot

use std::fs;
use std::path::Path;

use kgq_rust::algorithms::AvailabilityClass;
use kgq_rust::charts::JsonChartRenderer;
use kgq_rust::config::AnalysisConfig;
use kgq_rust::io::tables::{self, Grouping};
use kgq_rust::preprocessing::EvaluationPipeline;
use kgq_rust::services::ReferenceList;
use kgq_rust::time::Granularity;
use kgq_rust::transformations::filter_snapshot_dir;
use tempfile::TempDir;

// ==================== Helper Functions ====================

fn header(config: &AnalysisConfig) -> Vec<String> {
    let mut columns = vec![
        config.columns.entity.clone(),
        config.columns.status.clone(),
        config.columns.author.clone(),
        config.columns.publisher.clone(),
        config.columns.extensional_conciseness.clone(),
    ];
    columns.extend(config.metrics.dimensions.iter().cloned());
    columns.extend(config.metrics.by_metric.iter().cloned());
    columns.push("U1-value".to_string());
    columns
}

fn row(config: &AnalysisConfig, id: &str, status: &str, score: f64) -> Vec<String> {
    let mut cells = vec![
        id.to_string(),
        status.to_string(),
        "False".to_string(),
        "-".to_string(),
        format!("{} (1/2)", score),
    ];
    let metrics = config.metrics.dimensions.len() + config.metrics.by_metric.len() + 1;
    cells.extend((0..metrics).map(|_| score.to_string()));
    cells
}

fn write_snapshot(dir: &Path, date: &str, rows: &[Vec<String>], header: &[String]) {
    let mut content = header.join(",");
    content.push('\n');
    for row in rows {
        content.push_str(&row.join(","));
        content.push('\n');
    }
    fs::write(dir.join(format!("{}.csv", date)), content).unwrap();
}

fn write_corpus(dir: &Path, config: &AnalysisConfig) {
    fs::create_dir_all(dir).unwrap();
    let header = header(config);
    let statuses = [
        ("2024-03-17", "Available"),
        ("2024-04-14", "Offline"),
        ("2024-05-12", "Available"),
    ];
    for (date, swinging) in statuses {
        let rows = vec![
            row(config, "always-up", "Available", 0.75),
            row(config, "swinging", swinging, 0.5),
            row(config, "always-down", "Offline", 0.25),
            row(config, "not-in-lod-cloud", "Available", 0.875),
        ];
        write_snapshot(dir, date, &rows, &header);
    }
}

// ==================== Pipeline ====================

#[test]
fn test_filter_then_evaluate_corpus() {
    let tmp = TempDir::new().unwrap();
    let config = AnalysisConfig::default();
    let raw = tmp.path().join("raw");
    let filtered = tmp.path().join("filtered/all");
    let out = tmp.path().join("evaluation/all");
    write_corpus(&raw, &config);

    let reference = ReferenceList::new(["always-up", "swinging", "always-down"]);
    let filter = filter_snapshot_dir(&raw, &filtered, reference.identifiers(), &config.columns.entity)
        .unwrap();
    assert_eq!(filter.files, 3);
    assert_eq!(filter.rows_kept, 9);

    let pipeline = EvaluationPipeline::new(config);
    let report = pipeline.evaluate_dir("all", &filtered, &out).unwrap();

    assert_eq!(report.snapshots, 3);
    // 3 punctual, 5 by-metric, 4 availability, 6 categories and 20 dimensions at 3 granularities.
    assert_eq!(report.tables_written, 3 + 5 + 4 + 6 * 3 + 20 * 3);
    assert!(report.classes.contains(&(AvailabilityClass::AlwaysAvailable, 1)));
    assert!(report.classes.contains(&(AvailabilityClass::AlwaysUnavailable, 1)));
    assert!(report.classes.contains(&(AvailabilityClass::Alternating, 1)));
    assert!((report.swing_aggregate.unwrap() - 200.0 / 3.0).abs() < 1e-9);

    // Category scores were persisted into the snapshots.
    let snapshot = fs::read_to_string(filtered.join("2024-03-17.csv")).unwrap();
    assert!(snapshot.lines().next().unwrap().contains("Trust score"));

    // Reachable-only monthly statistics of a dimension.
    let accuracy = tables::read_statistic_table(
        &tables::over_time_dir(&out, Granularity::Monthly, Grouping::ByDimension).join("Accuracy score.csv"),
    )
    .unwrap();
    let labels: Vec<&str> = accuracy.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(labels, vec!["2024-03", "2024-04", "2024-05"]);
    assert_eq!(accuracy[0].1.min, Some(0.5));
    assert_eq!(accuracy[1].1.min, Some(0.75));
    assert_eq!(accuracy[0].1.max, Some(0.75));

    // The understandability cutover leaves only the May snapshot.
    let understandability = tables::read_statistic_table(
        &tables::over_time_dir(&out, Granularity::None, Grouping::ByDimension)
            .join("Understandability score.csv"),
    )
    .unwrap();
    assert_eq!(understandability.len(), 1);
    assert_eq!(understandability[0].0, "2024-05-12");

    // By-metric statistics include unreachable KGs.
    let deprecated = tables::read_statistic_table(
        &tables::over_time_dir(&out, Granularity::None, Grouping::ByMetric)
            .join("Deprecated classes-properties used.csv"),
    )
    .unwrap();
    assert_eq!(deprecated[0].1.min, Some(0.25));

    let provenance = tables::read_statistic_table(
        &tables::over_time_dir(&out, Granularity::None, Grouping::ByMetric)
            .join("P1-Provenance_information.csv"),
    )
    .unwrap();
    assert_eq!(provenance[0].1.max, Some(0.0));

    let categories = tables::read_statistic_table(
        &tables::punctual_dir(&out).join(tables::CATEGORIES_STATS_FILE),
    )
    .unwrap();
    assert_eq!(categories.len(), 6);
    assert!(categories.iter().all(|(_, s)| s.min == Some(0.5) && s.max == Some(0.75)));

    let availability = tables::availability_dir(&out);
    let swing_summary = fs::read_to_string(availability.join(tables::SWING_SUMMARY_FILE)).unwrap();
    assert!(swing_summary.contains("std,-"));
    let frequencies =
        tables::read_frequency_table(&availability.join(tables::AVAILABILITY_FREQUENCY_FILE)).unwrap();
    assert_eq!(frequencies, vec![(66.67, 1)]);

    // Charts: every boxplot and the single-bubble availability chart.
    let summary = pipeline.charts_for(JsonChartRenderer, out.clone(), tmp.path().join("charts/all"));
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.rendered.len(), 20 + 6 + 1 + 2 + 1);
    assert!(tmp
        .path()
        .join("charts/all/over_time/monthly/by_dimension/Interoperability score.json")
        .exists());
}

#[test]
fn test_evaluation_is_repeatable() {
    let tmp = TempDir::new().unwrap();
    let config = AnalysisConfig::default();
    let snapshots = tmp.path().join("snapshots");
    write_corpus(&snapshots, &config);

    let pipeline = EvaluationPipeline::new(config);
    let first_out = tmp.path().join("first");
    let second_out = tmp.path().join("second");
    pipeline.evaluate_dir("all", &snapshots, &first_out).unwrap();
    // The second run sees the category columns added by the first.
    pipeline.evaluate_dir("all", &snapshots, &second_out).unwrap();

    let path = |root: &Path| {
        tables::over_time_dir(root, Granularity::Quarterly, Grouping::ByCategory).join("Trust score.csv")
    };
    assert_eq!(
        fs::read_to_string(path(&first_out)).unwrap(),
        fs::read_to_string(path(&second_out)).unwrap()
    );
}

#[test]
fn test_missing_snapshot_directory_fails() {
    let tmp = TempDir::new().unwrap();
    let pipeline = EvaluationPipeline::new(AnalysisConfig::default());
    let err = pipeline
        .evaluate_dir("all", &tmp.path().join("absent"), &tmp.path().join("out"))
        .unwrap_err();
    assert!(err.to_string().contains("Failed to load snapshots of all"));
}
