//! SPARQL endpoint availability over time.
//!
//! Each KG is classified from the set of distinct endpoint statuses it shows
//! inside the observation window. KGs that show more than one status are
//! `Alternating`; for those the share of snapshots in which the endpoint was
//! available is reported as a percentage.

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::config::{ColumnSettings, ObservationWindow};
use crate::core::domain::{ReachabilityStatus, SummaryStats, Timeline};
use crate::error::QualityResult;
use crate::parsing::snapshot_parser;
use crate::services::statistics::{compute_summary, sample_std_dev};

/// Endpoint statuses of every KG, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusHistory {
    entries: BTreeMap<String, Vec<(NaiveDate, ReachabilityStatus)>>,
}

impl StatusHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entity: &str, date: NaiveDate, status: ReachabilityStatus) {
        self.entries
            .entry(entity.to_string())
            .or_default()
            .push((date, status));
    }

    /// Collect the status of every KG from every snapshot of a timeline.
    ///
    /// Snapshots without an entity column are skipped. A missing status
    /// column reads as "not indicated" for every row.
    pub fn from_timeline(timeline: &Timeline, columns: &ColumnSettings) -> QualityResult<Self> {
        let mut history = Self::new();
        for file in timeline.iter() {
            let snapshot = file.read_columns(&[columns.entity.as_str(), columns.status.as_str()])?;
            if !snapshot.has_column(&columns.entity) {
                warn!("{} has no '{}' column, skipping", file.file_name(), columns.entity);
                continue;
            }

            let entities = snapshot_parser::text_values(&snapshot.frame, &columns.entity)?;
            let statuses = if snapshot.has_column(&columns.status) {
                snapshot_parser::text_values(&snapshot.frame, &columns.status)?
            } else {
                vec![None; entities.len()]
            };

            for (entity, status) in entities.iter().zip(statuses.iter()) {
                let Some(entity) = entity.as_deref().filter(|e| !e.is_empty()) else {
                    continue;
                };
                history.record(entity, file.date, ReachabilityStatus::from_cell(status.as_deref()));
            }
        }
        debug!("Collected endpoint statuses of {} KGs", history.len());
        Ok(history)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn observations(&self, entity: &str) -> &[(NaiveDate, ReachabilityStatus)] {
        self.entries.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Availability behaviour of one KG across the observation window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AvailabilityClass {
    AlwaysAvailable,
    AlwaysUnavailable,
    AlwaysUnspecified,
    AlwaysOther(String),
    Alternating,
}

impl AvailabilityClass {
    fn from_status(status: &ReachabilityStatus) -> Self {
        match status {
            ReachabilityStatus::Available => AvailabilityClass::AlwaysAvailable,
            ReachabilityStatus::Unavailable => AvailabilityClass::AlwaysUnavailable,
            ReachabilityStatus::NotIndicated => AvailabilityClass::AlwaysUnspecified,
            ReachabilityStatus::Other(s) => AvailabilityClass::AlwaysOther(s.clone()),
        }
    }

    /// Label written in the status table; constant classes use the status itself.
    pub fn label(&self) -> &str {
        match self {
            AvailabilityClass::AlwaysAvailable => "Available",
            AvailabilityClass::AlwaysUnavailable => "Unavailable",
            AvailabilityClass::AlwaysUnspecified => "Not indicated",
            AvailabilityClass::AlwaysOther(s) => s.as_str(),
            AvailabilityClass::Alternating => "Alternating",
        }
    }
}

impl fmt::Display for AvailabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Class of every KG observed inside the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    classes: BTreeMap<String, AvailabilityClass>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class_of(&self, entity: &str) -> Option<&AvailabilityClass> {
        self.classes.get(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AvailabilityClass)> {
        self.classes.iter().map(|(e, c)| (e.as_str(), c))
    }

    /// KGs classified as alternating, in identifier order.
    pub fn alternating(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, c)| **c == AvailabilityClass::Alternating)
            .map(|(e, _)| e)
    }

    /// Number of KGs per class, most frequent first.
    pub fn counts(&self) -> Vec<(AvailabilityClass, usize)> {
        let mut counts: BTreeMap<&AvailabilityClass, usize> = BTreeMap::new();
        for class in self.classes.values() {
            *counts.entry(class).or_default() += 1;
        }
        let mut counts: Vec<(AvailabilityClass, usize)> =
            counts.into_iter().map(|(c, n)| (c.clone(), n)).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

/// Classify every KG from the distinct statuses it shows inside the window.
pub fn classify(history: &StatusHistory, window: &ObservationWindow) -> Classification {
    let mut classes = BTreeMap::new();
    for entity in history.entities() {
        let distinct: BTreeSet<&ReachabilityStatus> = history
            .observations(entity)
            .iter()
            .filter(|(date, _)| window.contains(*date))
            .map(|(_, status)| status)
            .collect();

        let class = match distinct.len() {
            0 => continue,
            1 => distinct
                .first()
                .map(|s| AvailabilityClass::from_status(s))
                .unwrap_or(AvailabilityClass::Alternating),
            _ => AvailabilityClass::Alternating,
        };
        classes.insert(entity.to_string(), class);
    }

    info!(
        "Classified endpoint availability of {} KGs between {} and {}",
        classes.len(),
        window.start,
        window.end
    );
    Classification { classes }
}

/// Availability percentages of the alternating KGs.
#[derive(Debug, Clone, PartialEq)]
pub struct SwingReport {
    /// Percentage of snapshots with an available endpoint, per KG.
    pub percentages: Vec<(String, f64)>,
    /// Available observations over all observations of the alternating KGs.
    pub aggregate: Option<f64>,
    pub stats: SummaryStats,
    pub std_dev: Option<f64>,
}

impl SwingReport {
    /// Number of KGs per percentage, rounded to two decimals.
    pub fn frequencies(&self) -> Vec<(f64, usize)> {
        let mut groups: BTreeMap<i64, usize> = BTreeMap::new();
        for (_, pct) in &self.percentages {
            *groups.entry((pct * 100.0).round() as i64).or_default() += 1;
        }
        groups
            .into_iter()
            .map(|(key, count)| (key as f64 / 100.0, count))
            .collect()
    }

    /// Statistic/value pairs of the summary table.
    pub fn summary_rows(&self) -> Vec<(String, Option<f64>)> {
        vec![
            ("min".to_string(), self.stats.min),
            ("q1".to_string(), self.stats.q1),
            ("median".to_string(), self.stats.median),
            ("q3".to_string(), self.stats.q3),
            ("max".to_string(), self.stats.max),
            ("mean".to_string(), self.stats.mean),
            ("std".to_string(), self.std_dev),
            ("overall_average".to_string(), self.aggregate),
        ]
    }
}

/// Availability percentages of the alternating KGs over their whole history.
pub fn swing(history: &StatusHistory, classification: &Classification) -> SwingReport {
    let mut percentages = Vec::new();
    let mut available_total = 0usize;
    let mut observed_total = 0usize;

    for entity in classification.alternating() {
        let observations = history.observations(entity);
        if observations.is_empty() {
            continue;
        }
        let available = observations.iter().filter(|(_, s)| s.is_available()).count();
        available_total += available;
        observed_total += observations.len();
        percentages.push((
            entity.to_string(),
            available as f64 / observations.len() as f64 * 100.0,
        ));
    }

    let aggregate = (observed_total > 0)
        .then(|| available_total as f64 / observed_total as f64 * 100.0);
    let values: Vec<f64> = percentages.iter().map(|(_, p)| *p).collect();
    let stats = compute_summary(&values.iter().copied().map(Some).collect::<Vec<_>>());

    SwingReport {
        percentages,
        aggregate,
        stats,
        std_dev: sample_std_dev(&values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(d: &str) -> NaiveDate {
        NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()
    }

    fn history(rows: &[(&str, &str, &str)]) -> StatusHistory {
        let mut history = StatusHistory::new();
        for (entity, day, status) in rows {
            history.record(entity, date(day), ReachabilityStatus::from_cell(Some(status)));
        }
        history
    }

    #[test]
    fn test_classify_constant_and_alternating() {
        let h = history(&[
            ("a", "2024-03-17", "Available"),
            ("a", "2024-03-24", "Available"),
            ("b", "2024-03-17", "Offline"),
            ("b", "2024-03-24", "Unavailable"),
            ("c", "2024-03-17", ""),
            ("d", "2024-03-17", "Available"),
            ("d", "2024-03-24", "Offline"),
            ("e", "2024-03-17", "Timeout"),
        ]);
        let classes = classify(&h, &ObservationWindow::default());

        assert_eq!(classes.class_of("a"), Some(&AvailabilityClass::AlwaysAvailable));
        assert_eq!(classes.class_of("b"), Some(&AvailabilityClass::AlwaysUnavailable));
        assert_eq!(classes.class_of("c"), Some(&AvailabilityClass::AlwaysUnspecified));
        assert_eq!(classes.class_of("d"), Some(&AvailabilityClass::Alternating));
        assert_eq!(
            classes.class_of("e"),
            Some(&AvailabilityClass::AlwaysOther("Timeout".to_string()))
        );
    }

    #[test]
    fn test_classify_ignores_observations_outside_window() {
        let h = history(&[
            ("a", "2024-03-10", "Offline"),
            ("a", "2024-03-17", "Available"),
            ("a", "2024-09-01", "Available"),
            ("a", "2024-09-08", "Offline"),
            ("late", "2024-10-01", "Available"),
        ]);
        let classes = classify(&h, &ObservationWindow::default());

        assert_eq!(classes.class_of("a"), Some(&AvailabilityClass::AlwaysAvailable));
        assert_eq!(classes.class_of("late"), None);
        assert_eq!(classes.len(), 1);
    }

    #[test]
    fn test_counts_sum_to_classified_entities() {
        let h = history(&[
            ("a", "2024-03-17", "Available"),
            ("b", "2024-03-17", "Available"),
            ("c", "2024-03-17", "Available"),
            ("c", "2024-04-17", "Offline"),
            ("d", "2024-03-17", "Offline"),
        ]);
        let classes = classify(&h, &ObservationWindow::default());
        let counts = classes.counts();

        assert_eq!(counts[0], (AvailabilityClass::AlwaysAvailable, 2));
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), 4);
    }

    #[test]
    fn test_swing_two_of_three() {
        let h = history(&[
            ("a", "2024-03-17", "Available"),
            ("a", "2024-03-24", "Offline"),
            ("a", "2024-03-31", "Available"),
        ]);
        let report = swing(&h, &classify(&h, &ObservationWindow::default()));

        assert_eq!(report.percentages.len(), 1);
        assert!((report.percentages[0].1 - 66.666_666).abs() < 1e-3);
        assert_eq!(report.frequencies(), vec![(66.67, 1)]);
        assert_eq!(report.std_dev, None);
    }

    #[test]
    fn test_swing_uses_history_outside_window() {
        let h = history(&[
            ("a", "2024-01-01", "Offline"),
            ("a", "2024-03-17", "Available"),
            ("a", "2024-03-24", "Offline"),
            ("a", "2024-03-31", "Available"),
        ]);
        let report = swing(&h, &classify(&h, &ObservationWindow::default()));
        assert_eq!(report.percentages[0].1, 50.0);
    }

    #[test]
    fn test_aggregate_weights_by_observations() {
        // a: 1 of 2 available, b: 1 of 4 available.
        let h = history(&[
            ("a", "2024-03-17", "Available"),
            ("a", "2024-03-24", "Offline"),
            ("b", "2024-03-17", "Available"),
            ("b", "2024-03-24", "Offline"),
            ("b", "2024-03-31", "Offline"),
            ("b", "2024-04-07", "Offline"),
        ]);
        let report = swing(&h, &classify(&h, &ObservationWindow::default()));

        assert_eq!(report.stats.mean, Some(37.5));
        let aggregate = report.aggregate.unwrap();
        assert!((aggregate - 100.0 / 3.0).abs() < 1e-9);
        assert_ne!(Some(aggregate), report.stats.mean);
    }

    #[test]
    fn test_no_alternating_entity() {
        let h = history(&[("a", "2024-03-17", "Available")]);
        let report = swing(&h, &classify(&h, &ObservationWindow::default()));

        assert!(report.percentages.is_empty());
        assert_eq!(report.aggregate, None);
        assert!(report.stats.is_empty());
        assert!(report.frequencies().is_empty());
        assert_eq!(report.summary_rows().last(), Some(&("overall_average".to_string(), None)));
    }

    proptest! {
        #[test]
        fn prop_swing_percentages_are_bounded(statuses in prop::collection::vec(
            prop::collection::vec(prop::bool::ANY, 1..12), 1..8)) {
            let mut h = StatusHistory::new();
            for (i, entity_statuses) in statuses.iter().enumerate() {
                for (day, available) in entity_statuses.iter().enumerate() {
                    let status = if *available {
                        ReachabilityStatus::Available
                    } else {
                        ReachabilityStatus::Unavailable
                    };
                    h.record(&format!("kg{}", i), date("2024-04-01") + chrono::Days::new(day as u64), status);
                }
            }
            let classes = classify(&h, &ObservationWindow::default());
            // Every generated observation falls inside the window.
            let total: usize = classes.counts().iter().map(|(_, n)| n).sum();
            prop_assert_eq!(total, statuses.len());

            let report = swing(&h, &classes);
            for (_, pct) in &report.percentages {
                prop_assert!(*pct > 0.0 && *pct < 100.0);
            }
        }
    }
}
