use log::{debug, info};
use polars::prelude::*;

use crate::config::{AnalysisConfig, Category, CategoryTaxonomy};
use crate::core::domain::{Snapshot, Timeline};
use crate::error::{QualityError, QualityResult};
use crate::parsing::snapshot_parser;

/// Summary of an augmentation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AugmentReport {
    pub snapshots: usize,
    pub categories: usize,
}

/// Adds one score column per quality category to every snapshot.
///
/// A category score is the mean of its member dimensions for each KG. If a
/// member is missing for a KG, the KG has no score for that category.
pub struct CategoryAugmenter {
    taxonomy: CategoryTaxonomy,
}

impl CategoryAugmenter {
    pub fn new(taxonomy: CategoryTaxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn from_config(config: &AnalysisConfig) -> QualityResult<Self> {
        Ok(Self::new(config.taxonomy()?))
    }

    pub fn taxonomy(&self) -> &CategoryTaxonomy {
        &self.taxonomy
    }

    /// Member columns absent from a list of column names.
    fn missing_members(&self, header: &[String]) -> Vec<String> {
        self.taxonomy
            .member_metrics()
            .into_iter()
            .filter(|m| !header.iter().any(|h| h == m))
            .collect()
    }

    /// Check that every snapshot carries every member column.
    pub fn check_schema(&self, timeline: &Timeline) -> QualityResult<()> {
        for file in timeline.iter() {
            let missing = self.missing_members(&file.columns()?);
            if !missing.is_empty() {
                return Err(QualityError::SchemaMismatch {
                    file: file.path.clone(),
                    missing,
                });
            }
        }
        Ok(())
    }

    /// Row-wise score of one category.
    pub fn category_scores(
        &self,
        snapshot: &Snapshot,
        category: &Category,
    ) -> QualityResult<Vec<Option<f64>>> {
        let mut members = Vec::with_capacity(category.members.len());
        for member in &category.members {
            members.push(snapshot_parser::score_values(&snapshot.frame, member)?);
        }

        let count = category.members.len() as f64;
        let scores = (0..snapshot.height())
            .map(|row| {
                members
                    .iter()
                    .map(|values| values[row])
                    .sum::<Option<f64>>()
                    .map(|sum| sum / count)
            })
            .collect();
        Ok(scores)
    }

    /// Add or replace the category columns of an in-memory snapshot.
    pub fn augment_snapshot(&self, snapshot: &mut Snapshot) -> QualityResult<()> {
        let header: Vec<String> = snapshot
            .frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let missing = self.missing_members(&header);
        if !missing.is_empty() {
            return Err(QualityError::SchemaMismatch {
                file: snapshot.path.clone(),
                missing,
            });
        }

        for category in self.taxonomy.categories() {
            let scores = self.category_scores(snapshot, category)?;
            snapshot
                .frame
                .with_column(Series::new(category.name.as_str().into(), scores))?;
        }
        Ok(())
    }

    /// Compute the category scores of every snapshot and write them back.
    ///
    /// The schema of the whole timeline is checked before any file is
    /// rewritten. Running the pass again recomputes the same columns.
    pub fn augment_timeline(&self, timeline: &Timeline) -> QualityResult<AugmentReport> {
        self.check_schema(timeline)?;

        for file in timeline.iter() {
            let mut snapshot = file.read_all()?;
            self.augment_snapshot(&mut snapshot)?;
            snapshot_parser::write_snapshot_csv(&file.path, &mut snapshot.frame)?;
            debug!("Added category scores to {}", file.file_name());
        }

        info!(
            "Added {} category scores to {} snapshots",
            self.taxonomy.categories().len(),
            timeline.len()
        );
        Ok(AugmentReport {
            snapshots: timeline.len(),
            categories: self.taxonomy.categories().len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_categories;
    use crate::io::SnapshotLoader;
    use std::fs;
    use tempfile::TempDir;

    fn small_taxonomy() -> CategoryTaxonomy {
        CategoryTaxonomy::new(vec![
            Category::new("Trust score", &["a", "b", "c"]),
            Category::new("Dynamicity score", &["d", "e"]),
        ])
        .unwrap()
    }

    const SNAPSHOT: &str = "KG id,a,b,c,d,e\n\
kg1,0.3,0.6,0.9,1,0\n\
kg2,0.3,-,0.9,0.5,0.5\n";

    #[test]
    fn test_category_score_is_member_mean() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("2024-05-01.csv"), SNAPSHOT).unwrap();

        let augmenter = CategoryAugmenter::new(small_taxonomy());
        let mut snapshot = SnapshotLoader::load_file(&dir.path().join("2024-05-01.csv")).unwrap();
        augmenter.augment_snapshot(&mut snapshot).unwrap();

        let trust = snapshot_parser::score_values(&snapshot.frame, "Trust score").unwrap();
        assert!((trust[0].unwrap() - 0.6).abs() < 1e-12);
        // A missing member makes the whole category missing for that row.
        assert_eq!(trust[1], None);

        let dynamicity = snapshot_parser::score_values(&snapshot.frame, "Dynamicity score").unwrap();
        assert_eq!(dynamicity, vec![Some(0.5), Some(0.5)]);
    }

    #[test]
    fn test_augment_timeline_persists_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("2024-05-01.csv"), SNAPSHOT).unwrap();
        fs::write(dir.path().join("2024-06-01.csv"), SNAPSHOT).unwrap();
        let timeline = SnapshotLoader::discover(dir.path()).unwrap();

        let augmenter = CategoryAugmenter::new(small_taxonomy());
        let report = augmenter.augment_timeline(&timeline).unwrap();
        assert_eq!(report, AugmentReport { snapshots: 2, categories: 2 });

        let path = dir.path().join("2024-05-01.csv");
        let first = fs::read_to_string(&path).unwrap();
        assert!(first.lines().next().unwrap().ends_with("Trust score,Dynamicity score"));

        augmenter.augment_timeline(&timeline).unwrap();
        let second = fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_member_is_schema_mismatch() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("2024-05-01.csv"), SNAPSHOT).unwrap();
        fs::write(dir.path().join("2024-06-01.csv"), "KG id,a,b\nkg1,0.1,0.2\n").unwrap();
        let timeline = SnapshotLoader::discover(dir.path()).unwrap();

        let augmenter = CategoryAugmenter::new(small_taxonomy());
        let err = augmenter.augment_timeline(&timeline).unwrap_err();
        match err {
            QualityError::SchemaMismatch { missing, .. } => {
                assert_eq!(missing, vec!["c", "d", "e"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Nothing was rewritten.
        let untouched = fs::read_to_string(dir.path().join("2024-05-01.csv")).unwrap();
        assert_eq!(untouched, SNAPSHOT);
    }

    #[test]
    fn test_default_taxonomy_requires_nineteen_columns() {
        let augmenter = CategoryAugmenter::new(CategoryTaxonomy::new(default_categories()).unwrap());
        let missing = augmenter.missing_members(&["KG id".to_string()]);
        assert_eq!(missing.len(), 19);
    }
}
