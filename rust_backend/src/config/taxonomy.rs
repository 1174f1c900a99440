//! Category taxonomy: the fixed grouping of quality dimensions into the six
//! quality categories used to compute category scores.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{QualityError, QualityResult};

/// A quality category and its ordered member dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub members: Vec<String>,
}

impl Category {
    pub fn new(name: &str, members: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Validated, immutable set of categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTaxonomy {
    categories: Vec<Category>,
}

impl CategoryTaxonomy {
    /// Validate and wrap a list of categories.
    ///
    /// Every category needs between two and four members and no metric may
    /// belong to two categories.
    pub fn new(categories: Vec<Category>) -> QualityResult<Self> {
        let mut seen: HashSet<&str> = HashSet::new();
        for category in &categories {
            if !(2..=4).contains(&category.members.len()) {
                return Err(QualityError::Config(format!(
                    "Category '{}' must have 2 to 4 members, found {}",
                    category.name,
                    category.members.len()
                )));
            }
            for member in &category.members {
                if !seen.insert(member.as_str()) {
                    return Err(QualityError::Config(format!(
                        "Metric '{}' appears in more than one category",
                        member
                    )));
                }
            }
        }
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category names, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// Every member metric of every category.
    pub fn member_metrics(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|c| c.members.iter().cloned())
            .collect()
    }
}

/// The six categories of the linked-data quality literature.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "Intrinsic score",
            &[
                "Accuracy score",
                "Interlinking score",
                "Consistency score",
                "Conciseness score",
            ],
        ),
        Category::new(
            "Dataset dynamicity score",
            &["Currency score", "Volatility score"],
        ),
        Category::new(
            "Trust score",
            &[
                "Verifiability score",
                "Reputation score",
                "Believability score",
            ],
        ),
        Category::new(
            "Contextual score",
            &["Completeness score", "Amount of data score"],
        ),
        Category::new(
            "Representational score",
            &[
                "Representational-Consistency score",
                "Representational-Conciseness score",
                "Interpretability score",
                "Versatility score",
            ],
        ),
        Category::new(
            "Accessibility score",
            &[
                "Availability score",
                "Licensing score",
                "Security score",
                "Performance score",
            ],
        ),
    ]
}
