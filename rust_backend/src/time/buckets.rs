use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::core::domain::{BucketLabel, SnapshotFile, Timeline};

/// Time granularity of a bucketed statistics series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Monthly,
    Quarterly,
    /// Every snapshot is its own bucket.
    None,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [
        Granularity::None,
        Granularity::Monthly,
        Granularity::Quarterly,
    ];

    /// Label of the bucket a date falls in.
    pub fn label_of(self, date: NaiveDate) -> BucketLabel {
        match self {
            Granularity::Monthly => BucketLabel::month_of(date),
            Granularity::Quarterly => BucketLabel::quarter_of(date),
            Granularity::None => BucketLabel::Day(date),
        }
    }

    /// Directory name used for this granularity in the output hierarchy.
    pub fn dir_name(self) -> &'static str {
        match self {
            Granularity::Monthly => "monthly",
            Granularity::Quarterly => "quarterly",
            Granularity::None => "snapshot",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "month" | "m" => Ok(Granularity::Monthly),
            "quarterly" | "quarter" | "q" => Ok(Granularity::Quarterly),
            "none" | "snapshot" => Ok(Granularity::None),
            other => Err(format!(
                "Invalid granularity: {}. Must be 'monthly', 'quarterly' or 'none'",
                other
            )),
        }
    }
}

/// One time bucket and the snapshot sampled for it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: BucketLabel,
    pub snapshot: Option<SnapshotFile>,
}

fn next_period(label: BucketLabel) -> BucketLabel {
    match label {
        BucketLabel::Month { year, month } if month >= 12 => BucketLabel::Month {
            year: year + 1,
            month: 1,
        },
        BucketLabel::Month { year, month } => BucketLabel::Month {
            year,
            month: month + 1,
        },
        BucketLabel::Quarter { year, quarter } if quarter >= 4 => BucketLabel::Quarter {
            year: year + 1,
            quarter: 1,
        },
        BucketLabel::Quarter { year, quarter } => BucketLabel::Quarter {
            year,
            quarter: quarter + 1,
        },
        other => other,
    }
}

/// Group a timeline into buckets.
///
/// Within a calendar period only the earliest snapshot is kept. Every period
/// between the first and the last snapshot is returned, periods without a
/// snapshot carry `None`.
pub fn bucket_timeline(timeline: &Timeline, granularity: Granularity) -> Vec<Bucket> {
    if granularity == Granularity::None {
        return timeline
            .iter()
            .map(|f| Bucket {
                label: BucketLabel::Day(f.date),
                snapshot: Some(f.clone()),
            })
            .collect();
    }

    let (Some(first), Some(last)) = (timeline.first(), timeline.latest()) else {
        return Vec::new();
    };

    let end = granularity.label_of(last.date);
    let mut buckets = Vec::new();
    let mut label = granularity.label_of(first.date);
    loop {
        let snapshot = timeline
            .iter()
            .find(|f| granularity.label_of(f.date) == label)
            .cloned();
        buckets.push(Bucket { label, snapshot });
        if label >= end {
            break;
        }
        label = next_period(label);
    }
    buckets
}
