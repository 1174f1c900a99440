use crate::core::domain::SummaryStats;

/// Linear-interpolated quantile of sorted values (`h = (n - 1) * p`).
///
/// `sorted` must be non-empty and ascending.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

/// Compute min, quartiles, max and mean of the present values.
///
/// Missing values are skipped. When nothing is left every statistic is `None`.
pub fn compute_summary(values: &[Option<f64>]) -> SummaryStats {
    let mut sorted: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if sorted.is_empty() {
        return SummaryStats::empty();
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let min = sorted[0];
    let max = sorted[count - 1];

    SummaryStats {
        min: Some(min),
        q1: Some(quantile_sorted(&sorted, 0.25)),
        median: Some(quantile_sorted(&sorted, 0.5)),
        q3: Some(quantile_sorted(&sorted, 0.75)),
        max: Some(max),
        // Summation error can push the mean of near-equal values past the bounds.
        mean: Some(mean.clamp(min, max)),
    }
}

/// Sample standard deviation (n - 1 denominator); `None` below two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compute_summary() {
        let values = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let stats = compute_summary(&values);

        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.q1, Some(2.0));
        assert_eq!(stats.median, Some(3.0));
        assert_eq!(stats.q3, Some(4.0));
        assert_eq!(stats.max, Some(5.0));
        assert_eq!(stats.mean, Some(3.0));
    }

    #[test]
    fn test_quartiles_interpolate() {
        let stats = compute_summary(&[Some(0.0), Some(1.0), Some(2.0), Some(10.0)]);
        assert_eq!(stats.q1, Some(0.75));
        assert_eq!(stats.median, Some(1.5));
        assert_eq!(stats.q3, Some(4.0));
        assert_eq!(stats.mean, Some(3.25));
    }

    #[test]
    fn test_missing_values_are_skipped_not_zero() {
        let stats = compute_summary(&[Some(0.5), None, Some(1.0), None]);
        assert_eq!(stats.min, Some(0.5));
        assert_eq!(stats.mean, Some(0.75));
    }

    #[test]
    fn test_compute_summary_empty() {
        let stats = compute_summary(&[None, None]);
        assert!(stats.is_empty());
        assert_eq!(stats.as_array(), [None; 6]);
        assert!(compute_summary(&[]).is_empty());
    }

    #[test]
    fn test_single_value() {
        let stats = compute_summary(&[Some(0.42)]);
        assert_eq!(stats.as_array(), [Some(0.42); 6]);
    }

    #[test]
    fn test_sample_std_dev() {
        let std = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - 2.138).abs() < 0.001);
        assert_eq!(sample_std_dev(&[1.0]), None);
    }

    proptest! {
        #[test]
        fn prop_summary_is_ordered(values in prop::collection::vec(prop::option::of(0.0f64..1.0), 0..60)) {
            let stats = compute_summary(&values);
            if values.iter().all(Option::is_none) {
                prop_assert!(stats.is_empty());
            } else {
                let [min, q1, median, q3, max, mean] = stats.as_array().map(|v| v.unwrap());
                prop_assert!(min <= q1);
                prop_assert!(q1 <= median);
                prop_assert!(median <= q3);
                prop_assert!(q3 <= max);
                prop_assert!(min <= mean && mean <= max);
            }
        }
    }
}
