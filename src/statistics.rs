//! Statistical summaries over numeric samples

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for one numeric sample
///
/// Callers must branch on `count == 0` (equivalently `insufficient_data`)
/// before interpreting any other field: an empty sample yields zeros as a
/// defined sentinel, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSummary {
    /// Number of finite samples aggregated
    pub count: usize,

    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,

    /// Requested percentiles, keyed "p50", "p99.9", ...
    pub percentiles: BTreeMap<String, f64>,

    /// True when the sample was empty
    pub insufficient_data: bool,
}

impl SampleSummary {
    fn empty(percentiles: &[f64]) -> Self {
        Self {
            count: 0,
            mean: 0.0,
            median: 0.0,
            min: 0.0,
            max: 0.0,
            percentiles: percentiles
                .iter()
                .map(|p| (percentile_label(*p), 0.0))
                .collect(),
            insufficient_data: true,
        }
    }
}

/// Label for a percentile key: "p95", "p99.9"
pub fn percentile_label(p: f64) -> String {
    if p.fract() == 0.0 {
        format!("p{}", p as i64)
    } else {
        format!("p{}", p)
    }
}

/// Compute count, mean, median and the requested percentiles over `samples`
///
/// Non-finite values are dropped before aggregation. Percentiles use linear
/// interpolation between order statistics (index `p/100 * (n - 1)`), the one
/// interpolation rule applied everywhere in this crate, so identical input
/// multisets always produce identical outputs. `p0` and `p100` are exactly
/// the sample min and max.
pub fn summarize(samples: &[f64], percentiles: &[f64]) -> SampleSummary {
    let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return SampleSummary::empty(percentiles);
    }
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let median = percentile_of_sorted(&sorted, 50.0);

    let requested = percentiles
        .iter()
        .map(|p| (percentile_label(*p), percentile_of_sorted(&sorted, *p)))
        .collect();

    SampleSummary {
        count,
        mean,
        median,
        min: sorted[0],
        max: sorted[count - 1],
        percentiles: requested,
        insufficient_data: false,
    }
}

/// Linearly interpolated percentile over pre-sorted data
pub fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let index = (percentile / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = index - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_nonempty_sample() {
        let summary = summarize(&[10.0, 30.0], &[50.0]);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.mean, 20.0);
        assert_eq!(summary.median, 20.0);
        assert_eq!(summary.percentiles["p50"], 20.0);
        assert!(!summary.insufficient_data);
    }

    #[test]
    fn empty_sample_yields_sentinel() {
        let summary = summarize(&[], &[50.0, 95.0]);
        assert_eq!(summary.count, 0);
        assert!(summary.insufficient_data);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.percentiles["p50"], 0.0);
        assert_eq!(summary.percentiles["p95"], 0.0);
    }

    #[test]
    fn median_bounded_by_min_and_max() {
        let data = [4.0, 1.0, 7.0, 3.0, 9.0, 2.0];
        let summary = summarize(&data, &[0.0, 100.0]);
        assert!(summary.min <= summary.median && summary.median <= summary.max);
        assert_eq!(summary.percentiles["p0"], summary.min);
        assert_eq!(summary.percentiles["p100"], summary.max);
    }

    #[test]
    fn linear_interpolation_rule() {
        // index = p/100 * (n-1); for n=10, p50 -> 4.5 -> 5.5
        let data: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let summary = summarize(&data, &[50.0, 90.0]);
        assert!((summary.percentiles["p50"] - 5.5).abs() < 1e-9);
        assert!((summary.percentiles["p90"] - 9.1).abs() < 1e-9);
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let summary = summarize(&[1.0, f64::NAN, 3.0, f64::INFINITY], &[]);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.mean, 2.0);
    }

    #[test]
    fn fractional_percentile_labels() {
        assert_eq!(percentile_label(95.0), "p95");
        assert_eq!(percentile_label(99.9), "p99.9");
    }

    #[test]
    fn single_sample() {
        let summary = summarize(&[42.0], &[0.0, 50.0, 100.0]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.median, 42.0);
        assert_eq!(summary.percentiles["p0"], 42.0);
        assert_eq!(summary.percentiles["p100"], 42.0);
    }
}
