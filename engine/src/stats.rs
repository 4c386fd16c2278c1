//! Numeric samples and their summary statistics.
//!
//! Percentiles use the nearest-rank rule of earlier reports: sort ascending,
//! take `sorted[min(floor(n * p), n - 1)]`. No interpolation.

use serde::Serialize;

/// Index selected by the nearest-rank rule for a sample of `len` values.
///
/// `len` must be non-zero.
pub fn nearest_rank_index(len: usize, fraction: f64) -> usize {
    // Negative products saturate to 0 in the cast.
    let index = (len as f64 * fraction).floor() as usize;
    index.min(len.saturating_sub(1))
}

/// Nearest-rank percentile of an unsorted sample; 0 for an empty sample.
pub fn percentile(sample: &[f64], fraction: f64) -> f64 {
    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_of_sorted(&sorted, fraction)
}

fn percentile_of_sorted(sorted: &[f64], fraction: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    sorted[nearest_rank_index(sorted.len(), fraction)]
}

/// Min, max, and mean of a sample. All zero when the sample is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SampleSummary {
    /// Number of values.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub avg: f64,
}

/// [`SampleSummary`] plus the 95th and 99th nearest-rank percentiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    /// Number of values.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub avg: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 99th percentile.
    pub p99: f64,
}

/// An in-memory collection of observations for one metric.
///
/// Percentiles need every value, so memory grows with the stream.
#[derive(Debug, Clone, Default)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    /// Creates an empty sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation.
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Adds the observation if present.
    pub fn push_opt(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.push(value);
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was observed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Min, max, and mean.
    pub fn summary(&self) -> SampleSummary {
        if self.values.is_empty() {
            return SampleSummary::default();
        }
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self
            .values
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let sum: f64 = self.values.iter().sum();
        SampleSummary {
            count: self.values.len(),
            min,
            max,
            avg: sum / self.values.len() as f64,
        }
    }

    /// Min, max, mean, p95, and p99.
    pub fn latency_summary(&self) -> LatencySummary {
        let SampleSummary {
            count,
            min,
            max,
            avg,
        } = self.summary();
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        LatencySummary {
            count,
            min,
            max,
            avg,
            p95: percentile_of_sorted(&sorted, 0.95),
            p99: percentile_of_sorted(&sorted, 0.99),
        }
    }

    /// Nearest-rank percentile of this sample.
    pub fn percentile(&self, fraction: f64) -> f64 {
        percentile(&self.values, fraction)
    }
}

impl FromIterator<f64> for Sample {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
