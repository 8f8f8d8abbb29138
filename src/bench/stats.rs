//! Summary statistics over one series of timed attempts

use crate::error::{BenchError, Result};
use crate::types::MethodIdentity;
use serde::Serialize;

/// Latency statistics for one method, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkSeries {
    method: MethodIdentity,
    /// Execution order, not sorted
    samples: Vec<f64>,
    average: f64,
    minimum: f64,
    maximum: f64,
    median: f64,
}

impl BenchmarkSeries {
    /// Compute statistics over a completed run. `samples` must be non-empty,
    /// finite and non-negative.
    pub fn from_samples(method: MethodIdentity, samples: Vec<f64>) -> Result<Self> {
        if samples.is_empty() {
            return Err(BenchError::InvalidArgument(
                "cannot summarize an empty series".to_string(),
            ));
        }
        if let Some(bad) = samples.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(BenchError::InvalidArgument(format!("invalid latency sample {}", bad)));
        }

        let mut sorted = samples.clone();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let minimum = sorted[0];
        let maximum = sorted[n - 1];
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        let total: f64 = samples.iter().sum();
        // Rounding can push the mean of equal samples a ulp outside the extremes
        let average = (total / n as f64).clamp(minimum, maximum);

        Ok(Self {
            method,
            samples,
            average,
            minimum,
            maximum,
            median,
        })
    }

    pub fn method(&self) -> MethodIdentity {
        self.method
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    pub fn median(&self) -> f64 {
        self.median
    }
}

impl std::fmt::Display for BenchmarkSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<12} | n: {:>3} | avg: {:>9.3}ms | min: {:>9.3}ms | p50: {:>9.3}ms | max: {:>9.3}ms",
            self.method.as_str(),
            self.samples.len(),
            self.average,
            self.minimum,
            self.median,
            self.maximum
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_series_keeps_insertion_order() {
        let series =
            BenchmarkSeries::from_samples(MethodIdentity::Synchronous, vec![100.0, 50.0, 75.0]).unwrap();

        assert_eq!(series.samples(), &[100.0, 50.0, 75.0]);
        assert_eq!(series.average(), 75.0);
        assert_eq!(series.minimum(), 50.0);
        assert_eq!(series.maximum(), 100.0);
        assert_eq!(series.median(), 75.0);
    }

    #[test]
    fn test_even_median() {
        let series =
            BenchmarkSeries::from_samples(MethodIdentity::Traditional, vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(series.median(), 2.5);
    }

    #[test]
    fn test_empty_and_negative_rejected() {
        assert!(matches!(
            BenchmarkSeries::from_samples(MethodIdentity::Traditional, vec![]),
            Err(BenchError::InvalidArgument(_))
        ));
        assert!(matches!(
            BenchmarkSeries::from_samples(MethodIdentity::Traditional, vec![1.0, -0.5]),
            Err(BenchError::InvalidArgument(_))
        ));
        assert!(matches!(
            BenchmarkSeries::from_samples(MethodIdentity::Traditional, vec![f64::NAN]),
            Err(BenchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_display() {
        let series = BenchmarkSeries::from_samples(MethodIdentity::Synchronous, vec![1.5]).unwrap();
        let line = series.to_string();
        assert!(line.starts_with("sync"));
        assert!(line.contains("avg:     1.500ms"));
    }

    proptest! {
        #[test]
        fn prop_extremes_bound_every_sample(samples in prop::collection::vec(0.0f64..1e6, 1..64)) {
            let series = BenchmarkSeries::from_samples(MethodIdentity::Traditional, samples.clone()).unwrap();

            prop_assert_eq!(series.len(), samples.len());
            prop_assert!(series.minimum() <= series.average());
            prop_assert!(series.average() <= series.maximum());
            for s in &samples {
                prop_assert!(series.minimum() <= *s && *s <= series.maximum());
            }
            prop_assert!(samples.contains(&series.minimum()));
            prop_assert!(samples.contains(&series.maximum()));

            let mean = samples.iter().sum::<f64>() / samples.len() as f64;
            prop_assert!((series.average() - mean).abs() <= 1e-9 * mean.max(1.0));
        }

        #[test]
        fn prop_identical_samples(value in 0.0f64..1e6, n in 1usize..32) {
            let series = BenchmarkSeries::from_samples(MethodIdentity::Synchronous, vec![value; n]).unwrap();
            prop_assert_eq!(series.minimum(), value);
            prop_assert_eq!(series.maximum(), value);
            prop_assert_eq!(series.average(), value);
        }
    }
}
