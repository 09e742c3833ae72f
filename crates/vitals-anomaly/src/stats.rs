//! Population statistics over a sample window.

use serde::{Deserialize, Serialize};

/// Mean and population standard deviation of one channel over a window.
///
/// Computed once per batch and shared by every anchor test in that batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalStatistics {
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub std_dev: f64,
}

impl SignalStatistics {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// Compute mean and population standard deviation.
    ///
    /// Returns zeroed statistics for an empty input. Length requirements for
    /// detection are enforced by the callers, not here.
    pub fn compute<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: Clone,
    {
        let iter = values.into_iter();
        let (count, sum) = iter
            .clone()
            .fold((0usize, 0.0f64), |(n, s), v| (n + 1, s + v));
        if count == 0 {
            return Self::default();
        }

        let n = count as f64;
        let mean = sum / n;
        let variance = iter.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }

    /// A channel with no spread carries no detectable anomaly.
    pub fn is_degenerate(&self) -> bool {
        self.std_dev < f64::EPSILON
    }

    /// Absolute deviation from the mean.
    pub fn deviation(&self, value: f64) -> f64 {
        (value - self.mean).abs()
    }

    /// `|value - mean| > multiplier * std_dev`.
    pub fn exceeds(&self, value: f64, multiplier: f64) -> bool {
        self.deviation(value) > multiplier * self.std_dev
    }

    /// Magnitude of the z-score, or 0.0 for a degenerate channel.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            self.deviation(value) / self.std_dev
        }
    }
}
