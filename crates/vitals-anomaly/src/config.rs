//! Detection engine configuration.
//!
//! Every field has a default, so an empty TOML table deserializes to a
//! working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::anomaly::{
    DEFAULT_ANCHOR_SIGMA, DEFAULT_CROSS_HEADROOM, DEFAULT_CROSS_TOLERANCE, DEFAULT_EDGE_GUARD,
    DEFAULT_HIGH_SIGMA, DEFAULT_MEDIUM_SIGMA, DEFAULT_MIN_SAMPLES, DEFAULT_SCORER_TIMEOUT_MS,
    DEFAULT_SKIP_POSITIONS, DEFAULT_SUSTAIN_SIGMA,
};
use crate::error::{AnomalyError, AnomalyResult};
use crate::model::DEFAULT_NOISE_AMPLITUDE;

/// Configuration for the anomaly engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sigma multipliers for the statistical detectors.
    pub thresholds: Thresholds,

    /// Samples skipped at each end of a window.
    pub edge_guard: usize,

    /// Windows shorter than this produce no anomalies.
    pub min_samples: usize,

    /// Oracle comparison settings for cross-signal detection.
    pub cross_signal: CrossSignalConfig,

    /// What the scan does after emitting an anomaly.
    pub scan_policy: ScanPolicy,

    /// Upper bound on a single external scorer call.
    pub scorer_timeout_ms: u64,

    /// Upper bound of the uniform noise added during synthesis.
    pub noise_amplitude: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            edge_guard: DEFAULT_EDGE_GUARD,
            min_samples: DEFAULT_MIN_SAMPLES,
            cross_signal: CrossSignalConfig::default(),
            scan_policy: ScanPolicy::default(),
            scorer_timeout_ms: DEFAULT_SCORER_TIMEOUT_MS,
            noise_amplitude: DEFAULT_NOISE_AMPLITUDE,
        }
    }
}

impl EngineConfig {
    pub fn scorer_timeout(&self) -> Duration {
        Duration::from_millis(self.scorer_timeout_ms)
    }

    /// Reject settings that would make detection meaningless.
    pub fn validate(&self) -> AnomalyResult<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("thresholds.anchor_sigma", t.anchor_sigma),
            ("thresholds.sustain_sigma", t.sustain_sigma),
            ("thresholds.high_sigma", t.high_sigma),
            ("thresholds.medium_sigma", t.medium_sigma),
            ("cross_signal.headroom", self.cross_signal.headroom),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnomalyError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if !(self.cross_signal.tolerance.is_finite() && self.cross_signal.tolerance >= 0.0) {
            return Err(AnomalyError::InvalidConfig(format!(
                "cross_signal.tolerance must be non-negative, got {}",
                self.cross_signal.tolerance
            )));
        }

        if !(self.noise_amplitude.is_finite() && self.noise_amplitude >= 0.0) {
            return Err(AnomalyError::InvalidConfig(format!(
                "noise_amplitude must be non-negative, got {}",
                self.noise_amplitude
            )));
        }

        if self.scorer_timeout_ms == 0 {
            return Err(AnomalyError::InvalidConfig(
                "scorer_timeout_ms must be greater than zero".into(),
            ));
        }

        let floor = 2 * self.edge_guard + 1;
        if self.min_samples < floor {
            return Err(AnomalyError::InvalidConfig(format!(
                "min_samples {} is below 2 * edge_guard + 1 = {}",
                self.min_samples, floor
            )));
        }

        Ok(())
    }
}

/// Sigma multipliers shared by the primary and multi-band detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Anchor qualification: `|x - mean| > anchor_sigma * std`.
    pub anchor_sigma: f64,

    /// Follow-on qualification for the two samples after the anchor.
    pub sustain_sigma: f64,

    /// Deviation above which severity is high.
    pub high_sigma: f64,

    /// Deviation above which multi-band severity is medium.
    pub medium_sigma: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            anchor_sigma: DEFAULT_ANCHOR_SIGMA,
            sustain_sigma: DEFAULT_SUSTAIN_SIGMA,
            high_sigma: DEFAULT_HIGH_SIGMA,
            medium_sigma: DEFAULT_MEDIUM_SIGMA,
        }
    }
}

/// Oracle comparison settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossSignalConfig {
    /// Scale applied to the derived bands before comparison.
    pub headroom: f64,

    /// Allowed deviation as a fraction of the expected value.
    pub tolerance: f64,
}

impl Default for CrossSignalConfig {
    fn default() -> Self {
        Self {
            headroom: DEFAULT_CROSS_HEADROOM,
            tolerance: DEFAULT_CROSS_TOLERANCE,
        }
    }
}

/// Scan behavior after a sustained anomaly is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Test every anchor position. A sustained run of length `k` reports
    /// up to `k - 2` overlapping anomalies.
    ReportEveryAnchor,

    /// Resume scanning `positions + 1` samples after an emitted anchor.
    SkipAhead { positions: usize },
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self::ReportEveryAnchor
    }
}

impl ScanPolicy {
    /// Skip-ahead policy with the default distance.
    pub fn skip_ahead() -> Self {
        Self::SkipAhead {
            positions: DEFAULT_SKIP_POSITIONS,
        }
    }
}
