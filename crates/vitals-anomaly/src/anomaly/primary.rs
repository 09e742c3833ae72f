//! Single-channel (ECG) threshold detector.

use tracing::debug;

use crate::config::EngineConfig;
use crate::samples::{PrimarySample, SampleBatch};
use crate::stats::SignalStatistics;

use super::detector::{has_follow_on, scan_sustained, ChannelDetector};
use super::types::{Anomaly, AnomalySeverity, AnomalyType};

const DESCRIPTION: &str = "Irregular heartbeat pattern detected";
const DETAILS: &str = "The ECG shows signs of arrhythmia with irregular R-R intervals. \
                       This pattern has persisted for over 5 minutes.";

/// Flags anchors beyond `anchor_sigma` whose next two samples stay beyond
/// `sustain_sigma`.
#[derive(Debug, Clone, Default)]
pub struct PrimaryDetector {
    config: EngineConfig,
}

impl PrimaryDetector {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Scan `samples` against precomputed window statistics.
    pub fn scan(&self, samples: &[PrimarySample], stats: SignalStatistics) -> Vec<Anomaly> {
        if stats.is_degenerate() {
            debug!(len = samples.len(), "ecg channel has zero spread");
            return Vec::new();
        }

        let t = &self.config.thresholds;
        let len = samples.len();
        scan_sustained(len, &self.config, |i| {
            let anchor = samples[i];
            if !stats.exceeds(anchor.value, t.anchor_sigma) || !has_follow_on(i, len) {
                return None;
            }
            let sustained = samples[i + 1..=i + 2]
                .iter()
                .all(|s| stats.exceeds(s.value, t.sustain_sigma));
            if !sustained {
                return None;
            }

            let severity = if stats.exceeds(anchor.value, t.high_sigma) {
                AnomalySeverity::High
            } else {
                AnomalySeverity::Medium
            };
            Some(Anomaly::anchored(
                AnomalyType::Primary,
                severity,
                i,
                anchor.timestamp,
                DESCRIPTION,
                DETAILS,
            ))
        })
    }
}

impl ChannelDetector for PrimaryDetector {
    fn name(&self) -> &str {
        "primary"
    }

    fn kind(&self) -> AnomalyType {
        AnomalyType::Primary
    }

    fn detect(&self, batch: &SampleBatch<'_>) -> Vec<Anomaly> {
        let Some(samples) = batch.primary() else {
            return Vec::new();
        };
        let stats = SignalStatistics::compute(samples.iter().map(|s| s.value));
        self.scan(samples, stats)
    }
}
