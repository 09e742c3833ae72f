//! Cross-signal (ECG ↔ EEG) correlation detector.
//!
//! Uses the derivation model as an oracle: the bands expected for each
//! primary value are derived without noise, at the primary sample's own
//! timestamp, and scaled by the configured headroom. The oscillator terms are
//! part of the expectation, so a flat-zero ECG still expects non-zero beta,
//! theta and delta activity.

use crate::config::EngineConfig;
use crate::model::expected_at;
use crate::samples::{Band, BandSample, PrimarySample, SampleBatch};

use super::detector::{has_follow_on, scan_sustained, ChannelDetector};
use super::types::{Anomaly, AnomalySeverity, AnomalyType};

const DESCRIPTION: &str = "Minor correlation anomaly between EEG and ECG";
const DETAILS: &str = "The correlation between EEG and ECG patterns shows a slight deviation \
                       from the baseline. This is likely temporary but worth monitoring.";

/// Flags positions where any actual band strays from its oracle value by
/// more than `tolerance` of that value, sustained over three samples.
#[derive(Debug, Clone, Default)]
pub struct CrossSignalDetector {
    config: EngineConfig,
}

impl CrossSignalDetector {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Whether the pair at one position breaks the expected relationship.
    pub fn is_divergent(&self, primary: &PrimarySample, bands: &BandSample) -> bool {
        let cross = &self.config.cross_signal;
        let expected = expected_at(primary.value, primary.timestamp, cross.headroom);
        Band::ALL.into_iter().any(|band| {
            let want = expected.get(band);
            (bands.get(band) - want).abs() > want.abs() * cross.tolerance
        })
    }

    /// Scan index-aligned series, truncated to the shorter length.
    pub fn scan(&self, primary: &[PrimarySample], bands: &[BandSample]) -> Vec<Anomaly> {
        let len = primary.len().min(bands.len());
        scan_sustained(len, &self.config, |i| {
            if !has_follow_on(i, len) {
                return None;
            }
            let sustained = (i..=i + 2).all(|j| self.is_divergent(&primary[j], &bands[j]));
            sustained.then(|| {
                Anomaly::anchored(
                    AnomalyType::Combined,
                    AnomalySeverity::Low,
                    i,
                    primary[i].timestamp,
                    DESCRIPTION,
                    DETAILS,
                )
            })
        })
    }
}

impl ChannelDetector for CrossSignalDetector {
    fn name(&self) -> &str {
        "cross-signal"
    }

    fn kind(&self) -> AnomalyType {
        AnomalyType::Combined
    }

    fn detect(&self, batch: &SampleBatch<'_>) -> Vec<Anomaly> {
        match (batch.primary(), batch.bands()) {
            (Some(primary), Some(bands)) => self.scan(primary, bands),
            _ => Vec::new(),
        }
    }
}
