//! Four-band (EEG) threshold detector with dominant-band selection.
//!
//! At each anchor the bands are tested in the fixed order alpha, beta,
//! theta, delta. Only the first band that qualifies is checked for a
//! sustained run; the others are not consulted even if they also qualify.
//! Once confirmed, the anomaly is attributed to the band with the largest
//! z-score at the anchor, ties going to the earlier band.

use tracing::debug;

use crate::config::EngineConfig;
use crate::samples::{Band, BandSample, SampleBatch};
use crate::stats::SignalStatistics;

use super::detector::{has_follow_on, scan_sustained, ChannelDetector};
use super::types::{Anomaly, AnomalySeverity, AnomalyType};

/// Window statistics for all four bands, indexed in [`Band::ALL`] order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandStatistics([SignalStatistics; 4]);

impl BandStatistics {
    pub fn compute(samples: &[BandSample]) -> Self {
        Self(Band::ALL.map(|band| {
            SignalStatistics::compute(samples.iter().map(move |s| s.get(band)))
        }))
    }

    pub fn from_parts(
        alpha: SignalStatistics,
        beta: SignalStatistics,
        theta: SignalStatistics,
        delta: SignalStatistics,
    ) -> Self {
        Self([alpha, beta, theta, delta])
    }

    pub fn get(&self, band: Band) -> SignalStatistics {
        self.0[band as usize]
    }

    fn all_degenerate(&self) -> bool {
        self.0.iter().all(SignalStatistics::is_degenerate)
    }
}

/// Per-band detector for the multi-band series.
#[derive(Debug, Clone, Default)]
pub struct MultiBandDetector {
    config: EngineConfig,
}

impl MultiBandDetector {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Scan `samples` against precomputed per-band statistics.
    pub fn scan(&self, samples: &[BandSample], stats: BandStatistics) -> Vec<Anomaly> {
        if stats.all_degenerate() {
            debug!(len = samples.len(), "every eeg band has zero spread");
            return Vec::new();
        }

        let t = &self.config.thresholds;
        let len = samples.len();
        scan_sustained(len, &self.config, |i| {
            let anchor = samples[i];

            // A zero-spread band never qualifies.
            let first = Band::ALL.into_iter().find(|&band| {
                let s = stats.get(band);
                !s.is_degenerate() && s.exceeds(anchor.get(band), t.anchor_sigma)
            })?;

            if !has_follow_on(i, len) {
                return None;
            }
            let s = stats.get(first);
            let sustained = samples[i + 1..=i + 2]
                .iter()
                .all(|next| s.exceeds(next.get(first), t.sustain_sigma));
            if !sustained {
                return None;
            }

            let (dominant, z) = dominant_band(&anchor, &stats);
            let severity = if z > t.high_sigma {
                AnomalySeverity::High
            } else if z > t.medium_sigma {
                AnomalySeverity::Medium
            } else {
                AnomalySeverity::Low
            };
            Some(Anomaly::anchored(
                AnomalyType::MultiBand,
                severity,
                i,
                anchor.timestamp,
                format!("Unusual {} wave activity", dominant.name()),
                format!(
                    "{} wave patterns show unusual amplitude variations during rest state. \
                     This may indicate increased stress or anxiety.",
                    dominant.title()
                ),
            ))
        })
    }
}

/// Band with the largest z-score at `sample`, and that z-score.
///
/// Bands are visited in [`Band::ALL`] order and replace the running maximum
/// only when strictly larger, so the earlier band wins a tie.
pub fn dominant_band(sample: &BandSample, stats: &BandStatistics) -> (Band, f64) {
    let mut dominant = Band::Alpha;
    let mut max_z = stats.get(Band::Alpha).z_score(sample.alpha);
    for band in [Band::Beta, Band::Theta, Band::Delta] {
        let z = stats.get(band).z_score(sample.get(band));
        if z > max_z {
            dominant = band;
            max_z = z;
        }
    }
    (dominant, max_z)
}

impl ChannelDetector for MultiBandDetector {
    fn name(&self) -> &str {
        "multi-band"
    }

    fn kind(&self) -> AnomalyType {
        AnomalyType::MultiBand
    }

    fn detect(&self, batch: &SampleBatch<'_>) -> Vec<Anomaly> {
        let Some(samples) = batch.bands() else {
            return Vec::new();
        };
        self.scan(samples, BandStatistics::compute(samples))
    }
}
