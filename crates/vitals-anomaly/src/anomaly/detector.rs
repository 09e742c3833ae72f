//! Detector trait and the shared sustained-run scan.

use tracing::debug;

use crate::config::{EngineConfig, ScanPolicy};
use crate::samples::SampleBatch;

use super::types::{Anomaly, AnomalyType};
use super::SUSTAIN_FOLLOW_ON;

/// A rule-based detector over one kind of channel.
///
/// Implementations read only the batch and their own configuration, so they
/// can run concurrently on disjoint batches.
pub trait ChannelDetector: Send + Sync {
    /// Name of this detector (for logging).
    fn name(&self) -> &str;

    /// The anomaly type this detector emits; used for filtering.
    fn kind(&self) -> AnomalyType;

    /// Detect anomalies. Returns an empty list when the batch lacks the
    /// series this detector needs.
    fn detect(&self, batch: &SampleBatch<'_>) -> Vec<Anomaly>;
}

/// Scan the anchor positions of a window of `len` samples.
///
/// `confirm(i)` decides whether index `i` anchors a sustained anomaly and
/// builds it. Anchors are tried in ascending order over
/// `edge_guard <= i < len - edge_guard`; windows shorter than
/// `min_samples` yield nothing. After a hit, the scan policy decides where
/// the next candidate is.
pub fn scan_sustained<F>(len: usize, config: &EngineConfig, mut confirm: F) -> Vec<Anomaly>
where
    F: FnMut(usize) -> Option<Anomaly>,
{
    let edge = config.edge_guard;
    if len < config.min_samples || len <= 2 * edge {
        debug!(len, min = config.min_samples, "window too short for detection");
        return Vec::new();
    }

    let end = len - edge;
    let step_after_hit = match config.scan_policy {
        ScanPolicy::ReportEveryAnchor => 1,
        ScanPolicy::SkipAhead { positions } => positions.saturating_add(1),
    };

    let mut anomalies = Vec::new();
    let mut i = edge;
    while i < end {
        match confirm(i) {
            Some(anomaly) => {
                anomalies.push(anomaly);
                i = i.saturating_add(step_after_hit);
            }
            None => i += 1,
        }
    }
    anomalies
}

/// Whether the window holds the follow-on samples an anchor at `i` needs.
pub(crate) fn has_follow_on(i: usize, len: usize) -> bool {
    i + SUSTAIN_FOLLOW_ON < len
}
