//! Sample types and the validated ingestion boundary.
//!
//! Detectors assume well-formed input. Everything that reaches them goes
//! through [`SampleBatch::new`], which rejects non-finite values and
//! out-of-order timestamps before any statistics are computed.

use serde::{Deserialize, Serialize};

use crate::error::{AnomalyError, AnomalyResult};

/// Channel label used in errors and logs for the single-channel series.
pub const PRIMARY_CHANNEL: &str = "ecg";

/// Channel label used in errors and logs for the four-band series.
pub const BAND_CHANNEL: &str = "eeg";

// ── Samples ─────────────────────────────────────────────────────────────

/// One reading of the single-channel (ECG) signal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimarySample {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub value: f64,
}

impl PrimarySample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// One reading of the four-band (EEG) signal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandSample {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub alpha: f64,
    pub beta: f64,
    pub theta: f64,
    pub delta: f64,
}

impl BandSample {
    pub fn new(timestamp: i64, alpha: f64, beta: f64, theta: f64, delta: f64) -> Self {
        Self {
            timestamp,
            alpha,
            beta,
            theta,
            delta,
        }
    }

    /// Value of a single band.
    pub fn get(&self, band: Band) -> f64 {
        match band {
            Band::Alpha => self.alpha,
            Band::Beta => self.beta,
            Band::Theta => self.theta,
            Band::Delta => self.delta,
        }
    }
}

// ── Bands ───────────────────────────────────────────────────────────────

/// One of the four named sub-channels of the multi-band signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Alpha,
    Beta,
    Theta,
    Delta,
}

impl Band {
    /// Fixed priority order used for sustained checks and dominant-band ties.
    pub const ALL: [Band; 4] = [Band::Alpha, Band::Beta, Band::Theta, Band::Delta];

    pub fn name(&self) -> &'static str {
        match self {
            Band::Alpha => "alpha",
            Band::Beta => "beta",
            Band::Theta => "theta",
            Band::Delta => "delta",
        }
    }

    /// Name with a leading capital, for sentence starts.
    pub fn title(&self) -> &'static str {
        match self {
            Band::Alpha => "Alpha",
            Band::Beta => "Beta",
            Band::Theta => "Theta",
            Band::Delta => "Delta",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ── Parsing ─────────────────────────────────────────────────────────────

/// Decode a JSON array of primary samples. Missing fields fail here.
pub fn parse_primary(json: &str) -> AnomalyResult<Vec<PrimarySample>> {
    serde_json::from_str(json).map_err(|source| AnomalyError::Decode {
        channel: PRIMARY_CHANNEL,
        source,
    })
}

/// Decode a JSON array of band samples. Missing fields fail here.
pub fn parse_bands(json: &str) -> AnomalyResult<Vec<BandSample>> {
    serde_json::from_str(json).map_err(|source| AnomalyError::Decode {
        channel: BAND_CHANNEL,
        source,
    })
}

// ── Batch ───────────────────────────────────────────────────────────────

/// A validated, borrowed detection batch.
///
/// Either series may be absent; an empty slice counts as absent. When both
/// are present they are aligned by position, not by timestamp.
#[derive(Clone, Copy, Debug, Default)]
pub struct SampleBatch<'a> {
    primary: Option<&'a [PrimarySample]>,
    bands: Option<&'a [BandSample]>,
}

impl<'a> SampleBatch<'a> {
    /// Validate both series and build a batch.
    pub fn new(
        primary: Option<&'a [PrimarySample]>,
        bands: Option<&'a [BandSample]>,
    ) -> AnomalyResult<Self> {
        let primary = primary.filter(|s| !s.is_empty());
        let bands = bands.filter(|s| !s.is_empty());

        if let Some(series) = primary {
            validate_primary(series)?;
        }
        if let Some(series) = bands {
            validate_bands(series)?;
        }

        Ok(Self { primary, bands })
    }

    /// A batch with no data.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn primary(&self) -> Option<&'a [PrimarySample]> {
        self.primary
    }

    pub fn bands(&self) -> Option<&'a [BandSample]> {
        self.bands
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.bands.is_none()
    }

    /// Restrict both series to samples with `start_ms <= timestamp <= end_ms`.
    ///
    /// Relies on the ordering checked at construction, so the result is a
    /// pair of sub-slices rather than a copy.
    pub fn within(&self, start_ms: i64, end_ms: i64) -> SampleBatch<'a> {
        let primary = self.primary.and_then(|s| {
            let lo = s.partition_point(|p| p.timestamp < start_ms);
            let hi = s.partition_point(|p| p.timestamp <= end_ms);
            non_empty(&s[lo..hi.max(lo)])
        });
        let bands = self.bands.and_then(|s| {
            let lo = s.partition_point(|b| b.timestamp < start_ms);
            let hi = s.partition_point(|b| b.timestamp <= end_ms);
            non_empty(&s[lo..hi.max(lo)])
        });
        SampleBatch { primary, bands }
    }
}

fn non_empty<T>(slice: &[T]) -> Option<&[T]> {
    if slice.is_empty() {
        None
    } else {
        Some(slice)
    }
}

fn validate_primary(series: &[PrimarySample]) -> AnomalyResult<()> {
    let mut previous: Option<i64> = None;
    for (index, sample) in series.iter().enumerate() {
        check_finite(PRIMARY_CHANNEL, index, "value", sample.value)?;
        check_order(PRIMARY_CHANNEL, index, previous, sample.timestamp)?;
        previous = Some(sample.timestamp);
    }
    Ok(())
}

fn validate_bands(series: &[BandSample]) -> AnomalyResult<()> {
    let mut previous: Option<i64> = None;
    for (index, sample) in series.iter().enumerate() {
        for band in Band::ALL {
            check_finite(BAND_CHANNEL, index, band.name(), sample.get(band))?;
        }
        check_order(BAND_CHANNEL, index, previous, sample.timestamp)?;
        previous = Some(sample.timestamp);
    }
    Ok(())
}

fn check_finite(channel: &'static str, index: usize, field: &str, value: f64) -> AnomalyResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AnomalyError::InvalidSample {
            channel,
            index,
            reason: format!("{} is not finite ({})", field, value),
        })
    }
}

fn check_order(
    channel: &'static str,
    index: usize,
    previous: Option<i64>,
    current: i64,
) -> AnomalyResult<()> {
    match previous {
        Some(previous) if current < previous => Err(AnomalyError::OutOfOrder {
            channel,
            index,
            previous,
            current,
        }),
        _ => Ok(()),
    }
}
