//! # vitals-anomaly
//!
//! Windowed, rule-based anomaly detection over two correlated physiological
//! series: a single-channel ECG signal and a four-band (alpha, beta, theta,
//! delta) EEG signal, plus the cross-signal derivation model that both
//! synthesizes EEG bands from ECG and serves as the oracle for cross-signal
//! checks.
//!
//! ## Architecture
//!
//! ```text
//!   JSON / caller data
//!          │ parse_primary / parse_bands
//!          ▼
//!   ┌──────────────┐
//!   │ SampleBatch  │  ← validated: finite values, ordered timestamps
//!   └──────┬───────┘
//!          ▼
//!   ┌──────────────────────────────────────────┐
//!   │ AnomalyAggregator                        │
//!   │   ExternalScorer? ──(timeout)──► verdict │
//!   │   else rule detectors:                   │
//!   │     PrimaryDetector                      │
//!   │     MultiBandDetector                    │
//!   │     CrossSignalDetector ◄── CrossSignalModel (oracle, no noise)
//!   └──────┬───────────────────────────────────┘
//!          ▼
//!     Vec<Anomaly>
//! ```
//!
//! ## Invariants
//!
//! - No anomaly is anchored within `edge_guard` samples of either end of its
//!   source window.
//! - An anomaly needs its anchor plus the next two samples to qualify; a
//!   lone spike never does.
//! - A channel with zero spread yields no anomalies.
//! - The oracle path never draws noise, so detection is reproducible.
//!
//! ## Quick Start
//!
//! ```rust
//! use vitals_anomaly::{AnomalyAggregator, AnomalyType, PrimarySample, SampleBatch};
//!
//! let ecg: Vec<PrimarySample> = (0..60)
//!     .map(|i| {
//!         let v = if (6..=8).contains(&i) { 10.0 } else if i % 2 == 0 { 1.0 } else { -1.0 };
//!         PrimarySample::new(1_700_000_000_000 + i * 1000, v)
//!     })
//!     .collect();
//!
//! let batch = SampleBatch::new(Some(&ecg), None).unwrap();
//! let anomalies = AnomalyAggregator::default().detect_rules(&batch, None);
//! assert_eq!(anomalies.len(), 1);
//! assert_eq!(anomalies[0].kind, AnomalyType::Primary);
//! ```

#![deny(unsafe_code)]

pub mod aggregator;
pub mod anomaly;
pub mod config;
pub mod error;
pub mod model;
pub mod samples;
pub mod scorer;
pub mod stats;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use aggregator::AnomalyAggregator;
pub use anomaly::{
    dominant_band, scan_sustained, Anomaly, AnomalyId, AnomalySeverity, AnomalyStatus,
    AnomalyType, BandStatistics, ChannelDetector, CrossSignalDetector, MultiBandDetector,
    PrimaryDetector,
};
pub use config::{CrossSignalConfig, EngineConfig, ScanPolicy, Thresholds};
pub use error::{AnomalyError, AnomalyResult, ScorerError};
pub use model::{
    derive_at, expected_at, BandValues, Clock, CrossSignalModel, FixedClock, NoNoise, NoiseSource,
    SystemClock, UniformNoise,
};
pub use samples::{parse_bands, parse_primary, Band, BandSample, PrimarySample, SampleBatch};
pub use scorer::{ExternalScorer, ScorerVerdict};
pub use stats::SignalStatistics;
