//! Rule-based anomaly detectors with sustained-run confirmation.
//!
//! Three detectors share one scan discipline (edge guard, minimum window,
//! scan policy) and differ only in what makes an index qualify.
//!
//! ```text
//!   SampleBatch
//!       │
//!       ├──► PrimaryDetector    (ECG z-score, 3-sample run)
//!       ├──► MultiBandDetector  (per-band z-score, first qualifying band, dominant band)
//!       └──► CrossSignalDetector (oracle deviation via CrossSignalModel)
//!             │
//!             ▼
//!       Vec<Anomaly> in detector order, each in ascending sample order
//! ```

pub mod cross;
pub mod detector;
pub mod multiband;
pub mod primary;
pub mod types;

pub use cross::CrossSignalDetector;
pub use detector::{scan_sustained, ChannelDetector};
pub use multiband::{dominant_band, BandStatistics, MultiBandDetector};
pub use primary::PrimaryDetector;
pub use types::{Anomaly, AnomalyId, AnomalySeverity, AnomalyStatus, AnomalyType};

/// Anchor qualification multiplier.
pub const DEFAULT_ANCHOR_SIGMA: f64 = 2.5;

/// Follow-on qualification multiplier.
pub const DEFAULT_SUSTAIN_SIGMA: f64 = 2.0;

/// Deviation above which severity is high.
pub const DEFAULT_HIGH_SIGMA: f64 = 3.0;

/// Deviation above which multi-band severity is medium.
pub const DEFAULT_MEDIUM_SIGMA: f64 = 2.5;

/// Positions skipped at each end of a window.
pub const DEFAULT_EDGE_GUARD: usize = 5;

/// Smallest window that can produce an anomaly.
pub const DEFAULT_MIN_SAMPLES: usize = 11;

/// Number of samples after the anchor that must also qualify.
pub const SUSTAIN_FOLLOW_ON: usize = 2;

/// Scale applied to oracle bands before comparison.
pub const DEFAULT_CROSS_HEADROOM: f64 = 1.5;

/// Allowed oracle deviation as a fraction of the expected value.
pub const DEFAULT_CROSS_TOLERANCE: f64 = 0.5;

/// Default skip distance for [`crate::config::ScanPolicy::SkipAhead`].
pub const DEFAULT_SKIP_POSITIONS: usize = 5;

/// Default bound on an external scorer call.
pub const DEFAULT_SCORER_TIMEOUT_MS: u64 = 2000;
