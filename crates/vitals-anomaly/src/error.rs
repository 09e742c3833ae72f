use thiserror::Error;

/// Errors raised at the ingestion and configuration boundaries.
///
/// Detection itself never fails: insufficient or degenerate channels produce
/// an empty anomaly list, and external scorer failures degrade to the rule
/// engine.
#[derive(Debug, Error)]
pub enum AnomalyError {
    #[error("invalid {channel} sample at index {index}: {reason}")]
    InvalidSample {
        channel: &'static str,
        index: usize,
        reason: String,
    },

    #[error("{channel} samples out of order at index {index}: {current} < {previous}")]
    OutOfOrder {
        channel: &'static str,
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("failed to decode {channel} samples: {source}")]
    Decode {
        channel: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown anomaly type: {0}")]
    UnknownAnomalyType(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for detection-boundary results.
pub type AnomalyResult<T> = Result<T, AnomalyError>;

/// Failures reported by an external scorer.
///
/// These are caught by the aggregator and never surface from `detect`.
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("scorer unavailable: {0}")]
    Unavailable(String),

    #[error("scorer failed: {0}")]
    Failed(String),

    #[error("scorer timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}
