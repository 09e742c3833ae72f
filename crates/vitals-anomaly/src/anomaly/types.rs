//! Anomaly record types.
//!
//! Records are built fresh per detection call and handed to the caller;
//! the engine keeps no copy.

use chrono::{Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnomalyError;

// ── Identifier ──────────────────────────────────────────────────────────

/// Unique identifier for a detected anomaly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnomalyId(pub String);

impl AnomalyId {
    /// Generate a new unique anomaly ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for AnomalyId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnomalyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Type ────────────────────────────────────────────────────────────────

/// Which detector produced an anomaly.
///
/// Serialized with the dashboard's channel labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyType {
    /// Single-channel (ECG) anomaly.
    #[serde(rename = "ECG")]
    Primary,
    /// Multi-band (EEG) anomaly.
    #[serde(rename = "EEG")]
    MultiBand,
    /// Cross-signal correlation anomaly.
    #[serde(rename = "Combined")]
    Combined,
}

impl AnomalyType {
    /// Wire label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primary => "ECG",
            Self::MultiBand => "EEG",
            Self::Combined => "Combined",
        }
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for AnomalyType {
    type Err = AnomalyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ecg" | "primary" => Ok(Self::Primary),
            "eeg" | "multiband" | "multi-band" => Ok(Self::MultiBand),
            "combined" => Ok(Self::Combined),
            _ => Err(AnomalyError::UnknownAnomalyType(s.to_string())),
        }
    }
}

// ── Severity ────────────────────────────────────────────────────────────

/// Severity of a detected anomaly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

// ── Status ──────────────────────────────────────────────────────────────

/// Lifecycle status. The rule engine only ever emits `Active`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyStatus {
    #[default]
    Active,
    Resolved,
}

// ── Anomaly ─────────────────────────────────────────────────────────────

/// A confirmed anomaly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: AnomalyId,
    /// Anchor sample time as a local calendar timestamp.
    pub timestamp: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: AnomalyType,
    pub severity: AnomalySeverity,
    /// Short label.
    pub description: String,
    /// Explanatory sentence.
    pub details: String,
    pub status: AnomalyStatus,
    /// Position of the anchor sample in its source series. Not serialized;
    /// absent for records supplied by an external scorer.
    #[serde(skip)]
    pub anchor_index: Option<usize>,
}

impl Anomaly {
    /// Build an active anomaly anchored at `anchor_index`, whose sample was
    /// taken at `anchor_ms`.
    pub fn anchored(
        kind: AnomalyType,
        severity: AnomalySeverity,
        anchor_index: usize,
        anchor_ms: i64,
        description: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: AnomalyId::new(),
            timestamp: local_timestamp(anchor_ms),
            kind,
            severity,
            description: description.into(),
            details: details.into(),
            status: AnomalyStatus::Active,
            anchor_index: Some(anchor_index),
        }
    }
}

/// Convert epoch milliseconds to a naive local calendar timestamp.
///
/// Values outside chrono's representable range map to the epoch.
pub fn local_timestamp(epoch_ms: i64) -> NaiveDateTime {
    Utc.timestamp_millis_opt(epoch_ms)
        .single()
        .map(|utc| utc.with_timezone(&Local).naive_local())
        .unwrap_or_default()
}
