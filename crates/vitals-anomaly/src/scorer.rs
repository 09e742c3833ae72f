//! Pluggable external scorer.
//!
//! An external scorer (for example a trained model behind a service) may
//! claim a whole batch. Absence of a scorer is an ordinary configuration:
//! the aggregator simply runs the rule engine.

use async_trait::async_trait;

use crate::anomaly::{Anomaly, AnomalyType};
use crate::error::ScorerError;
use crate::samples::SampleBatch;

/// Outcome of a scorer consultation.
#[derive(Debug, Clone, PartialEq)]
pub enum ScorerVerdict {
    /// Definite verdict for the batch; rule detectors are bypassed.
    Anomalies(Vec<Anomaly>),
    /// The scorer declines; rule detectors run instead.
    NoOpinion,
}

/// Capability: given a batch, return a verdict or no opinion.
#[async_trait]
pub trait ExternalScorer: Send + Sync {
    /// Name of this scorer (for logging).
    fn name(&self) -> &str;

    /// Cheap readiness check performed before each consultation.
    fn is_available(&self) -> bool {
        true
    }

    /// Score a batch. Called under the aggregator's timeout; errors are
    /// logged and treated as no opinion.
    async fn score(
        &self,
        batch: &SampleBatch<'_>,
        filter: Option<AnomalyType>,
    ) -> Result<ScorerVerdict, ScorerError>;
}
