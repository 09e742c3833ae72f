//! Anomaly aggregator: external scorer first, rule engine otherwise.
//!
//! ```text
//!   detect(batch, filter)
//!       │
//!       ├── scorer configured & available?
//!       │     └── timeout(score) ── Anomalies(v) ──► v   (rules bypassed)
//!       │                      └── NoOpinion / Err / timeout ─┐
//!       ▼                                                     │
//!   detect_rules(batch, filter) ◄─────────────────────────────┘
//!       ├── PrimaryDetector      (filter ∈ {None, Primary})
//!       ├── MultiBandDetector    (filter ∈ {None, MultiBand})
//!       └── CrossSignalDetector  (filter ∈ {None, Combined})
//! ```

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::anomaly::{
    Anomaly, AnomalyType, ChannelDetector, CrossSignalDetector, MultiBandDetector,
    PrimaryDetector,
};
use crate::config::EngineConfig;
use crate::error::ScorerError;
use crate::samples::SampleBatch;
use crate::scorer::{ExternalScorer, ScorerVerdict};

/// Orchestrates the rule detectors and the optional external scorer.
pub struct AnomalyAggregator {
    config: EngineConfig,
    /// Rule detectors in execution order.
    detectors: Vec<Box<dyn ChannelDetector>>,
    scorer: Option<Arc<dyn ExternalScorer>>,
}

impl AnomalyAggregator {
    /// Build the default detector chain.
    pub fn new(config: EngineConfig) -> Self {
        let detectors: Vec<Box<dyn ChannelDetector>> = vec![
            Box::new(PrimaryDetector::new(config.clone())),
            Box::new(MultiBandDetector::new(config.clone())),
            Box::new(CrossSignalDetector::new(config.clone())),
        ];
        Self {
            config,
            detectors,
            scorer: None,
        }
    }

    /// Create with custom detectors, run in the given order.
    pub fn with_detectors(config: EngineConfig, detectors: Vec<Box<dyn ChannelDetector>>) -> Self {
        Self {
            config,
            detectors,
            scorer: None,
        }
    }

    /// Attach an external scorer consulted before the rule engine.
    pub fn with_scorer(mut self, scorer: Arc<dyn ExternalScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of rule detectors registered.
    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    pub fn has_scorer(&self) -> bool {
        self.scorer.is_some()
    }

    /// Detect anomalies in a batch.
    ///
    /// Never fails: scorer errors and timeouts fall back to the rule engine.
    #[instrument(skip_all, fields(filter = ?filter))]
    pub async fn detect(
        &self,
        batch: &SampleBatch<'_>,
        filter: Option<AnomalyType>,
    ) -> Vec<Anomaly> {
        if let Some(verdict) = self.consult_scorer(batch, filter).await {
            return verdict;
        }
        self.detect_rules(batch, filter)
    }

    /// Run only the rule detectors.
    ///
    /// Output is the concatenation of each selected detector's anomalies in
    /// detector order; each detector's own output is in sample order.
    pub fn detect_rules(&self, batch: &SampleBatch<'_>, filter: Option<AnomalyType>) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        for detector in &self.detectors {
            if filter.is_some_and(|kind| kind != detector.kind()) {
                continue;
            }
            let found = detector.detect(batch);
            debug!(detector = detector.name(), count = found.len(), "rule detector finished");
            anomalies.extend(found);
        }
        anomalies
    }

    /// Ask the scorer for a verdict. `None` means "use the rule engine".
    async fn consult_scorer(
        &self,
        batch: &SampleBatch<'_>,
        filter: Option<AnomalyType>,
    ) -> Option<Vec<Anomaly>> {
        let scorer = self.scorer.as_ref()?;
        if !scorer.is_available() {
            debug!(scorer = scorer.name(), "external scorer unavailable");
            return None;
        }

        let timeout = self.config.scorer_timeout();
        let outcome = match tokio::time::timeout(timeout, scorer.score(batch, filter)).await {
            Ok(result) => result,
            Err(_) => Err(ScorerError::Timeout {
                timeout_ms: self.config.scorer_timeout_ms,
            }),
        };

        match outcome {
            Ok(ScorerVerdict::Anomalies(mut anomalies)) => {
                if let Some(kind) = filter {
                    anomalies.retain(|a| a.kind == kind);
                }
                debug!(
                    scorer = scorer.name(),
                    count = anomalies.len(),
                    "external scorer returned a verdict"
                );
                Some(anomalies)
            }
            Ok(ScorerVerdict::NoOpinion) => {
                debug!(scorer = scorer.name(), "external scorer has no opinion");
                None
            }
            Err(e) => {
                warn!(
                    scorer = scorer.name(),
                    error = %e,
                    "external scorer failed, falling back to rule detectors"
                );
                None
            }
        }
    }
}

impl Default for AnomalyAggregator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::AnomalySeverity;
    use crate::model::derive_at;
    use crate::samples::{BandSample, PrimarySample};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const T0: i64 = 1_700_000_000_000;

    fn alt(i: usize) -> f64 {
        if i % 2 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// ECG run at 6..=8, beta run at 20..=22, and bands that diverge from
    /// the oracle everywhere (alternating ±1 never matches |ecg| gains).
    fn fixture() -> (Vec<PrimarySample>, Vec<BandSample>) {
        let primary: Vec<PrimarySample> = (0..60)
            .map(|i| {
                let v = if (6..=8).contains(&i) { 10.0 } else { alt(i) };
                PrimarySample::new(T0 + i as i64 * 1000, v)
            })
            .collect();
        let bands: Vec<BandSample> = (0..60)
            .map(|i| {
                let v = alt(i);
                let beta = if (20..=22).contains(&i) { 10.0 } else { v };
                BandSample::new(T0 + i as i64 * 1000, v, beta, v, v)
            })
            .collect();
        (primary, bands)
    }

    /// Unscaled derivations sit inside the oracle tolerance, so the
    /// cross-signal detector stays quiet.
    fn quiet_bands(primary: &[PrimarySample]) -> Vec<BandSample> {
        primary
            .iter()
            .map(|p| derive_at(p.value, p.timestamp).at(p.timestamp))
            .collect()
    }

    struct StaticScorer {
        verdict: ScorerVerdict,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ExternalScorer for StaticScorer {
        fn name(&self) -> &str {
            "static"
        }

        async fn score(
            &self,
            _batch: &SampleBatch<'_>,
            _filter: Option<AnomalyType>,
        ) -> Result<ScorerVerdict, ScorerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.verdict.clone())
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl ExternalScorer for FailingScorer {
        fn name(&self) -> &str {
            "failing"
        }

        async fn score(
            &self,
            _batch: &SampleBatch<'_>,
            _filter: Option<AnomalyType>,
        ) -> Result<ScorerVerdict, ScorerError> {
            Err(ScorerError::Failed("model file corrupt".into()))
        }
    }

    struct SlowScorer;

    #[async_trait]
    impl ExternalScorer for SlowScorer {
        fn name(&self) -> &str {
            "slow"
        }

        async fn score(
            &self,
            _batch: &SampleBatch<'_>,
            _filter: Option<AnomalyType>,
        ) -> Result<ScorerVerdict, ScorerError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ScorerVerdict::Anomalies(Vec::new()))
        }
    }

    struct OfflineScorer;

    #[async_trait]
    impl ExternalScorer for OfflineScorer {
        fn name(&self) -> &str {
            "offline"
        }

        fn is_available(&self) -> bool {
            false
        }

        async fn score(
            &self,
            _batch: &SampleBatch<'_>,
            _filter: Option<AnomalyType>,
        ) -> Result<ScorerVerdict, ScorerError> {
            Err(ScorerError::Unavailable("should not be called".into()))
        }
    }

    fn kinds(found: &[Anomaly]) -> Vec<AnomalyType> {
        found.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn default_chain_has_three_detectors() {
        let agg = AnomalyAggregator::default();
        assert_eq!(agg.detector_count(), 3);
        assert!(!agg.has_scorer());
    }

    #[test]
    fn rules_run_in_detector_order() {
        let (primary, bands) = fixture();
        let batch = SampleBatch::new(Some(&primary), Some(&bands)).unwrap();
        let found = AnomalyAggregator::default().detect_rules(&batch, None);

        let first_eeg = found
            .iter()
            .position(|a| a.kind == AnomalyType::MultiBand)
            .unwrap();
        let first_combined = found
            .iter()
            .position(|a| a.kind == AnomalyType::Combined)
            .unwrap();
        assert_eq!(found[0].kind, AnomalyType::Primary);
        assert!(first_eeg < first_combined);
        assert!(found[..first_eeg].iter().all(|a| a.kind == AnomalyType::Primary));
        assert!(found[first_eeg..first_combined]
            .iter()
            .all(|a| a.kind == AnomalyType::MultiBand));
        assert!(found[first_combined..]
            .iter()
            .all(|a| a.kind == AnomalyType::Combined));

        let combined: Vec<usize> = found[first_combined..]
            .iter()
            .filter_map(|a| a.anchor_index)
            .collect();
        assert!(combined.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn filter_selects_one_detector() {
        let (primary, bands) = fixture();
        let batch = SampleBatch::new(Some(&primary), Some(&bands)).unwrap();
        let agg = AnomalyAggregator::default();

        let ecg = agg.detect_rules(&batch, Some(AnomalyType::Primary));
        assert_eq!(kinds(&ecg), vec![AnomalyType::Primary]);
        assert_eq!(ecg[0].severity, AnomalySeverity::High);

        let eeg = agg.detect_rules(&batch, Some(AnomalyType::MultiBand));
        assert_eq!(kinds(&eeg), vec![AnomalyType::MultiBand]);
        assert_eq!(eeg[0].description, "Unusual beta wave activity");

        let combined = agg.detect_rules(&batch, Some(AnomalyType::Combined));
        assert!(!combined.is_empty());
        assert!(combined.iter().all(|a| a.kind == AnomalyType::Combined));
    }

    #[test]
    fn quiet_bands_produce_only_primary() {
        let (primary, _) = fixture();
        let bands = quiet_bands(&primary);
        let batch = SampleBatch::new(Some(&primary), Some(&bands)).unwrap();
        let found = AnomalyAggregator::default().detect_rules(&batch, None);
        // The synthesized bands inherit the ECG run, so the EEG detector sees it too.
        assert!(found.iter().all(|a| a.kind != AnomalyType::Combined));
        assert_eq!(found[0].kind, AnomalyType::Primary);
    }

    #[test]
    fn missing_inputs_skip_detectors() {
        let (primary, bands) = fixture();
        let agg = AnomalyAggregator::default();

        let only_ecg = SampleBatch::new(Some(&primary), None).unwrap();
        assert_eq!(kinds(&agg.detect_rules(&only_ecg, None)), vec![AnomalyType::Primary]);

        let only_eeg = SampleBatch::new(None, Some(&bands)).unwrap();
        assert_eq!(
            kinds(&agg.detect_rules(&only_eeg, None)),
            vec![AnomalyType::MultiBand]
        );

        assert!(agg.detect_rules(&SampleBatch::empty(), None).is_empty());
    }

    #[tokio::test]
    async fn absent_inputs_return_empty() {
        let found = AnomalyAggregator::default()
            .detect(&SampleBatch::empty(), None)
            .await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn scorer_verdict_bypasses_rules() {
        let (primary, bands) = fixture();
        let batch = SampleBatch::new(Some(&primary), Some(&bands)).unwrap();
        let verdict = Anomaly::anchored(
            AnomalyType::Combined,
            AnomalySeverity::Medium,
            30,
            T0,
            "model verdict",
            "from scorer",
        );
        let scorer = Arc::new(StaticScorer {
            verdict: ScorerVerdict::Anomalies(vec![verdict.clone()]),
            calls: AtomicUsize::new(0),
        });
        let agg = AnomalyAggregator::default().with_scorer(scorer.clone());

        let found = agg.detect(&batch, None).await;
        assert_eq!(found, vec![verdict]);
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);

        // An empty verdict is still definite.
        let empty = Arc::new(StaticScorer {
            verdict: ScorerVerdict::Anomalies(Vec::new()),
            calls: AtomicUsize::new(0),
        });
        let agg = AnomalyAggregator::default().with_scorer(empty);
        assert!(agg.detect(&batch, None).await.is_empty());
    }

    #[tokio::test]
    async fn scorer_verdict_respects_filter() {
        let (primary, _) = fixture();
        let batch = SampleBatch::new(Some(&primary), None).unwrap();
        let scorer = Arc::new(StaticScorer {
            verdict: ScorerVerdict::Anomalies(vec![
                Anomaly::anchored(AnomalyType::Primary, AnomalySeverity::Low, 9, T0, "a", "a"),
                Anomaly::anchored(AnomalyType::Combined, AnomalySeverity::Low, 9, T0, "b", "b"),
            ]),
            calls: AtomicUsize::new(0),
        });
        let agg = AnomalyAggregator::default().with_scorer(scorer);
        let found = agg.detect(&batch, Some(AnomalyType::Primary)).await;
        assert_eq!(kinds(&found), vec![AnomalyType::Primary]);
        assert_eq!(found[0].description, "a");
    }

    #[tokio::test]
    async fn no_opinion_falls_back() {
        let (primary, bands) = fixture();
        let batch = SampleBatch::new(Some(&primary), Some(&bands)).unwrap();
        let scorer = Arc::new(StaticScorer {
            verdict: ScorerVerdict::NoOpinion,
            calls: AtomicUsize::new(0),
        });
        let agg = AnomalyAggregator::default().with_scorer(scorer);
        let expected = agg.detect_rules(&batch, None);
        let found = agg.detect(&batch, None).await;
        assert_eq!(kinds(&found), kinds(&expected));
    }

    #[tokio::test]
    async fn scorer_error_falls_back() {
        let (primary, _) = fixture();
        let batch = SampleBatch::new(Some(&primary), None).unwrap();
        let agg = AnomalyAggregator::default().with_scorer(Arc::new(FailingScorer));
        let found = agg.detect(&batch, None).await;
        assert_eq!(kinds(&found), vec![AnomalyType::Primary]);
    }

    #[tokio::test(start_paused = true)]
    async fn scorer_timeout_falls_back() {
        let (primary, _) = fixture();
        let batch = SampleBatch::new(Some(&primary), None).unwrap();
        let config = EngineConfig {
            scorer_timeout_ms: 50,
            ..EngineConfig::default()
        };
        let agg = AnomalyAggregator::new(config).with_scorer(Arc::new(SlowScorer));
        let found = agg.detect(&batch, None).await;
        assert_eq!(kinds(&found), vec![AnomalyType::Primary]);
    }

    #[tokio::test]
    async fn unavailable_scorer_is_skipped() {
        let (primary, _) = fixture();
        let batch = SampleBatch::new(Some(&primary), None).unwrap();
        let agg = AnomalyAggregator::default().with_scorer(Arc::new(OfflineScorer));
        let found = agg.detect(&batch, None).await;
        assert_eq!(kinds(&found), vec![AnomalyType::Primary]);
    }

    #[test]
    fn engine_config_reaches_cross_detector() {
        let (primary, bands) = fixture();
        let batch = SampleBatch::new(Some(&primary), Some(&bands)).unwrap();
        let strict = AnomalyAggregator::default();
        assert!(!strict
            .detect_rules(&batch, Some(AnomalyType::Combined))
            .is_empty());

        let mut config = EngineConfig::default();
        config.cross_signal.tolerance = 1000.0;
        let lenient = AnomalyAggregator::new(config);
        assert!(lenient
            .detect_rules(&batch, Some(AnomalyType::Combined))
            .is_empty());
    }
}
