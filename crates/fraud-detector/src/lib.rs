//! The fraud detector of the rollup node.
//!
//! The detector compares the state roots committed to the base chain against the roots computed
//! by re-executing the same transitions, one batch at a time in batch order. A batch whose roots
//! all match is verified. The first mismatch in a batch is reported as fraud and holds the
//! verified watermark back until the batch is re-checked with matching roots. The reported fraud
//! is persisted through the provider so a restarted detector does not report it again.

mod config;
pub use config::FraudDetectorConfig;

mod error;
pub use error::{FraudDetectorError, ReportError};

mod metrics;
pub use metrics::FraudDetectorMetrics;

mod provider;
pub use provider::{FraudReporter, VerificationDataProvider};

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers
pub mod test_utils;

use std::collections::HashMap;

use parking_lot::Mutex;
use rollup_node_primitives::{FraudRecord, VerificationCandidate};

/// The verification state of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchVerificationState {
    /// Every state root of the batch matched.
    Verified,
    /// The state root at the index is the first that did not match.
    Fraudulent(u64),
    /// The batch was not checked yet.
    Unknown,
}

/// The outcome of a single [`FraudDetector::run_task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// No batch is ready for verification.
    NoCandidate,
    /// The batch was verified.
    Verified(u64),
    /// The batch holds a fraud. `reported` is false if the fraud was already reported and no
    /// re-alert was due.
    Fraud {
        /// The detected fraud.
        fraud: FraudRecord,
        /// Whether the fraud was reported by this run.
        reported: bool,
    },
}

/// An unresolved fraud.
#[derive(Debug, Clone, Copy)]
struct OpenFraud {
    batch_index: u64,
    runs_since_report: u64,
}

#[derive(Debug, Default)]
struct DetectorState {
    frauds: HashMap<u64, OpenFraud>,
    last_verified: Option<u64>,
    /// Whether the persisted open fraud was loaded.
    restored: bool,
}

/// The fraud detector.
#[derive(Debug)]
pub struct FraudDetector<P, R> {
    provider: P,
    reporter: R,
    config: FraudDetectorConfig,
    state: Mutex<DetectorState>,
    metrics: FraudDetectorMetrics,
}

impl<P, R> FraudDetector<P, R>
where
    P: VerificationDataProvider,
    R: FraudReporter,
{
    /// Returns a new [`FraudDetector`].
    pub fn new(provider: P, reporter: R, config: FraudDetectorConfig) -> Self {
        Self {
            provider,
            reporter,
            config,
            state: Mutex::new(DetectorState::default()),
            metrics: FraudDetectorMetrics::default(),
        }
    }

    /// Returns the verification state of the batch as observed by this detector.
    pub fn state(&self, batch_number: u64) -> BatchVerificationState {
        let state = self.state.lock();
        if let Some(fraud) = state.frauds.get(&batch_number) {
            return BatchVerificationState::Fraudulent(fraud.batch_index)
        }
        match state.last_verified {
            Some(last) if batch_number <= last => BatchVerificationState::Verified,
            _ => BatchVerificationState::Unknown,
        }
    }

    /// Checks the next verification candidate.
    ///
    /// Matching roots verify the batch and clear any fraud previously detected in it. The first
    /// mismatch is reported once per `(batch, index)` unless a re-alert is configured.
    pub async fn run_task(&self) -> Result<VerificationOutcome, FraudDetectorError> {
        self.restore().await?;

        let Some(candidate) = self.provider.next_verification_candidate().await? else {
            tracing::trace!(target: "rollup::fraud", "no verification candidate");
            return Ok(VerificationOutcome::NoCandidate)
        };

        if candidate.roots.is_empty() {
            tracing::error!(target: "rollup::fraud", batch_number = candidate.batch_number, "verification candidate has no state roots");
            return Err(FraudDetectorError::MalformedCandidate {
                batch_number: candidate.batch_number,
            })
        }

        match candidate.first_mismatch() {
            Some(index) => self.on_mismatch(&candidate, index).await,
            None => self.on_match(candidate.batch_number).await,
        }
    }

    /// Loads the fraud reported before a restart.
    async fn restore(&self) -> Result<(), FraudDetectorError> {
        if self.state.lock().restored {
            return Ok(())
        }
        let open = self.provider.open_fraud().await?;

        let mut state = self.state.lock();
        if !state.restored {
            if let Some(fraud) = open {
                tracing::info!(target: "rollup::fraud", %fraud, "restored reported fraud");
                state.frauds.insert(
                    fraud.batch_number,
                    OpenFraud { batch_index: fraud.batch_index, runs_since_report: 0 },
                );
            }
            state.restored = true;
        }
        Ok(())
    }

    async fn on_match(&self, batch_number: u64) -> Result<VerificationOutcome, FraudDetectorError> {
        let open = self.state.lock().frauds.get(&batch_number).copied();
        if let Some(fraud) = open {
            self.provider.set_open_fraud(None).await?;
            tracing::info!(target: "rollup::fraud", batch_number, batch_index = fraud.batch_index, "fraud resolved after re-check");
        }
        self.provider.mark_verified(batch_number).await?;

        {
            let mut state = self.state.lock();
            state.last_verified = Some(batch_number);
            state.frauds.remove(&batch_number);
        }

        self.metrics.batches_verified.increment(1);
        self.metrics.last_verified_batch.set(batch_number as f64);
        tracing::debug!(target: "rollup::fraud", batch_number, "verified batch");
        Ok(VerificationOutcome::Verified(batch_number))
    }

    async fn on_mismatch(
        &self,
        candidate: &VerificationCandidate,
        index: usize,
    ) -> Result<VerificationOutcome, FraudDetectorError> {
        let fraud =
            FraudRecord { batch_number: candidate.batch_number, batch_index: index as u64 };
        let roots = candidate.roots[index];

        let (report, realert) = {
            let mut state = self.state.lock();
            match state.frauds.get_mut(&fraud.batch_number) {
                Some(open) if open.batch_index == fraud.batch_index => {
                    open.runs_since_report += 1;
                    let due = self
                        .config
                        .realert_every
                        .is_some_and(|every| every > 0 && open.runs_since_report >= every);
                    (due, due)
                }
                _ => (true, false),
            }
        };

        if !report {
            tracing::trace!(target: "rollup::fraud", %fraud, "fraud already reported");
            return Ok(VerificationOutcome::Fraud { fraud, reported: false })
        }

        tracing::error!(
            target: "rollup::fraud",
            batch_number = fraud.batch_number,
            batch_index = fraud.batch_index,
            committed_root = %roots.committed_root,
            computed_root = %roots.computed_root,
            realert,
            "state root mismatch"
        );
        self.reporter.report_fraud(fraud, roots).await.map_err(FraudDetectorError::Report)?;
        self.provider.set_open_fraud(Some(fraud)).await?;

        self.state.lock().frauds.insert(
            fraud.batch_number,
            OpenFraud { batch_index: fraud.batch_index, runs_since_report: 0 },
        );
        if realert {
            self.metrics.realerts.increment(1);
        } else {
            self.metrics.frauds_detected.increment(1);
        }

        Ok(VerificationOutcome::Fraud { fraud, reported: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockVerificationData, RecordingReporter};
    use alloy_primitives::B256;
    use rollup_node_primitives::StateRootPair;
    use std::sync::Arc;

    fn root(byte: u8) -> B256 {
        B256::repeat_byte(byte)
    }

    fn candidate(batch_number: u64, pairs: &[(u8, u8)]) -> VerificationCandidate {
        VerificationCandidate {
            batch_number,
            roots: pairs.iter().map(|(c, e)| StateRootPair::new(root(*c), root(*e))).collect(),
        }
    }

    fn detector(
        config: FraudDetectorConfig,
    ) -> (
        FraudDetector<Arc<MockVerificationData>, Arc<RecordingReporter>>,
        Arc<MockVerificationData>,
        Arc<RecordingReporter>,
    ) {
        let data = Arc::new(MockVerificationData::default());
        let reporter = Arc::new(RecordingReporter::default());
        (FraudDetector::new(data.clone(), reporter.clone(), config), data, reporter)
    }

    #[tokio::test]
    async fn test_matching_roots_verify_batch() -> eyre::Result<()> {
        // Given
        let (detector, data, reporter) = detector(Default::default());
        data.set_candidate(candidate(1, &[(0xa, 0xa), (0xb, 0xb), (0xc, 0xc)]));

        // When
        let outcome = detector.run_task().await?;

        // Then
        assert_eq!(outcome, VerificationOutcome::Verified(1));
        assert_eq!(data.verified(), vec![1]);
        assert!(reporter.reports().is_empty());
        assert_eq!(detector.state(1), BatchVerificationState::Verified);

        Ok(())
    }

    #[tokio::test]
    async fn test_fraud_is_reported_once() -> eyre::Result<()> {
        // Given
        let (detector, data, reporter) = detector(Default::default());
        data.set_candidate(candidate(1, &[(0xa, 0xb), (0xb, 0xb), (0xc, 0xc)]));

        // When
        let first = detector.run_task().await?;
        let second = detector.run_task().await?;

        // Then
        let fraud = FraudRecord { batch_number: 1, batch_index: 0 };
        assert_eq!(first, VerificationOutcome::Fraud { fraud, reported: true });
        assert_eq!(second, VerificationOutcome::Fraud { fraud, reported: false });
        assert_eq!(reporter.reports(), vec![fraud]);
        assert!(data.verified().is_empty());
        assert_eq!(detector.state(1), BatchVerificationState::Fraudulent(0));

        Ok(())
    }

    #[tokio::test]
    async fn test_recovery_clears_fraud_and_next_batch_is_reported() -> eyre::Result<()> {
        // Given
        let (detector, data, reporter) = detector(Default::default());
        data.set_candidate(candidate(1, &[(0xa, 0xa), (0xb, 0xc), (0xc, 0xc)]));
        detector.run_task().await?;
        assert_eq!(reporter.reports(), vec![FraudRecord { batch_number: 1, batch_index: 1 }]);

        // When
        data.set_candidate(candidate(1, &[(0xa, 0xa), (0xb, 0xb), (0xc, 0xc)]));
        let recovered = detector.run_task().await?;
        data.set_candidate(candidate(2, &[(0xa, 0xa), (0xb, 0xc)]));
        let next = detector.run_task().await?;

        // Then
        assert_eq!(recovered, VerificationOutcome::Verified(1));
        assert_eq!(detector.state(1), BatchVerificationState::Verified);
        let fraud = FraudRecord { batch_number: 2, batch_index: 1 };
        assert_eq!(next, VerificationOutcome::Fraud { fraud, reported: true });
        assert_eq!(
            reporter.reports(),
            vec![FraudRecord { batch_number: 1, batch_index: 1 }, fraud]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_reported_fraud_survives_restart() -> eyre::Result<()> {
        // Given
        let (detector, data, reporter) = detector(Default::default());
        data.set_candidate(candidate(1, &[(0xa, 0xa), (0xb, 0xc)]));
        detector.run_task().await?;
        let fraud = FraudRecord { batch_number: 1, batch_index: 1 };
        assert_eq!(reporter.reports(), vec![fraud]);
        assert_eq!(data.open_fraud().await?, Some(fraud));

        // When
        let restarted_reporter = Arc::new(RecordingReporter::default());
        let restarted =
            FraudDetector::new(data.clone(), restarted_reporter.clone(), Default::default());
        let outcome = restarted.run_task().await?;

        // Then
        assert_eq!(outcome, VerificationOutcome::Fraud { fraud, reported: false });
        assert!(restarted_reporter.reports().is_empty());
        assert_eq!(restarted.state(1), BatchVerificationState::Fraudulent(1));

        data.set_candidate(candidate(1, &[(0xa, 0xa), (0xb, 0xb)]));
        assert_eq!(restarted.run_task().await?, VerificationOutcome::Verified(1));
        assert_eq!(data.open_fraud().await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_new_mismatch_index_is_reported() -> eyre::Result<()> {
        // Given
        let (detector, data, reporter) = detector(Default::default());
        data.set_candidate(candidate(3, &[(0xa, 0xb), (0xb, 0xb)]));
        detector.run_task().await?;

        // When
        data.set_candidate(candidate(3, &[(0xa, 0xa), (0xb, 0xc)]));
        detector.run_task().await?;

        // Then
        assert_eq!(
            reporter.reports(),
            vec![
                FraudRecord { batch_number: 3, batch_index: 0 },
                FraudRecord { batch_number: 3, batch_index: 1 }
            ]
        );
        assert_eq!(detector.state(3), BatchVerificationState::Fraudulent(1));

        Ok(())
    }

    #[tokio::test]
    async fn test_unresolved_fraud_is_realerted() -> eyre::Result<()> {
        // Given
        let (detector, data, reporter) =
            detector(FraudDetectorConfig { realert_every: Some(2) });
        data.set_candidate(candidate(1, &[(0xa, 0xb)]));

        // When
        for _ in 0..5 {
            detector.run_task().await?;
        }

        // Then
        assert_eq!(reporter.reports().len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_candidate_is_fatal() {
        // Given
        let (detector, data, _) = detector(Default::default());
        data.set_candidate(VerificationCandidate { batch_number: 4, roots: vec![] });

        // When
        let err = detector.run_task().await.unwrap_err();

        // Then
        assert!(matches!(err, FraudDetectorError::MalformedCandidate { batch_number: 4 }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_no_candidate() -> eyre::Result<()> {
        let (detector, _, reporter) = detector(Default::default());
        assert_eq!(detector.run_task().await?, VerificationOutcome::NoCandidate);
        assert!(reporter.reports().is_empty());
        assert_eq!(detector.state(0), BatchVerificationState::Unknown);
        Ok(())
    }
}
