use crate::{FraudReporter, ReportError, VerificationDataProvider};

use std::collections::BTreeMap;

use parking_lot::Mutex;
use rollup_db::DatabaseError;
use rollup_node_primitives::{FraudRecord, StateRootPair, VerificationCandidate};

/// An in-memory [`VerificationDataProvider`]. The lowest batch above the verified watermark is
/// the next candidate, as in the database.
#[derive(Debug, Default)]
pub struct MockVerificationData {
    candidates: Mutex<BTreeMap<u64, VerificationCandidate>>,
    verified: Mutex<Vec<u64>>,
    open_fraud: Mutex<Option<FraudRecord>>,
}

impl MockVerificationData {
    /// Stores the candidate, replacing any candidate for the same batch.
    pub fn set_candidate(&self, candidate: VerificationCandidate) {
        self.candidates.lock().insert(candidate.batch_number, candidate);
    }

    /// Returns the batches marked verified, in call order.
    pub fn verified(&self) -> Vec<u64> {
        self.verified.lock().clone()
    }
}

#[async_trait::async_trait]
impl VerificationDataProvider for MockVerificationData {
    async fn next_verification_candidate(
        &self,
    ) -> Result<Option<VerificationCandidate>, DatabaseError> {
        let last = self.verified.lock().last().copied();
        let candidates = self.candidates.lock();
        let next = match last {
            Some(last) => candidates.range(last + 1..).next(),
            None => candidates.iter().next(),
        };
        Ok(next.map(|(_, candidate)| candidate.clone()))
    }

    async fn mark_verified(&self, batch_number: u64) -> Result<(), DatabaseError> {
        self.verified.lock().push(batch_number);
        Ok(())
    }

    async fn open_fraud(&self) -> Result<Option<FraudRecord>, DatabaseError> {
        Ok(*self.open_fraud.lock())
    }

    async fn set_open_fraud(&self, fraud: Option<FraudRecord>) -> Result<(), DatabaseError> {
        *self.open_fraud.lock() = fraud;
        Ok(())
    }
}

/// A [`FraudReporter`] recording every report.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(FraudRecord, StateRootPair)>>,
}

impl RecordingReporter {
    /// Returns the reported frauds, in report order.
    pub fn reports(&self) -> Vec<FraudRecord> {
        self.reports.lock().iter().map(|(fraud, _)| *fraud).collect()
    }

    /// Returns the mismatching root pairs, in report order.
    pub fn roots(&self) -> Vec<StateRootPair> {
        self.reports.lock().iter().map(|(_, roots)| *roots).collect()
    }
}

#[async_trait::async_trait]
impl FraudReporter for RecordingReporter {
    async fn report_fraud(
        &self,
        fraud: FraudRecord,
        roots: StateRootPair,
    ) -> Result<(), ReportError> {
        self.reports.lock().push((fraud, roots));
        Ok(())
    }
}
