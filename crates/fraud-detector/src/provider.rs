use crate::ReportError;

use rollup_db::{Database, DatabaseError, DatabaseOperations};
use rollup_node_primitives::{FraudRecord, StateRootPair, VerificationCandidate};
use tokio::sync::mpsc;

/// Provides the batches whose state roots are ready to be compared.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait VerificationDataProvider: Send + Sync {
    /// Returns the next batch to verify, [`None`] if its roots are not all known yet.
    async fn next_verification_candidate(
        &self,
    ) -> Result<Option<VerificationCandidate>, DatabaseError>;

    /// Advances the verified watermark to the batch.
    async fn mark_verified(&self, batch_number: u64) -> Result<(), DatabaseError>;

    /// Returns the last reported fraud that was not resolved yet.
    async fn open_fraud(&self) -> Result<Option<FraudRecord>, DatabaseError>;

    /// Records the reported fraud. [`None`] records its resolution.
    async fn set_open_fraud(&self, fraud: Option<FraudRecord>) -> Result<(), DatabaseError>;
}

#[async_trait::async_trait]
impl VerificationDataProvider for Database {
    async fn next_verification_candidate(
        &self,
    ) -> Result<Option<VerificationCandidate>, DatabaseError> {
        self.get_next_verification_candidate().await
    }

    async fn mark_verified(&self, batch_number: u64) -> Result<(), DatabaseError> {
        self.set_last_verified_batch(batch_number).await
    }

    async fn open_fraud(&self) -> Result<Option<FraudRecord>, DatabaseError> {
        self.get_open_fraud().await
    }

    async fn set_open_fraud(&self, fraud: Option<FraudRecord>) -> Result<(), DatabaseError> {
        DatabaseOperations::set_open_fraud(self, fraud).await
    }
}

/// Receives the detected frauds.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait FraudReporter: Send + Sync {
    /// Reports the fraud and the mismatching root pair.
    async fn report_fraud(
        &self,
        fraud: FraudRecord,
        roots: StateRootPair,
    ) -> Result<(), ReportError>;
}

#[async_trait::async_trait]
impl FraudReporter for mpsc::UnboundedSender<FraudRecord> {
    async fn report_fraud(
        &self,
        fraud: FraudRecord,
        _roots: StateRootPair,
    ) -> Result<(), ReportError> {
        Ok(self.send(fraud)?)
    }
}
